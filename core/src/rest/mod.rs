//! Endpoint groups.
//!
//! Each method fixes a path, verb and response shape, then hands off to the
//! engine. Every method accepts any [`ParameterSource`](crate::ParameterSource)
//! form: `params![...]`, an `IndexMap`, or `ParameterSource::object(&value)?`.

mod blocks;
mod help;

pub use blocks::Blocks;
pub use help::{Help, RateLimits};

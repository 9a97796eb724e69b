//! Typed client engine for the Twitter-style REST API.
//!
//! # Overview
//! Endpoint groups (`Blocks`, `Help`) are thin call sites. The work happens
//! in four shared pieces:
//! - [`params`](mod@params): three caller input forms normalized to one ordered list.
//! - [`dispatch`](mod@dispatch): one round-trip through the session's `Transport`, with
//!   cooperative cancellation and status checking.
//! - [`materialize`](mod@materialize): the body decoded into one of five result shapes.
//! - [`cursor`]: immutable pages plus pure next/previous request derivation.
//!
//! # Design
//! - The engine is stateless between calls; `Tokens` is immutable and cheap
//!   to clone, so concurrent calls need no synchronization here.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`).
//!   The caller supplies the `Transport` that moves the bytes.
//! - Nothing retries. Every failure surfaces as an [`ApiError`].

pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod materialize;
pub mod params;
pub mod rest;
pub mod tokens;
pub mod types;

pub use config::ClientConfig;
pub use cursor::{page_stream, CursorPage, CursorPager, FIRST_PAGE, NO_PAGE};
pub use dispatch::{call, dispatch, RawResponse, RequestDescriptor};
pub use error::{ApiError, Direction, ServerError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use materialize::{materialize, Materialized, Shape};
pub use params::{ParamValue, Parameter, ParameterSource, Parameters};
pub use rest::{Blocks, Help, RateLimits};
pub use tokens::Tokens;
pub use types::{Configurations, Language, PhotoSize, RateLimit, User};

pub use indexmap::IndexMap;
pub use tokio_util::sync::CancellationToken;

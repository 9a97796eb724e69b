//! Service metadata endpoints.
//!
//! # Design
//! One endpoint per response shape: `configuration` is an entity,
//! `languages` a sequence, `privacy` and `tos` scalar fields, and
//! `rate_limit_status` a nested mapping unwrapped from `resources`.

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::dispatch::{call, RequestDescriptor};
use crate::error::ApiError;
use crate::materialize::Shape;
use crate::params::ParameterSource;
use crate::tokens::Tokens;
use crate::types::{Configurations, Language, RateLimit};

/// Rate limits grouped by resource family, then by endpoint.
pub type RateLimits = IndexMap<String, IndexMap<String, RateLimit>>;

/// Service metadata.
#[derive(Debug, Clone, Copy)]
pub struct Help<'a> {
    tokens: &'a Tokens,
}

impl<'a> Help<'a> {
    pub(crate) fn new(tokens: &'a Tokens) -> Self {
        Self { tokens }
    }

    pub async fn configuration(
        &self,
        params: impl Into<ParameterSource>,
        cancel: &CancellationToken,
    ) -> Result<Configurations, ApiError> {
        let request = RequestDescriptor::get("help/configuration", params.into().normalize()?, Shape::Entity);
        call(self.tokens, &request, cancel).await?.into_entity()
    }

    pub async fn languages(
        &self,
        params: impl Into<ParameterSource>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Language>, ApiError> {
        let request = RequestDescriptor::get("help/languages", params.into().normalize()?, Shape::Sequence);
        call(self.tokens, &request, cancel).await?.into_sequence()
    }

    pub async fn privacy(&self, params: impl Into<ParameterSource>, cancel: &CancellationToken) -> Result<String, ApiError> {
        let request = RequestDescriptor::get("help/privacy", params.into().normalize()?, Shape::scalar_field("privacy"));
        call(self.tokens, &request, cancel).await?.into_scalar()
    }

    pub async fn tos(&self, params: impl Into<ParameterSource>, cancel: &CancellationToken) -> Result<String, ApiError> {
        let request = RequestDescriptor::get("help/tos", params.into().normalize()?, Shape::scalar_field("tos"));
        call(self.tokens, &request, cancel).await?.into_scalar()
    }

    /// Current limits for the given `resources` families (a list or a
    /// comma-separated string), or for all of them.
    pub async fn rate_limit_status(
        &self,
        params: impl Into<ParameterSource>,
        cancel: &CancellationToken,
    ) -> Result<RateLimits, ApiError> {
        let request = RequestDescriptor::get(
            "application/rate_limit_status",
            params.into().normalize()?,
            Shape::nested_under("resources"),
        );
        call(self.tokens, &request, cancel).await?.into_nested()
    }
}

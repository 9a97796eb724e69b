//! Blocked-user endpoints.
//!
//! # Design
//! `ids` and `list` are cursored and return a `CursorPager`, so callers page
//! with `fetch_next` / `fetch_previous` rather than rebuilding parameters.
//! `create` and `destroy` are POSTs answering with the affected user.

use tokio_util::sync::CancellationToken;

use crate::cursor::CursorPager;
use crate::dispatch::{call, RequestDescriptor};
use crate::error::ApiError;
use crate::materialize::Shape;
use crate::params::ParameterSource;
use crate::tokens::Tokens;
use crate::types::User;

/// Blocked-user management.
#[derive(Debug, Clone, Copy)]
pub struct Blocks<'a> {
    tokens: &'a Tokens,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(tokens: &'a Tokens) -> Self {
        Self { tokens }
    }

    /// Ids of users the authenticating user is blocking, in pages of up to
    /// 5000. Omitting `cursor` asks for the first page.
    pub async fn ids(
        &self,
        params: impl Into<ParameterSource>,
        cancel: &CancellationToken,
    ) -> Result<CursorPager<i64>, ApiError> {
        let request = RequestDescriptor::get("blocks/ids", params.into().normalize()?, Shape::cursor_page_of("ids"));
        CursorPager::fetch(self.tokens, request, cancel).await
    }

    /// Users the authenticating user is blocking. Accepts `cursor`,
    /// `include_entities` and `skip_status`.
    pub async fn list(
        &self,
        params: impl Into<ParameterSource>,
        cancel: &CancellationToken,
    ) -> Result<CursorPager<User>, ApiError> {
        let request = RequestDescriptor::get("blocks/list", params.into().normalize()?, Shape::cursor_page_of("users"));
        CursorPager::fetch(self.tokens, request, cancel).await
    }

    /// Block a user given by `screen_name` or `user_id`.
    pub async fn create(&self, params: impl Into<ParameterSource>, cancel: &CancellationToken) -> Result<User, ApiError> {
        let request = RequestDescriptor::post("blocks/create", params.into().normalize()?, Shape::Entity);
        call(self.tokens, &request, cancel).await?.into_entity()
    }

    /// Un-block a user given by `screen_name` or `user_id`.
    pub async fn destroy(&self, params: impl Into<ParameterSource>, cancel: &CancellationToken) -> Result<User, ApiError> {
        let request = RequestDescriptor::post("blocks/destroy", params.into().normalize()?, Shape::Entity);
        call(self.tokens, &request, cancel).await?.into_entity()
    }
}

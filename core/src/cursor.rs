//! Cursor pagination.
//!
//! # Design
//! A `CursorPage` is an immutable snapshot of one response. A `CursorPager`
//! pairs that snapshot with the request that produced it, which is all the
//! state navigation needs: the adjacent request is a pure function of the
//! original descriptor and one cursor value (`adjacent_request`). Fetching a
//! neighbour builds a brand-new pager and leaves the current one untouched,
//! so pagers can be cloned, shared and restarted freely.
//!
//! Cursor `0` means "nothing in this direction" and is checked locally,
//! before any network call. `-1` is the conventional first-page request.

use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dispatch::{call, RequestDescriptor};
use crate::error::{ApiError, Direction};
use crate::tokens::Tokens;

/// Cursor value asking for the first page.
pub const FIRST_PAGE: i64 = -1;

/// Cursor value meaning there is no page in that direction.
pub const NO_PAGE: i64 = 0;

/// Request parameter carrying the cursor.
pub const CURSOR_PARAM: &str = "cursor";

/// One page of a cursored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub previous_cursor: i64,
    pub next_cursor: i64,
}

impl<T> CursorPage<T> {
    pub fn has_next(&self) -> bool {
        self.next_cursor != NO_PAGE
    }

    pub fn has_previous(&self) -> bool {
        self.previous_cursor != NO_PAGE
    }

    pub fn cursor(&self, direction: Direction) -> i64 {
        match direction {
            Direction::Next => self.next_cursor,
            Direction::Previous => self.previous_cursor,
        }
    }
}

/// The request for the page at `cursor`, everything else unchanged.
pub fn adjacent_request(
    request: &RequestDescriptor,
    cursor: i64,
    direction: Direction,
) -> Result<RequestDescriptor, ApiError> {
    if cursor == NO_PAGE {
        debug!(path = %request.path, %direction, "cursor: no more pages");
        return Err(ApiError::NoMorePages { direction });
    }
    Ok(request.with_params(request.params.with(CURSOR_PARAM, cursor.to_string())))
}

/// A page together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPager<T> {
    page: CursorPage<T>,
    request: RequestDescriptor,
}

impl<T> CursorPager<T> {
    pub fn new(page: CursorPage<T>, request: RequestDescriptor) -> Self {
        Self { page, request }
    }

    pub fn page(&self) -> &CursorPage<T> {
        &self.page
    }

    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    pub fn into_page(self) -> CursorPage<T> {
        self.page
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn adjacent(&self, direction: Direction) -> Result<RequestDescriptor, ApiError> {
        adjacent_request(&self.request, self.page.cursor(direction), direction)
    }

    pub fn next_request(&self) -> Result<RequestDescriptor, ApiError> {
        self.adjacent(Direction::Next)
    }

    pub fn previous_request(&self) -> Result<RequestDescriptor, ApiError> {
        self.adjacent(Direction::Previous)
    }
}

impl<T: DeserializeOwned> CursorPager<T> {
    /// Dispatch `request` and wrap the resulting page.
    pub async fn fetch(
        tokens: &Tokens,
        request: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Self, ApiError> {
        let page = call::<T>(tokens, &request, cancel).await?.into_page()?;
        Ok(Self::new(page, request))
    }

    pub async fn fetch_next(&self, tokens: &Tokens, cancel: &CancellationToken) -> Result<Self, ApiError> {
        Self::fetch(tokens, self.next_request()?, cancel).await
    }

    pub async fn fetch_previous(&self, tokens: &Tokens, cancel: &CancellationToken) -> Result<Self, ApiError> {
        Self::fetch(tokens, self.previous_request()?, cancel).await
    }
}

/// Lazily walk pages starting at `first`, moving in `direction` until the
/// cursor runs out or a call fails. A failure is yielded once and ends the
/// stream. Each stream carries its own position; nothing is shared between
/// streams over the same endpoint.
pub fn page_stream<T: DeserializeOwned>(
    tokens: Tokens,
    first: RequestDescriptor,
    direction: Direction,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<CursorPager<T>, ApiError>> {
    stream::unfold(Some(first), move |pending| {
        let tokens = tokens.clone();
        let cancel = cancel.clone();
        async move {
            let request = pending?;
            match CursorPager::<T>::fetch(&tokens, request, &cancel).await {
                Ok(pager) => {
                    let following = pager.adjacent(direction).ok();
                    Some((Ok(pager), following))
                }
                Err(e) => Some((Err(e), None)),
            }
        }
    })
}

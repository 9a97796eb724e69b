//! Error types for the API engine.
//!
//! # Design
//! Local precondition failures (`InvalidParameter`, `NoMorePages`) are kept
//! apart from failures that involve the remote side (`Http`, `Transport`,
//! `Decode`, `MissingField`) so callers can tell "I asked wrongly" from "the
//! server or network misbehaved" without string matching. Nothing in the
//! engine retries; every variant surfaces to the caller as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pagination direction, carried by `ApiError::NoMorePages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Previous => write!(f, "previous"),
        }
    }
}

/// One entry of the server's `{"errors": [...]}` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Errors returned by every engine operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller input could not be normalized into parameters. Raised before
    /// any network call.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The cancellation token fired while the call was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
        errors: Vec<ServerError>,
    },

    /// The transport failed before producing any response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The payload did not match the requested response shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The scalar or unwrap field was absent from the payload.
    #[error("missing field `{0}`")]
    MissingField(String),

    /// The page has no neighbour in the requested direction.
    #[error("no more pages in the {direction} direction")]
    NoMorePages { direction: Direction },
}

impl ApiError {
    /// Build an `Http` error, decoding the server's error list when the body
    /// carries one.
    pub fn from_status(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            errors: Vec<ServerError>,
        }

        let errors = serde_json::from_str::<Envelope>(body)
            .map(|e| e.errors)
            .unwrap_or_default();
        ApiError::Http {
            status,
            body: body.to_string(),
            errors,
        }
    }

    /// True when the failure was detected locally, without the server being
    /// involved.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidParameter(_) | ApiError::NoMorePages { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_decodes_server_errors() {
        let err = ApiError::from_status(
            404,
            r#"{"errors":[{"code":34,"message":"Sorry, that page does not exist"}]}"#,
        );
        match err {
            ApiError::Http { status, errors, .. } => {
                assert_eq!(status, 404);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, 34);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_status_keeps_raw_body_when_not_json() {
        let err = ApiError::from_status(502, "bad gateway");
        match err {
            ApiError::Http { body, errors, .. } => {
                assert_eq!(body, "bad gateway");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn local_errors_are_flagged() {
        assert!(ApiError::InvalidParameter("x".into()).is_local());
        assert!(ApiError::NoMorePages {
            direction: Direction::Next
        }
        .is_local());
        assert!(!ApiError::Cancelled.is_local());
        assert!(!ApiError::MissingField("tos".into()).is_local());
    }

    #[test]
    fn display_names_direction() {
        let err = ApiError::NoMorePages {
            direction: Direction::Previous,
        };
        assert_eq!(err.to_string(), "no more pages in the previous direction");
    }
}

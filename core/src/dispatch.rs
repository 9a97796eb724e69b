//! Request dispatch.
//!
//! # Design
//! A `RequestDescriptor` is everything needed to issue one call: verb, path,
//! normalized parameters and the response shape. `dispatch` sends it through
//! the session handle and races the round-trip against a
//! `CancellationToken`; losing the race drops the in-flight future and
//! reports `Cancelled`. Non-2xx statuses become `ApiError::Http`. Nothing is
//! retried and no state survives between calls.

use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::materialize::{materialize, Materialized, Shape};
use crate::params::Parameters;
use crate::tokens::Tokens;

/// One call, fully described. Immutable once built; deriving an adjacent
/// page produces a new descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub params: Parameters,
    pub shape: Shape,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>, params: Parameters, shape: Shape) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            shape,
        }
    }

    pub fn get(path: impl Into<String>, params: Parameters, shape: Shape) -> Self {
        Self::new(HttpMethod::Get, path, params, shape)
    }

    pub fn post(path: impl Into<String>, params: Parameters, shape: Shape) -> Self {
        Self::new(HttpMethod::Post, path, params, shape)
    }

    /// Same call with a different parameter list.
    pub fn with_params(&self, params: Parameters) -> Self {
        Self {
            params,
            ..self.clone()
        }
    }
}

/// Status and body of a successful round-trip, handed to the materializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issue `request` and return the raw 2xx response.
pub async fn dispatch(
    tokens: &Tokens,
    request: &RequestDescriptor,
    cancel: &CancellationToken,
) -> Result<RawResponse, ApiError> {
    let verb = request.method.as_str();
    let path = request.path.as_str();

    if cancel.is_cancelled() {
        debug!(verb, path, "dispatch: cancelled before start");
        return Err(ApiError::Cancelled);
    }

    debug!(verb, path, params = ?request.params.names(), "dispatch: start");
    let started = Instant::now();

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(verb, path, took_ms = %started.elapsed().as_millis(), "dispatch: cancelled in flight");
            return Err(ApiError::Cancelled);
        }
        result = tokens.invoke(request.method, path, &request.params) => result?,
    };

    if !response.is_success() {
        warn!(
            verb,
            path,
            status = response.status,
            took_ms = %started.elapsed().as_millis(),
            "dispatch: server returned error status"
        );
        return Err(ApiError::from_status(response.status, &response.body));
    }

    debug!(
        verb,
        path,
        status = response.status,
        bytes = response.body.len(),
        took_ms = %started.elapsed().as_millis(),
        "dispatch: ok"
    );
    Ok(RawResponse {
        status: response.status,
        body: response.body,
    })
}

/// Dispatch `request` and materialize the body according to its shape.
pub async fn call<T: DeserializeOwned>(
    tokens: &Tokens,
    request: &RequestDescriptor,
    cancel: &CancellationToken,
) -> Result<Materialized<T>, ApiError> {
    let raw = dispatch(tokens, request, cancel).await?;
    materialize(&raw, &request.shape)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpRequest, HttpResponse, Transport};
    use crate::params;

    /// Records every request and answers with a canned response.
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    /// Never answers.
    struct Hang {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Hang {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn canned(status: u16, body: &'static str) -> (Tokens, Arc<Canned>) {
        let transport = Arc::new(Canned {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        });
        let tokens = Tokens::new(ClientConfig::new("http://api.test"), transport.clone());
        (tokens, transport)
    }

    #[tokio::test]
    async fn successful_dispatch_returns_raw_body() {
        let (tokens, transport) = canned(200, r#"{"tos":"be nice"}"#);
        let request = RequestDescriptor::get(
            "help/tos",
            Parameters::default(),
            Shape::scalar_field("tos"),
        );
        let raw = dispatch(&tokens, &request, &CancellationToken::new()).await.unwrap();
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, r#"{"tos":"be nice"}"#);
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_2xx_carries_status_and_server_errors() {
        let (tokens, _) = canned(401, r#"{"errors":[{"code":32,"message":"Could not authenticate you."}]}"#);
        let request = RequestDescriptor::get("blocks/ids", Parameters::default(), Shape::cursor_page());
        let err = dispatch(&tokens, &request, &CancellationToken::new()).await.unwrap_err();
        match err {
            ApiError::Http { status, errors, .. } => {
                assert_eq!(status, 401);
                assert_eq!(errors[0].code, 32);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn pre_cancelled_token_skips_the_network() {
        let (tokens, transport) = canned(200, "{}");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = RequestDescriptor::get("help/configuration", Parameters::default(), Shape::Entity);
        let err = dispatch(&tokens, &request, &cancel).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelling_in_flight_call_yields_cancelled() {
        let transport = Arc::new(Hang {
            calls: AtomicUsize::new(0),
        });
        let tokens = Tokens::new(ClientConfig::new("http://api.test"), transport.clone());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let request = RequestDescriptor::get("help/languages", Parameters::default(), Shape::Sequence);
        let result: Result<Materialized<serde_json::Value>, _> = call(&tokens, &request, &cancel).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn post_sends_form_body_in_parameter_order() {
        let (tokens, transport) = canned(200, r#"{"id":1,"name":"a","screen_name":"a"}"#);
        let params = params![screen_name => "a", include_entities => false].normalize().unwrap();
        let request = RequestDescriptor::post("blocks/create", params, Shape::Entity);
        dispatch(&tokens, &request, &CancellationToken::new()).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].body.as_deref(), Some("screen_name=a&include_entities=false"));
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_session() {
        let (tokens, transport) = canned(200, r#"{"privacy":"p"}"#);
        let request = RequestDescriptor::get("help/privacy", Parameters::default(), Shape::scalar_field("privacy"));
        let cancel = CancellationToken::new();
        let (a, b) = tokio::join!(
            call::<String>(&tokens, &request, &cancel),
            call::<String>(&tokens, &request, &cancel)
        );
        assert_eq!(a.unwrap().into_scalar().unwrap(), "p");
        assert_eq!(b.unwrap().into_scalar().unwrap(), "p");
        assert_eq!(transport.seen.lock().unwrap().len(), 2);
    }
}

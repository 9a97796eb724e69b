//! The authenticated session handle.
//!
//! # Design
//! `Tokens` owns everything the engine must not look inside: the opaque
//! authorization header value and the transport. It is cheap to clone and
//! immutable after construction, so any number of concurrent calls may share
//! one handle. Credential acquisition and request signing happen before a
//! `Tokens` is built; this type only attaches the resulting header.

use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, FORM_CONTENT_TYPE};
use crate::params::Parameters;
use crate::rest::{Blocks, Help};

#[derive(Clone)]
pub struct Tokens {
    config: ClientConfig,
    authorization: Option<String>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("config", &self.config)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl Tokens {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            authorization: None,
            transport,
        }
    }

    /// Attach a ready-made `Authorization` header value to every request.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(self)
    }

    pub fn help(&self) -> Help<'_> {
        Help::new(self)
    }

    /// Lay out a request on the wire: query string for GET, form body for
    /// POST, parameters in their normalized order either way.
    pub fn build_request(&self, method: HttpMethod, path: &str, params: &Parameters) -> HttpRequest {
        let mut url = self.config.endpoint_url(path);
        let mut headers = vec![("user-agent".to_string(), self.config.user_agent.clone())];
        if let Some(auth) = &self.authorization {
            headers.push(("authorization".to_string(), auth.clone()));
        }

        let body = match method {
            HttpMethod::Get => {
                if !params.is_empty() {
                    url.push('?');
                    url.push_str(&params.encode());
                }
                None
            }
            HttpMethod::Post => {
                headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
                Some(params.encode())
            }
        };

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// Send one request through the transport and hand back whatever came
    /// back, whatever its status.
    pub async fn invoke(
        &self,
        method: HttpMethod,
        path: &str,
        params: &Parameters,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(method, path, params);
        self.transport.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl Transport for Unused {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("not wired".to_string()))
        }
    }

    fn tokens() -> Tokens {
        Tokens::new(ClientConfig::new("http://localhost:3000"), Arc::new(Unused))
    }

    #[test]
    fn get_puts_parameters_in_query_string() {
        let p = params![cursor => -1, skip_status => true].normalize().unwrap();
        let req = tokens().build_request(HttpMethod::Get, "blocks/list", &p);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/1.1/blocks/list.json?cursor=-1&skip_status=true"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn get_without_parameters_has_no_question_mark() {
        let req = tokens().build_request(HttpMethod::Get, "help/tos", &Parameters::default());
        assert_eq!(req.url, "http://localhost:3000/1.1/help/tos.json");
    }

    #[test]
    fn post_puts_parameters_in_form_body() {
        let p = params![screen_name => "jack", skip_status => true].normalize().unwrap();
        let req = tokens().build_request(HttpMethod::Post, "blocks/create", &p);
        assert_eq!(req.url, "http://localhost:3000/1.1/blocks/create.json");
        assert_eq!(req.body.as_deref(), Some("screen_name=jack&skip_status=true"));
        assert!(req
            .headers
            .contains(&("content-type".to_string(), FORM_CONTENT_TYPE.to_string())));
    }

    #[test]
    fn authorization_is_attached_but_not_printed() {
        let t = tokens().with_authorization("Bearer secret");
        let req = t.build_request(HttpMethod::Get, "help/tos", &Parameters::default());
        assert!(req
            .headers
            .contains(&("authorization".to_string(), "Bearer secret".to_string())));
        assert!(!format!("{t:?}").contains("secret"));
    }

    #[tokio::test]
    async fn invoke_surfaces_transport_failure() {
        let err = tokens()
            .invoke(HttpMethod::Get, "help/tos", &Parameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

//! Header-setting policies.

use async_trait::async_trait;

use crate::http::{HttpHeaders, HttpRequest, HttpResponse};
use crate::pipeline::{Next, Policy};
use crate::Result;

pub const REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Sets `User-Agent` unless the request already carries one.
#[derive(Clone, Debug)]
pub struct UserAgentPolicy {
    user_agent: String,
}

impl UserAgentPolicy {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// `"{application} azure-pipeline/{version}"`.
    pub fn with_application(application: &str) -> Self {
        let mut policy = Self::default();
        if !application.trim().is_empty() {
            policy.user_agent = format!("{} {}", application.trim(), policy.user_agent);
        }
        policy
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for UserAgentPolicy {
    fn default() -> Self {
        Self::new(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
    }
}

#[async_trait]
impl Policy for UserAgentPolicy {
    fn name(&self) -> &str {
        "user_agent"
    }

    async fn process(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        if !request.headers().contains("user-agent") {
            request.headers_mut().set("user-agent", &self.user_agent)?;
        }
        next.run(request).await
    }
}

/// Tags each request with a client request id (UUID v4) when absent.
///
/// The id is set before redirects are followed, so every hop of one logical
/// request shares it.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdPolicy;

impl RequestIdPolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Policy for RequestIdPolicy {
    fn name(&self) -> &str {
        "request_id"
    }

    async fn process(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        if !request.headers().contains(REQUEST_ID_HEADER) {
            let id = uuid::Uuid::new_v4().to_string();
            request.headers_mut().set(REQUEST_ID_HEADER, &id)?;
        }
        next.run(request).await
    }
}

/// Sets a fixed list of headers, replacing existing values.
#[derive(Clone, Debug, Default)]
pub struct HeaderPolicy {
    headers: HttpHeaders,
}

impl HeaderPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header names and values are validated here, not per request.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers.add(name, value)?;
        Ok(self)
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }
}

#[async_trait]
impl Policy for HeaderPolicy {
    fn name(&self) -> &str {
        "headers"
    }

    async fn process(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        for (name, value) in self.headers.iter() {
            request.headers_mut().set(name, &value)?;
        }
        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, Transport};
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Capture {
        requests: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Capture {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::new(StatusCode::OK))
        }
    }

    async fn send_through(policy: impl Policy + 'static, request: HttpRequest) -> HttpRequest {
        let capture = Arc::new(Capture::default());
        let pipeline = Pipeline::builder()
            .policy(policy)
            .transport_arc(capture.clone())
            .build()
            .unwrap();
        pipeline.send(request).await.unwrap();
        let mut requests = capture.requests.lock().unwrap();
        requests.pop().unwrap()
    }

    #[tokio::test]
    async fn test_user_agent_default_and_preserved() {
        let sent = send_through(
            UserAgentPolicy::with_application("myapp/1.0"),
            HttpRequest::get("https://example.com").unwrap(),
        )
        .await;
        let ua = sent.headers().value("user-agent").unwrap();
        assert!(ua.starts_with("myapp/1.0 azure-pipeline/"));

        let sent = send_through(
            UserAgentPolicy::default(),
            HttpRequest::get("https://example.com")
                .unwrap()
                .with_header("User-Agent", "custom")
                .unwrap(),
        )
        .await;
        assert_eq!(sent.headers().value("user-agent").as_deref(), Some("custom"));
    }

    #[tokio::test]
    async fn test_request_id_is_uuid() {
        let sent = send_through(
            RequestIdPolicy::new(),
            HttpRequest::get("https://example.com").unwrap(),
        )
        .await;
        let id = sent.headers().value(REQUEST_ID_HEADER).unwrap();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_header_policy_replaces() {
        let policy = HeaderPolicy::new()
            .header("Ocp-Apim-Subscription-Key", "key")
            .unwrap();
        let sent = send_through(
            policy,
            HttpRequest::get("https://example.com")
                .unwrap()
                .with_header("ocp-apim-subscription-key", "old")
                .unwrap(),
        )
        .await;
        assert_eq!(
            sent.headers().value("Ocp-Apim-Subscription-Key").as_deref(),
            Some("key")
        );
    }

    #[test]
    fn test_invalid_header_rejected_up_front() {
        assert!(HeaderPolicy::new().header("bad header", "v").is_err());
    }
}

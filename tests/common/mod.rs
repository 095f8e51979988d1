//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azure_pipeline::auth::{AccessToken, TokenCredential};
use azure_pipeline::pipeline::Transport;
use azure_pipeline::{HttpRequest, HttpResponse, Result};
use reqwest::StatusCode;

/// A request as seen by the transport.
#[derive(Clone, Debug)]
pub struct Sent {
    pub method: String,
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

/// In-memory transport answering by host; unknown hosts get 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, HttpResponse>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, host: &str, response: HttpResponse) -> Self {
        self.routes.insert(host.to_string(), response);
        self
    }

    pub fn redirect(self, host: &str, location: &str) -> Self {
        let response = HttpResponse::new(StatusCode::FOUND)
            .with_header("Location", location)
            .unwrap();
        self.route(host, response)
    }

    pub fn ok(self, host: &str, body: &str) -> Self {
        let response = HttpResponse::new(StatusCode::OK).with_body(body.to_string());
        self.route(host, response)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn reset(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(Sent {
            method: request.method().to_string(),
            url: request.url().to_string(),
            body: request.body().map(|body| body.to_vec()),
            authorization: request.headers().value("authorization"),
            request_id: request.headers().value("x-ms-client-request-id"),
        });

        let host = request.url().host_str().unwrap_or_default();
        Ok(self
            .routes
            .get(host)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(StatusCode::NOT_FOUND)))
    }
}

/// Credential that records each requested resource.
#[derive(Debug, Default)]
pub struct RecordingCredential {
    pub resources: Mutex<Vec<String>>,
}

impl RecordingCredential {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn resources(&self) -> Vec<String> {
        self.resources.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenCredential for RecordingCredential {
    fn name(&self) -> &str {
        "recording"
    }

    fn cache_key(&self) -> String {
        "recording".to_string()
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        self.resources.lock().unwrap().push(resource.to_string());
        Ok(AccessToken::new(format!("token-{}", self.resources.lock().unwrap().len())).expires_in(3600).unwrap())
    }
}

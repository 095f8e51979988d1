//! `reqwest`-backed transport.

use async_trait::async_trait;

use super::Transport;
use crate::http::{HttpRequest, HttpResponse};
use crate::network::HttpNetworkConfig;
use crate::Result;

/// Sends requests with a shared `reqwest::Client`.
///
/// The client never follows redirects itself; that is left to
/// [`RedirectPolicy`](crate::policies::RedirectPolicy).
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpNetworkConfig::from_env())
    }

    pub fn from_config(config: &HttpNetworkConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    /// Wrap an existing client. Its redirect setting is left untouched.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().as_header_map().clone());

        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        HttpResponse::from_reqwest(response).await
    }
}

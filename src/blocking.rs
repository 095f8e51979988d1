//! Thread-blocking adapters over the async pipeline.
//!
//! Each adapter owns a current-thread tokio runtime and drives the async
//! implementation to completion on the calling thread. Token resolution and
//! header formatting are shared with the async path.
//!
//! Calling these from inside an async runtime panics, as with any nested
//! `block_on`.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::auth::{AccessToken, AzureTokenCredentials};
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Context, Pipeline};
use crate::Result;

fn runtime() -> Result<Arc<Runtime>> {
    Ok(Arc::new(
        Builder::new_current_thread().enable_all().build()?,
    ))
}

/// Blocking front for [`Pipeline`].
#[derive(Clone, Debug)]
pub struct BlockingPipeline {
    pipeline: Pipeline,
    runtime: Arc<Runtime>,
}

impl BlockingPipeline {
    pub fn new(pipeline: Pipeline) -> Result<Self> {
        Ok(Self {
            pipeline,
            runtime: runtime()?,
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.runtime.block_on(self.pipeline.send(request))
    }

    pub fn send_with_context(&self, request: HttpRequest, context: &Context) -> Result<HttpResponse> {
        self.runtime
            .block_on(self.pipeline.send_with_context(request, context))
    }
}

/// Blocking front for [`AzureTokenCredentials`].
#[derive(Clone, Debug)]
pub struct BlockingCredentials {
    credentials: Arc<AzureTokenCredentials>,
    runtime: Arc<Runtime>,
}

impl BlockingCredentials {
    pub fn new(credentials: Arc<AzureTokenCredentials>) -> Result<Self> {
        Ok(Self {
            credentials,
            runtime: runtime()?,
        })
    }

    pub fn credentials(&self) -> &Arc<AzureTokenCredentials> {
        &self.credentials
    }

    pub fn get_token(&self, resource: &str) -> Result<AccessToken> {
        self.runtime.block_on(self.credentials.get_token(resource))
    }

    pub fn get_token_from_uri(&self, url: &str) -> Result<AccessToken> {
        self.runtime
            .block_on(self.credentials.get_token_from_uri(url))
    }

    /// `"{scheme} {token}"` for a request to `url`.
    pub fn authorization_header_value(&self, url: &Url) -> Result<String> {
        self.runtime
            .block_on(self.credentials.authorization_header_value(url))
    }

    /// Set the authorization header on a request in place.
    pub fn authorize(&self, request: &mut HttpRequest) -> Result<()> {
        let value = self.authorization_header_value(request.url())?;
        request.headers_mut().set("authorization", &value)?;
        Ok(())
    }
}

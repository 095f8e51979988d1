//! Bearer token injection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::AzureTokenCredentials;
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Next, Policy};
use crate::Result;

/// Sets `Authorization: {scheme} {token}` for the request's audience.
///
/// A failed token fetch fails the request before anything is sent.
#[derive(Clone, Debug)]
pub struct AuthorizationPolicy {
    credentials: Arc<AzureTokenCredentials>,
}

impl AuthorizationPolicy {
    pub fn new(credentials: Arc<AzureTokenCredentials>) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Arc<AzureTokenCredentials> {
        &self.credentials
    }
}

#[async_trait]
impl Policy for AuthorizationPolicy {
    fn name(&self) -> &str {
        "authorization"
    }

    async fn process(&self, mut request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        let value = self
            .credentials
            .authorization_header_value(request.url())
            .await?;
        request.headers_mut().set("authorization", &value)?;
        next.run(request).await
    }
}

//! Managed identity credential backed by the instance metadata service.

use async_trait::async_trait;

use super::response::parse_token_response;
use crate::auth::{AccessToken, TokenCredential};
use crate::http::HttpResponse;
use crate::network::HttpNetworkConfig;
use crate::Result;

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

#[derive(Clone, Debug)]
pub struct ManagedIdentityCredential {
    endpoint: String,
    api_version: String,
    client_id: Option<String>,
    http: reqwest::Client,
}

impl ManagedIdentityCredential {
    /// System-assigned identity.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(HttpNetworkConfig::default().build_client()?))
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            endpoint: IMDS_ENDPOINT.to_string(),
            api_version: IMDS_API_VERSION.to_string(),
            client_id: None,
            http,
        }
    }

    /// User-assigned identity.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &str {
        "managed_identity"
    }

    fn cache_key(&self) -> String {
        match self.client_id {
            Some(ref id) => format!("managed_identity:{}", id),
            None => "managed_identity:system".to_string(),
        }
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        let mut query = vec![
            ("api-version", self.api_version.as_str()),
            ("resource", resource),
        ];
        if let Some(ref client_id) = self.client_id {
            query.push(("client_id", client_id.as_str()));
        }

        tracing::debug!(resource = %resource, endpoint = %self.endpoint, "Requesting managed identity token");

        let response = self
            .http
            .get(&self.endpoint)
            .header("Metadata", "true")
            .query(&query)
            .send()
            .await?;
        let response = HttpResponse::from_reqwest(response).await?;

        parse_token_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_distinguishes_identities() {
        let system = ManagedIdentityCredential::with_client(reqwest::Client::new());
        let user = system.clone().with_client_id("abc");
        assert_eq!(system.cache_key(), "managed_identity:system");
        assert_eq!(user.cache_key(), "managed_identity:abc");
        assert_eq!(system.endpoint(), IMDS_ENDPOINT);
    }
}

//! Service principal credential using the OAuth2 client-credentials grant.

use std::fmt;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::response::parse_token_response;
use crate::auth::{AccessToken, TokenCredential};
use crate::environment::AzureEnvironment;
use crate::http::HttpResponse;
use crate::network::{HttpNetworkConfig, ProxyConfig};
use crate::{Error, Result};

/// Application (service principal) credential.
///
/// Posts `grant_type=client_credentials` with a `resource` parameter to
/// `{authority}{tenant}/oauth2/token`.
#[derive(Clone)]
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: SecretString,
    authority_host: String,
    http: reqwest::Client,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        environment: &AzureEnvironment,
    ) -> Result<Self> {
        let http = HttpNetworkConfig::default().build_client()?;
        Ok(Self::with_client(
            tenant_id,
            client_id,
            client_secret,
            environment.active_directory_endpoint(),
            http,
        ))
    }

    /// Use an existing HTTP client (shared pools, proxies, test servers).
    pub fn with_client(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authority_host: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            authority_host: authority_host.into(),
            http,
        }
    }

    /// Route token requests through a proxy.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Result<Self> {
        self.http = HttpNetworkConfig::default().proxy(proxy).build_client()?;
        Ok(self)
    }

    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &str {
        "client_secret"
    }

    fn cache_key(&self) -> String {
        format!("client_secret:{}:{}", self.tenant_id, self.client_id)
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        if self.tenant_id.is_empty() || self.client_id.is_empty() {
            return Err(Error::auth("tenant_id and client_id are required"));
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("resource", resource),
        ];

        tracing::debug!(
            tenant = %self.tenant_id,
            client_id = %self.client_id,
            resource = %resource,
            "Requesting client credentials token"
        );

        let response = self
            .http
            .post(self.token_endpoint())
            .form(&form)
            .send()
            .await?;
        let response = HttpResponse::from_reqwest(response).await?;

        parse_token_response(&response)
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish()
    }
}

//! Service principal credential read from environment variables.

use async_trait::async_trait;

use super::ClientSecretCredential;
use crate::auth::env::env_with_fallbacks;
use crate::auth::{AccessToken, TokenCredential};
use crate::environment::AzureEnvironment;
use crate::network::HttpNetworkConfig;
use crate::{Error, Result};

const TENANT_VARS: &[&str] = &["AZURE_TENANT_ID", "AZURE_DOMAIN"];
const CLIENT_ID_VARS: &[&str] = &["AZURE_CLIENT_ID"];
const CLIENT_SECRET_VARS: &[&str] = &["AZURE_CLIENT_SECRET"];

/// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET` on
/// every fetch, so rotated secrets are picked up without rebuilding.
#[derive(Clone, Debug)]
pub struct EnvironmentCredential {
    authority_host: String,
    http: reqwest::Client,
}

impl EnvironmentCredential {
    pub fn new(environment: &AzureEnvironment) -> Result<Self> {
        Ok(Self::with_client(
            environment.active_directory_endpoint(),
            HttpNetworkConfig::from_env().build_client()?,
        ))
    }

    pub fn with_client(authority_host: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            authority_host: authority_host.into(),
            http,
        }
    }

    /// Whether the required variables are present.
    pub fn is_configured() -> bool {
        env_with_fallbacks(TENANT_VARS).is_some()
            && env_with_fallbacks(CLIENT_ID_VARS).is_some()
            && env_with_fallbacks(CLIENT_SECRET_VARS).is_some()
    }

    fn resolve(&self) -> Result<ClientSecretCredential> {
        let missing = |name: &str| Error::auth(format!("{} not set", name));
        let tenant = env_with_fallbacks(TENANT_VARS).ok_or_else(|| missing("AZURE_TENANT_ID"))?;
        let client_id =
            env_with_fallbacks(CLIENT_ID_VARS).ok_or_else(|| missing("AZURE_CLIENT_ID"))?;
        let secret =
            env_with_fallbacks(CLIENT_SECRET_VARS).ok_or_else(|| missing("AZURE_CLIENT_SECRET"))?;

        Ok(ClientSecretCredential::with_client(
            tenant,
            client_id,
            secret,
            self.authority_host.clone(),
            self.http.clone(),
        ))
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &str {
        "environment"
    }

    fn cache_key(&self) -> String {
        self.resolve()
            .map(|cred| cred.cache_key())
            .unwrap_or_else(|_| "environment".to_string())
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        self.resolve()?.get_token(resource).await
    }
}

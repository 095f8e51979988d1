//! Client configuration: which cloud, which identity, which transport.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::audience::GraphMatch;
use crate::auth::env::{env_bool, env_opt};
use crate::auth::{
    AzureTokenCredentials, CachingCredential, ChainCredential, ClientSecretCredential,
    EnvironmentCredential, ManagedIdentityCredential, TokenCache, TokenCredential,
};
use crate::environment::AzureEnvironment;
use crate::network::{HttpNetworkConfig, ProxyConfig};
use crate::pipeline::Pipeline;
use crate::policies::{
    AuthorizationPolicy, LoggingPolicy, RedirectPolicy, RequestIdPolicy, UserAgentPolicy,
};
use crate::Result;

const DEFAULT_REFRESH_MARGIN_SECS: u64 = 300;

/// Everything needed to build credentials and a pipeline.
///
/// Passed explicitly to whatever needs it; there is no process-wide
/// instance. Load it from the environment, a JSON file, or construct it
/// directly.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Well-known cloud name, e.g. `AzureCloud` or `AzureChinaCloud`.
    pub environment: Option<String>,
    /// Full environment definition; wins over `environment`.
    pub custom_environment: Option<AzureEnvironment>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub subscription_id: Option<String>,
    pub managed_identity: bool,
    pub managed_identity_client_id: Option<String>,
    /// Prefix for the `User-Agent` header.
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_redirects: Option<usize>,
    pub token_refresh_margin_secs: Option<u64>,
    pub graph_match: GraphMatch,
    pub proxy: Option<ProxyConfig>,
    pub ca_cert: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `AZURE_*` variables.
    ///
    /// Numeric variables that do not parse are reported, not ignored.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            environment: env_opt("AZURE_ENVIRONMENT"),
            custom_environment: None,
            tenant_id: env_opt("AZURE_TENANT_ID"),
            client_id: env_opt("AZURE_CLIENT_ID"),
            client_secret: env_opt("AZURE_CLIENT_SECRET").map(SecretString::from),
            subscription_id: env_opt("AZURE_SUBSCRIPTION_ID"),
            managed_identity: env_bool("AZURE_USE_MANAGED_IDENTITY"),
            managed_identity_client_id: env_opt("AZURE_MANAGED_IDENTITY_CLIENT_ID"),
            user_agent: env_opt("AZURE_PIPELINE_USER_AGENT"),
            timeout_secs: env_parse("AZURE_PIPELINE_TIMEOUT_SECS")?,
            max_redirects: env_parse("AZURE_PIPELINE_MAX_REDIRECTS")?,
            token_refresh_margin_secs: env_parse("AZURE_TOKEN_REFRESH_MARGIN_SECS")?,
            graph_match: GraphMatch::default(),
            proxy: ProxyConfig::from_env(),
            ca_cert: env_opt("SSL_CERT_FILE").map(PathBuf::from),
        })
    }

    /// Load a JSON file. A missing file is an error, not an empty config.
    pub async fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    pub fn with_environment(mut self, environment: AzureEnvironment) -> Self {
        self.custom_environment = Some(environment);
        self
    }

    pub fn with_client_secret(
        mut self,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self.client_id = Some(client_id.into());
        self.client_secret = Some(SecretString::from(client_secret.into()));
        self
    }

    pub fn with_managed_identity(mut self, client_id: Option<String>) -> Self {
        self.managed_identity = true;
        self.managed_identity_client_id = client_id;
        self
    }

    /// Check every field and report all problems at once.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.resolve_environment() {
            errors.push(e);
        }

        let secret_fields = [
            ("tenant_id", self.tenant_id.is_some()),
            ("client_id", self.client_id.is_some()),
            ("client_secret", self.client_secret.is_some()),
        ];
        if secret_fields.iter().any(|(_, set)| *set) {
            errors.extend(
                secret_fields
                    .iter()
                    .filter(|(_, set)| !set)
                    .map(|(key, _)| ConfigError::not_found(key)),
            );
        }

        if self.timeout_secs == Some(0) {
            errors.push(ConfigError::invalid("timeout_secs", "must be greater than zero"));
        }

        if let Some(ref ua) = self.user_agent
            && reqwest::header::HeaderValue::from_str(ua).is_err()
        {
            errors.push(ConfigError::invalid(
                "user_agent",
                "not a valid header value",
            ));
        }

        ValidationErrors(errors).into_result()
    }

    pub fn resolve_environment(&self) -> ConfigResult<AzureEnvironment> {
        if let Some(ref env) = self.custom_environment {
            return Ok(env.clone());
        }
        match self.environment.as_deref() {
            None => Ok(AzureEnvironment::azure()),
            Some(name) => AzureEnvironment::from_name(name)
                .ok_or_else(|| ConfigError::invalid("environment", format!("unknown cloud '{}'", name))),
        }
    }

    pub fn network(&self) -> HttpNetworkConfig {
        HttpNetworkConfig {
            proxy: self.proxy.clone(),
            ca_cert: self.ca_cert.clone(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn refresh_margin(&self) -> Duration {
        Duration::from_secs(
            self.token_refresh_margin_secs
                .unwrap_or(DEFAULT_REFRESH_MARGIN_SECS),
        )
    }

    /// The configured identity, wrapped in a token cache.
    ///
    /// Explicit client secret first, then managed identity when requested,
    /// otherwise environment variables falling back to managed identity.
    pub fn credential(&self) -> Result<Arc<dyn TokenCredential>> {
        let environment = self.resolve_environment()?;
        let http = self.network().build_client()?;

        let inner: Arc<dyn TokenCredential> = match (
            self.tenant_id.as_deref(),
            self.client_id.as_deref(),
            self.client_secret.as_ref(),
        ) {
            (Some(tenant), Some(client), Some(secret)) => {
                Arc::new(ClientSecretCredential::with_client(
                    tenant,
                    client,
                    secret.expose_secret(),
                    environment.active_directory_endpoint(),
                    http,
                ))
            }
            _ if self.managed_identity => Arc::new(self.managed_identity_credential(http)),
            _ => Arc::new(
                ChainCredential::default()
                    .with(EnvironmentCredential::with_client(
                        environment.active_directory_endpoint(),
                        http.clone(),
                    ))
                    .with(self.managed_identity_credential(http)),
            ),
        };

        tracing::debug!(credential = inner.name(), "Configured credential");
        Ok(Arc::new(CachingCredential::with_cache(
            inner,
            Arc::new(TokenCache::with_refresh_margin(self.refresh_margin())),
        )))
    }

    fn managed_identity_credential(&self, http: reqwest::Client) -> ManagedIdentityCredential {
        let credential = ManagedIdentityCredential::with_client(http);
        match self.managed_identity_client_id {
            Some(ref id) => credential.with_client_id(id),
            None => credential,
        }
    }

    pub fn build_credentials(&self) -> Result<AzureTokenCredentials> {
        self.validate()?;

        let mut credentials =
            AzureTokenCredentials::new(self.credential()?, self.resolve_environment()?)
                .with_graph_match(self.graph_match);
        if let Some(ref tenant) = self.tenant_id {
            credentials = credentials.with_domain(tenant);
        }
        if let Some(ref subscription) = self.subscription_id {
            credentials = credentials.with_default_subscription_id(subscription);
        }
        if let Some(ref proxy) = self.proxy {
            credentials = credentials.with_proxy(proxy.clone());
        }
        Ok(credentials)
    }

    /// Standard policy chain over a reqwest transport.
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let credentials = Arc::new(self.build_credentials()?);

        let user_agent = match self.user_agent {
            Some(ref app) => UserAgentPolicy::with_application(app),
            None => UserAgentPolicy::default(),
        };
        let redirect = match self.max_redirects {
            Some(max) => RedirectPolicy::new().with_max_redirects(max),
            None => RedirectPolicy::new(),
        };

        let mut builder = Pipeline::builder()
            .policy(RequestIdPolicy::new())
            .policy(user_agent)
            .policy(redirect)
            .policy(AuthorizationPolicy::new(credentials))
            .policy(LoggingPolicy::new())
            .network(self.network());
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> ConfigResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_public_cloud() {
        let config = ClientConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_environment().unwrap().name(), "AzureCloud");
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let config = ClientConfig {
            environment: Some("Atlantis".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "environment"
        ));
    }

    #[test]
    fn test_partial_service_principal_collects_all_errors() {
        let config = ClientConfig {
            tenant_id: Some("t".into()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        let Err(ConfigError::ValidationErrors(errors)) = config.validate() else {
            panic!("expected aggregated errors");
        };
        assert_eq!(errors.0.len(), 3);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ClientConfig::new().with_client_secret("t", "c", "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_deserialize() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "environment": "AzureChinaCloud",
                "tenant_id": "t",
                "client_id": "c",
                "client_secret": "s",
                "max_redirects": 3,
                "graph_match": "stop"
            }"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_redirects, Some(3));
        assert_eq!(config.graph_match, GraphMatch::Stop);
        assert_eq!(
            config.resolve_environment().unwrap().name(),
            AzureEnvironment::AZURE_CHINA
        );
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        // SAFETY: Test-only environment setup with unique variable names
        unsafe {
            std::env::set_var("AZP_TEST_TIMEOUT", "soon");
        }
        let result: ConfigResult<Option<u64>> = env_parse("AZP_TEST_TIMEOUT");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        unsafe {
            std::env::remove_var("AZP_TEST_TIMEOUT");
        }
    }

    #[tokio::test]
    async fn test_build_credentials_from_secret() {
        let config = ClientConfig::new()
            .with_client_secret("contoso", "app", "s")
            .with_environment(AzureEnvironment::azure_us_government());
        let credentials = config.build_credentials().unwrap();
        assert_eq!(credentials.domain(), Some("contoso"));
        assert_eq!(credentials.credential().name(), "client_secret");
        assert_eq!(credentials.environment().name(), AzureEnvironment::AZURE_US_GOVERNMENT);
    }

    #[tokio::test]
    async fn test_build_pipeline_policy_order() {
        let pipeline = ClientConfig::new()
            .with_managed_identity(None)
            .build_pipeline()
            .unwrap();
        assert_eq!(
            pipeline.policy_names(),
            vec!["request_id", "user_agent", "redirect", "authorization", "logging"]
        );
    }
}

//! Environment-aware credential wrapper.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::credential::format_authorization;
use super::{AccessToken, TokenCredential};
use crate::audience::{AudienceResolver, GraphMatch};
use crate::environment::AzureEnvironment;
use crate::network::ProxyConfig;
use crate::Result;

/// A token credential bound to an Azure environment.
///
/// Picks the audience for each request URL and turns the resulting token into
/// an `Authorization` header value. Built once per client configuration and
/// shared read-only between requests.
#[derive(Clone)]
pub struct AzureTokenCredentials {
    credential: Arc<dyn TokenCredential>,
    environment: AzureEnvironment,
    resolver: AudienceResolver,
    domain: Option<String>,
    default_subscription: Option<String>,
    proxy: Option<ProxyConfig>,
}

impl AzureTokenCredentials {
    pub fn new(credential: Arc<dyn TokenCredential>, environment: AzureEnvironment) -> Self {
        Self {
            credential,
            environment,
            resolver: AudienceResolver::new(),
            domain: None,
            default_subscription: None,
            proxy: None,
        }
    }

    /// Tenant the credential authenticates against.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_default_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.default_subscription = Some(subscription_id.into());
        self
    }

    /// Record the proxy the credential's own HTTP client was built with.
    ///
    /// Informational only: token requests go through the wrapped
    /// credential's client, and [`crate::ClientConfig::credential`] builds
    /// that client from the same proxy settings.
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_graph_match(mut self, graph_match: GraphMatch) -> Self {
        self.resolver = self.resolver.with_graph_match(graph_match);
        self
    }

    pub fn credential(&self) -> &Arc<dyn TokenCredential> {
        &self.credential
    }

    pub fn environment(&self) -> &AzureEnvironment {
        &self.environment
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn default_subscription_id(&self) -> Option<&str> {
        self.default_subscription.as_deref()
    }

    /// Proxy recorded by [`with_proxy`](Self::with_proxy). Not applied here.
    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn scheme(&self) -> &str {
        self.credential.scheme()
    }

    pub fn resolve_audience(&self, url: &Url) -> Result<String> {
        self.resolver.resolve_url(&self.environment, url)
    }

    pub async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        self.credential.get_token(resource).await
    }

    /// Token for whichever audience serves `url`.
    pub async fn get_token_from_uri(&self, url: &str) -> Result<AccessToken> {
        let parsed = Url::parse(url).map_err(|e| crate::Error::invalid_url(url, e))?;
        self.get_token_for_url(&parsed).await
    }

    pub async fn get_token_for_url(&self, url: &Url) -> Result<AccessToken> {
        let resource = self.resolve_audience(url)?;
        self.credential.get_token(&resource).await
    }

    /// `"{scheme} {token}"` for a request to `url`.
    pub async fn authorization_header_value(&self, url: &Url) -> Result<String> {
        let token = self.get_token_for_url(url).await?;
        Ok(format_authorization(self.scheme(), token.secret()))
    }
}

impl fmt::Debug for AzureTokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureTokenCredentials")
            .field("credential", &self.credential.name())
            .field("environment", &self.environment.name())
            .field("domain", &self.domain)
            .field("default_subscription", &self.default_subscription)
            .field("has_proxy", &self.proxy.is_some())
            .finish()
    }
}

//! Resource audience resolution.
//!
//! Maps the host of an outgoing request to the OAuth resource a token must
//! be scoped to. Matching is a substring test of each endpoint suffix against
//! `"{scheme}://{host}[:{port}]/"`, walked in the environment's insertion
//! order. A Key Vault match ends the walk; other matches may be overridden
//! by a later one.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::environment::{AzureEnvironment, Endpoint};
use crate::{Error, Result};

/// What happens after a Graph endpoint matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMatch {
    /// Keep walking the endpoint map; a later match may override Graph.
    #[default]
    Continue,
    /// Graph is final, like Key Vault.
    Stop,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudienceResolver {
    graph_match: GraphMatch,
}

impl AudienceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph_match(mut self, graph_match: GraphMatch) -> Self {
        self.graph_match = graph_match;
        self
    }

    pub fn graph_match(&self) -> GraphMatch {
        self.graph_match
    }

    /// Resolve the audience for a raw request URL.
    pub fn resolve(&self, environment: &AzureEnvironment, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e))?;
        self.resolve_url(environment, &parsed)
    }

    pub fn resolve_url(&self, environment: &AzureEnvironment, url: &Url) -> Result<String> {
        let authority = authority(url)?;
        let mut resource = environment.management_endpoint().to_string();

        for (kind, suffix) in environment.endpoints() {
            if suffix.is_empty() || !authority.contains(suffix) {
                continue;
            }

            match kind {
                Endpoint::KeyVault => {
                    resource = key_vault_audience(suffix);
                    break;
                }
                Endpoint::Graph => {
                    resource = environment.graph_endpoint().to_string();
                    if self.graph_match == GraphMatch::Stop {
                        break;
                    }
                }
                Endpoint::DataLakeStore | Endpoint::DataLakeAnalytics => {
                    if let Some(id) = environment.data_lake_resource_id() {
                        resource = id.to_string();
                    }
                }
                Endpoint::LogAnalytics => {
                    if let Some(id) = environment.log_analytics_resource_id() {
                        resource = id.to_string();
                    }
                }
                Endpoint::ApplicationInsights => {
                    if let Some(id) = environment.application_insights_resource_id() {
                        resource = id.to_string();
                    }
                }
                Endpoint::Management | Endpoint::ResourceManager => {}
            }
        }

        tracing::debug!(
            environment = %environment,
            host = %authority,
            audience = %resource,
            "Resolved token audience"
        );
        Ok(resource)
    }
}

fn key_vault_audience(suffix: &str) -> String {
    format!("https://{}/", suffix.trim_start_matches('.'))
}

/// `"{scheme}://{host}[:{port}]/"` for a URL with a host.
pub fn authority(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::invalid_url(url.as_str(), "URL has no host"))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
        None => format!("{}://{}/", url.scheme(), host),
    })
}

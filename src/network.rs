//! Transport network settings: proxy, custom CA, connection pool.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Proxy server configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub https: Option<String>,
    pub http: Option<String>,
    /// Hosts that bypass the proxy.
    pub no_proxy: Vec<String>,
}

impl ProxyConfig {
    /// Read `HTTPS_PROXY`, `HTTP_PROXY` and `NO_PROXY` (either case).
    pub fn from_env() -> Option<Self> {
        let https = env_either("HTTPS_PROXY");
        let http = env_either("HTTP_PROXY");

        if https.is_none() && http.is_none() {
            return None;
        }

        let no_proxy = env_either("NO_PROXY")
            .map(|s| {
                s.split([',', ' '])
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            https,
            http,
            no_proxy,
        })
    }

    pub fn https(url: impl Into<String>) -> Self {
        Self {
            https: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn http(mut self, url: impl Into<String>) -> Self {
        self.http = Some(url.into());
        self
    }

    pub fn no_proxy(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.no_proxy.extend(patterns);
        self
    }

    pub fn apply_to_builder(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder> {
        let no_proxy = if self.no_proxy.is_empty() {
            None
        } else {
            reqwest::NoProxy::from_string(&self.no_proxy.join(","))
        };

        if let Some(ref url) = self.https {
            let proxy = reqwest::Proxy::https(url)
                .map_err(|e| Error::Config(format!("invalid https proxy '{}': {}", url, e)))?;
            builder = builder.proxy(proxy.no_proxy(no_proxy.clone()));
        }
        if let Some(ref url) = self.http {
            let proxy = reqwest::Proxy::http(url)
                .map_err(|e| Error::Config(format!("invalid http proxy '{}': {}", url, e)))?;
            builder = builder.proxy(proxy.no_proxy(no_proxy));
        }
        Ok(builder)
    }
}

fn env_either(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .or_else(|| env::var(key.to_lowercase()).ok())
        .filter(|v| !v.is_empty())
}

/// Network configuration for the HTTP transport.
#[derive(Clone, Debug, Default)]
pub struct HttpNetworkConfig {
    pub proxy: Option<ProxyConfig>,
    /// Extra root certificate (PEM).
    pub ca_cert: Option<PathBuf>,
    pub connect_timeout: Option<Duration>,
    pub pool_idle_timeout: Option<Duration>,
}

impl HttpNetworkConfig {
    pub fn from_env() -> Self {
        Self {
            proxy: ProxyConfig::from_env(),
            ca_cert: env::var("SSL_CERT_FILE")
                .ok()
                .or_else(|| env::var("REQUESTS_CA_BUNDLE").ok())
                .map(PathBuf::from),
            ..Default::default()
        }
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.proxy.is_some()
            || self.ca_cert.is_some()
            || self.connect_timeout.is_some()
            || self.pool_idle_timeout.is_some()
    }

    /// Build a client that never follows redirects on its own.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

        if let Some(ref proxy) = self.proxy {
            builder = proxy.apply_to_builder(builder)?;
        }

        if let Some(ref path) = self.ca_cert {
            let pem = std::fs::read(path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::Config(format!("invalid CA certificate {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(idle) = self.pool_idle_timeout {
            builder = builder.pool_idle_timeout(idle);
        }

        builder.build().map_err(Error::Network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_builder() {
        let proxy = ProxyConfig::https("https://proxy.example.com:8080")
            .http("http://proxy.example.com:8080")
            .no_proxy(vec!["localhost".to_string(), ".internal".to_string()]);

        assert!(proxy.https.is_some());
        assert!(proxy.http.is_some());
        assert_eq!(proxy.no_proxy.len(), 2);
    }

    #[test]
    fn test_proxy_applies_to_client() {
        let config = HttpNetworkConfig::default().proxy(ProxyConfig::https("http://127.0.0.1:3128"));
        assert!(config.is_configured());
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_missing_ca_cert_is_an_error() {
        let config = HttpNetworkConfig::default().ca_cert("/nonexistent/ca.pem");
        assert!(matches!(config.build_client(), Err(Error::Io(_))));
    }

    #[test]
    fn test_proxy_config_deserialize() {
        let proxy: ProxyConfig =
            serde_json::from_str(r#"{"https": "http://proxy:8080", "no_proxy": ["localhost"]}"#)
                .unwrap();
        assert_eq!(proxy.https.as_deref(), Some("http://proxy:8080"));
        assert!(proxy.http.is_none());
    }
}

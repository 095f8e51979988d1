//! # azure-pipeline
//!
//! Request authorization pipeline for Azure REST endpoints.
//!
//! Every outgoing request flows through an ordered chain of policies that
//! terminates in a transport. The crate ships the policies an Azure client
//! needs on every call: resolving the OAuth audience for the target host,
//! injecting a bearer token, and following redirects without looping.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use azure_pipeline::auth::{AzureTokenCredentials, ClientSecretCredential};
//! use azure_pipeline::{AzureEnvironment, HttpRequest, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), azure_pipeline::Error> {
//!     let environment = AzureEnvironment::azure();
//!     let credential = ClientSecretCredential::new("tenant", "client-id", "secret", &environment)?;
//!     let credentials = AzureTokenCredentials::new(Arc::new(credential), environment);
//!
//!     let pipeline = Pipeline::builder().standard(Arc::new(credentials)).build()?;
//!     let response = pipeline
//!         .send(HttpRequest::get("https://management.azure.com/subscriptions?api-version=2020-01-01")?)
//!         .await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod audience;
pub mod auth;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod config;
pub mod environment;
pub mod http;
pub mod network;
pub mod observability;
pub mod pipeline;
pub mod policies;

pub use audience::{AudienceResolver, GraphMatch};
pub use auth::{
    AccessToken, AzureTokenCredentials, CachingCredential, ChainCredential, ClientSecretCredential,
    EnvironmentCredential, ManagedIdentityCredential, StaticTokenCredential, TokenCache,
    TokenCredential,
};
#[cfg(feature = "blocking")]
pub use blocking::{BlockingCredentials, BlockingPipeline};
pub use config::{ClientConfig, ConfigError};
pub use environment::{AzureEnvironment, Endpoint};
pub use http::{HttpHeaders, HttpRequest, HttpResponse};
pub use network::{HttpNetworkConfig, ProxyConfig};
pub use pipeline::{Context, Next, Pipeline, PipelineBuilder, Policy, ReqwestTransport, Transport};
pub use policies::{
    AuthorizationPolicy, HeaderPolicy, LoggingPolicy, RedirectPolicy, RequestIdPolicy,
    UserAgentPolicy,
};

/// Error type for pipeline and credential operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Credential could not produce a token.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Identity endpoint rejected the token request.
    #[error("Token request failed (HTTP {status}): {message}")]
    TokenRequest { status: u16, message: String },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be parsed or has no host.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request exceeded its timeout.
    #[error("Operation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),

    /// Request was cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential or identity endpoint failures
    Authorization,
    /// Configuration, URL, or header errors
    Configuration,
    /// Network or server errors that may succeed on retry
    Transient,
    /// Timeouts and cancellations
    Interrupted,
    /// Internal errors (IO, JSON)
    Internal,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth { .. } => ErrorCategory::Authorization,
            Error::TokenRequest {
                status: 500..=599, ..
            } => ErrorCategory::Transient,
            Error::TokenRequest { .. } => ErrorCategory::Authorization,

            Error::Config(_) | Error::InvalidUrl { .. } | Error::InvalidHeader(_) => {
                ErrorCategory::Configuration
            }

            Error::Network(_) => ErrorCategory::Transient,

            Error::Timeout(_) | Error::Cancelled => ErrorCategory::Interrupted,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_authorization_error(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::TokenRequest { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl {
            url: String::new(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

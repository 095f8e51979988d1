//! Credentials and token acquisition.
//!
//! - [`TokenCredential`]: anything that can mint a token for a resource
//! - [`CachingCredential`]: expiry-aware cache with single-flight refresh
//! - [`AzureTokenCredentials`]: binds a credential to an [`AzureEnvironment`]
//!   and picks the audience per request URL
//!
//! [`AzureEnvironment`]: crate::environment::AzureEnvironment

mod azure;
mod cache;
mod credential;
pub mod env;
mod providers;

pub use azure::AzureTokenCredentials;
pub use cache::{CacheKey, CachingCredential, TokenCache};
pub use credential::{AccessToken, DEFAULT_SCHEME, TokenCredential, format_authorization};
pub use providers::{
    ChainCredential, ClientSecretCredential, EnvironmentCredential, ManagedIdentityCredential,
    StaticTokenCredential,
};

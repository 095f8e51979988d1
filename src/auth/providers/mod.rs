//! Token credential implementations.

mod chain;
mod client_secret;
mod environment;
mod managed_identity;
mod response;
mod static_token;

pub use chain::ChainCredential;
pub use client_secret::ClientSecretCredential;
pub use environment::EnvironmentCredential;
pub use managed_identity::ManagedIdentityCredential;
pub use static_token::StaticTokenCredential;

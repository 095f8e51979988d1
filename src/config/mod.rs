//! Explicit client configuration.
//!
//! ```rust,no_run
//! use azure_pipeline::ClientConfig;
//!
//! # async fn example() -> Result<(), azure_pipeline::Error> {
//! let config = ClientConfig::from_file("azure.json").await?;
//! let pipeline = config.build_pipeline()?;
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::ClientConfig;

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key not found
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        ConfigError::NotFound {
            key: key.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

impl ValidationErrors {
    /// `Ok` when empty, the lone error when there is one.
    pub fn into_result(mut self) -> ConfigResult<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(ConfigError::ValidationErrors(self)),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display() {
        let errors = ValidationErrors(vec![
            ConfigError::not_found("tenant_id"),
            ConfigError::invalid("timeout_secs", "must be positive"),
        ]);
        let msg = errors.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("Key not found: tenant_id; Invalid value for timeout_secs"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors(vec![]).into_result().is_ok());
        assert!(matches!(
            ValidationErrors(vec![ConfigError::not_found("a")]).into_result(),
            Err(ConfigError::NotFound { .. })
        ));
        assert!(matches!(
            ValidationErrors(vec![ConfigError::not_found("a"), ConfigError::not_found("b")])
                .into_result(),
            Err(ConfigError::ValidationErrors(_))
        ));
    }
}

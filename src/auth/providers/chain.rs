//! Chain credential.

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::{AccessToken, TokenCredential};
use crate::{Error, Result};

/// Tries credentials in order; the first token wins.
#[derive(Clone, Debug, Default)]
pub struct ChainCredential {
    credentials: Vec<Arc<dyn TokenCredential>>,
}

impl ChainCredential {
    pub fn new(credentials: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self { credentials }
    }

    pub fn with<C: TokenCredential + 'static>(mut self, credential: C) -> Self {
        self.credentials.push(Arc::new(credential));
        self
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait]
impl TokenCredential for ChainCredential {
    fn name(&self) -> &str {
        "chain"
    }

    fn cache_key(&self) -> String {
        let names: Vec<String> = self.credentials.iter().map(|c| c.cache_key()).collect();
        format!("chain[{}]", names.join(","))
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        let mut errors = Vec::new();

        for credential in &self.credentials {
            match credential.get_token(resource).await {
                Ok(token) => {
                    tracing::debug!("Token resolved from: {}", credential.name());
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!("Credential {} failed: {}", credential.name(), e);
                    errors.push(format!("{}: {}", credential.name(), e));
                }
            }
        }

        Err(Error::auth(format!(
            "No credential produced a token. Tried: {}",
            errors.join(", ")
        )))
    }
}

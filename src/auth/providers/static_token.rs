//! Fixed token credential.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Result;
use crate::auth::credential::DEFAULT_SCHEME;
use crate::auth::{AccessToken, TokenCredential};

/// Credential that always returns the same token, whatever the audience.
///
/// Each instance gets its own cache identity; clones share it.
#[derive(Clone, Debug)]
pub struct StaticTokenCredential {
    id: Uuid,
    token: AccessToken,
    scheme: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: AccessToken::new(token),
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.token = self.token.with_expiry(expires_at);
        self
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &str {
        "static"
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn cache_key(&self) -> String {
        format!("static:{}", self.id)
    }

    async fn get_token(&self, _resource: &str) -> Result<AccessToken> {
        if self.token.is_expired() {
            return Err(crate::Error::auth("static token has expired"));
        }
        Ok(self.token.clone())
    }
}

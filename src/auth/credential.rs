//! Access tokens and the credential trait.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::Result;

/// Authorization scheme used when a credential does not name one.
pub const DEFAULT_SCHEME: &str = "Bearer";

/// `"{scheme} {token}"`, falling back to [`DEFAULT_SCHEME`] for a blank scheme.
pub fn format_authorization(scheme: &str, token: &str) -> String {
    let scheme = scheme.trim();
    let scheme = if scheme.is_empty() {
        DEFAULT_SCHEME
    } else {
        scheme
    };
    format!("{} {}", scheme, token)
}

/// Bearer token scoped to one audience.
#[derive(Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Expiry `seconds` from now, or `None` if that instant is out of range.
    pub fn expires_in(self, seconds: i64) -> Option<Self> {
        let expires_at = TimeDelta::try_seconds(seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))?;
        Some(self.with_expiry(expires_at))
    }

    pub fn secret(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Utc::now() >= exp).unwrap_or(false)
    }

    /// Expired, or expiring within `margin`. Tokens without expiry never are.
    pub fn needs_refresh(&self, margin: std::time::Duration) -> bool {
        let Some(exp) = self.expires_at else {
            return false;
        };
        Duration::from_std(margin)
            .ok()
            .and_then(|margin| exp.checked_sub_signed(margin))
            .is_none_or(|refresh_at| Utc::now() >= refresh_at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens for a given resource/audience.
#[async_trait]
pub trait TokenCredential: Send + Sync + fmt::Debug {
    /// Provider name for debugging.
    fn name(&self) -> &str;

    /// Authorization scheme placed before the token.
    fn scheme(&self) -> &str {
        DEFAULT_SCHEME
    }

    /// Identity of the principal, used to key cached tokens. Two
    /// credentials that may return different tokens must not share a key.
    fn cache_key(&self) -> String;

    /// Fetch a token for `resource`. May perform network I/O.
    async fn get_token(&self, resource: &str) -> Result<AccessToken>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_authorization() {
        assert_eq!(format_authorization("Bearer", "abc"), "Bearer abc");
        assert_eq!(format_authorization("SharedKey", "k"), "SharedKey k");
        assert_eq!(format_authorization("", "abc"), "Bearer abc");
        assert_eq!(format_authorization("  ", "abc"), "Bearer abc");
    }

    #[test]
    fn test_token_without_expiry_never_refreshes() {
        let token = AccessToken::new("t");
        assert!(!token.is_expired());
        assert!(!token.needs_refresh(std::time::Duration::from_secs(300)));
        assert_eq!(token.secret(), "t");
    }

    #[test]
    fn test_token_refresh_margin() {
        let token = AccessToken::new("t").expires_in(120).unwrap();
        assert!(!token.is_expired());
        assert!(token.needs_refresh(std::time::Duration::from_secs(300)));
        assert!(!token.needs_refresh(std::time::Duration::from_secs(60)));

        let expired = AccessToken::new("t").expires_in(-1).unwrap();
        assert!(expired.is_expired());
    }

    #[test]
    fn test_expires_in_out_of_range() {
        assert!(AccessToken::new("t").expires_in(i64::MAX).is_none());
        assert!(AccessToken::new("t").expires_in(i64::MIN).is_none());
        assert!(AccessToken::new("t").expires_in(i64::MAX / 1_000_000).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("super-secret");
        assert!(!format!("{:?}", token).contains("super-secret"));
    }
}

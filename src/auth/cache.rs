//! Expiry-aware token cache with single-flight refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::{AccessToken, TokenCredential};
use crate::Result;

const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Cache key: credential identity plus audience.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identity: String,
    pub resource: String,
}

impl CacheKey {
    pub fn new(identity: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            resource: resource.into(),
        }
    }
}

/// Tokens keyed by `(identity, resource)`.
///
/// A miss takes a per-key lock before fetching, so concurrent callers for the
/// same key share one fetch. Different keys never wait on each other.
#[derive(Debug)]
pub struct TokenCache {
    entries: DashMap<CacheKey, AccessToken>,
    inflight: DashMap<CacheKey, Arc<Mutex<()>>>,
    refresh_margin: Duration,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_refresh_margin(TOKEN_REFRESH_MARGIN)
    }

    pub fn with_refresh_margin(refresh_margin: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            refresh_margin,
        }
    }

    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }

    /// Cached token that is not due for refresh.
    pub fn get(&self, key: &CacheKey) -> Option<AccessToken> {
        self.entries
            .get(key)
            .filter(|token| !token.needs_refresh(self.refresh_margin))
            .map(|token| token.value().clone())
    }

    pub fn insert(&self, key: CacheKey, token: AccessToken) {
        self.entries.insert(key, token);
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached token or run `fetch` once for all waiting callers.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken>>,
    {
        if let Some(token) = self.get(&key) {
            return Ok(token);
        }

        let lock = self.inflight.entry(key.clone()).or_default().clone();
        let _singleflight = lock.lock().await;
        let result = self.fetch_locked(&key, fetch).await;

        // The map and `lock` hold two references; any more are waiters.
        self.inflight
            .remove_if(&key, |_, entry| Arc::strong_count(entry) <= 2);
        result
    }

    async fn fetch_locked<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<AccessToken>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken>>,
    {
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.get(key) {
            return Ok(token);
        }

        tracing::debug!(identity = %key.identity, resource = %key.resource, "Fetching token");
        let token = fetch().await?;
        self.entries.insert(key.clone(), token.clone());
        Ok(token)
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.len()
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a credential with a [`TokenCache`].
#[derive(Debug, Clone)]
pub struct CachingCredential {
    inner: Arc<dyn TokenCredential>,
    cache: Arc<TokenCache>,
}

impl CachingCredential {
    pub fn new(inner: Arc<dyn TokenCredential>) -> Self {
        Self::with_cache(inner, Arc::new(TokenCache::new()))
    }

    /// Share one cache between several credentials.
    pub fn with_cache(inner: Arc<dyn TokenCredential>, cache: Arc<TokenCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn invalidate(&self, resource: &str) {
        self.cache
            .invalidate(&CacheKey::new(self.inner.cache_key(), resource));
    }
}

#[async_trait]
impl TokenCredential for CachingCredential {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    fn cache_key(&self) -> String {
        self.inner.cache_key()
    }

    async fn get_token(&self, resource: &str) -> Result<AccessToken> {
        let key = CacheKey::new(self.inner.cache_key(), resource);
        self.cache
            .get_or_fetch(key, || self.inner.get_token(resource))
            .await
    }
}

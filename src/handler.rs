//! Session storage lifecycle backed by a [`Cache`].

use crate::storage::Cache;
use crate::{Result, SessionConfig};
use std::future::Future;
use std::sync::Arc;
use time::Duration;
use tracing::{debug, trace};

/// Storage primitives a session lifecycle calls at request start, on data
/// access, at request end, and for periodic cleanup.
pub trait SessionStore: Clone + Send + Sync + 'static {
    fn open(&self, path: &str, name: &str) -> impl Future<Output = Result<()>> + Send;
    fn close(&self) -> impl Future<Output = Result<()>> + Send;
    /// Payload stored for `session_id`; empty when there is none.
    fn read(&self, session_id: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
    fn write(&self, session_id: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
    fn destroy(&self, session_id: &str) -> impl Future<Output = Result<()>> + Send;
    /// Purges stale sessions and returns how many were removed, if known.
    fn gc(&self, max_lifetime: Duration) -> impl Future<Output = Result<u64>> + Send;
}

/// Session store keeping each session as one cache entry under the
/// configured prefix.
///
/// Reads slide the expiration: an entry found with less than the refresh
/// threshold left is rewritten with the full lifetime. The lookup and the
/// rewrite are two separate cache round-trips, so concurrent readers may
/// both refresh the same entry; the rewrite carries the same payload.
#[derive(Debug, Clone)]
pub struct CacheSessionHandler<C: Cache> {
    cache: C,
    config: Arc<SessionConfig>,
}

impl<C: Cache> CacheSessionHandler<C> {
    pub fn new(cache: C, config: SessionConfig) -> Self {
        CacheSessionHandler {
            cache,
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.config.key_prefix(), session_id)
    }

    fn needs_refresh(&self, remaining: i64) -> bool {
        remaining > 0 && remaining < self.config.threshold().whole_seconds()
    }
}

impl<C: Cache> SessionStore for CacheSessionHandler<C> {
    async fn open(&self, path: &str, name: &str) -> Result<()> {
        trace!(path, name, "session open");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn read(&self, session_id: &str) -> Result<Vec<u8>> {
        let key = self.key(session_id);
        let Some(payload) = self.cache.get(&key).await? else {
            trace!(session_id, "no stored session");
            return Ok(Vec::new());
        };
        let remaining = self.cache.ttl(&key).await?;
        if remaining <= 0 {
            // Expired between the lookup and the ttl query.
            trace!(session_id, remaining, "stored session already expired");
            return Ok(Vec::new());
        }
        if self.needs_refresh(remaining) {
            debug!(session_id, remaining, "refreshing session lifetime");
            self.cache
                .set(&key, &payload, self.config.lifetime())
                .await?;
        }
        Ok(payload)
    }

    async fn write(&self, session_id: &str, data: &[u8]) -> Result<()> {
        self.cache
            .set(&self.key(session_id), data, self.config.lifetime())
            .await
    }

    async fn destroy(&self, session_id: &str) -> Result<()> {
        debug!(session_id, "destroying session");
        self.cache.delete(&self.key(session_id)).await
    }

    async fn gc(&self, max_lifetime: Duration) -> Result<u64> {
        trace!(max_lifetime = max_lifetime.whole_seconds(), "session gc");
        self.cache.gc(self.config.key_prefix()).await?;
        // The cache does not report how many entries it reclaimed.
        Ok(0)
    }
}

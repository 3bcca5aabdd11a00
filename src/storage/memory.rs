use crate::storage::Cache;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process cache keeping entries in a shared map.
///
/// Deadlines follow the tokio clock, so paused-time tests can advance them.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> crate::Result<()> {
        let expires_at = std::time::Duration::try_from(ttl)
            .ok()
            .filter(|ttl| !ttl.is_zero())
            // Deadlines past the clock's range never expire.
            .and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries().insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> crate::Result<i64> {
        let now = Instant::now();
        let remaining = match self.entries().get(key) {
            None => -2,
            Some(Entry { expires_at: None, .. }) => i64::MAX,
            Some(Entry { expires_at: Some(at), .. }) if *at > now => {
                i64::try_from(at.duration_since(now).as_secs()).unwrap_or(i64::MAX)
            }
            Some(_) => -2,
        };
        Ok(remaining)
    }

    async fn gc(&self, prefix: &str) -> crate::Result<()> {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, entry| !key.starts_with(prefix) || entry.is_live(now));
        debug!(prefix, purged = before - entries.len(), "memory cache gc");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_with_the_clock() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::seconds(10)).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), 10);

        tokio::time::advance(std::time::Duration::from_secs(4)).await;
        assert_eq!(cache.ttl("k").await.unwrap(), 6);
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::advance(std::time::Duration::from_secs(6)).await;
        assert!(cache.ttl("k").await.unwrap() <= 0);
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn non_positive_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::ZERO).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), i64::MAX);
        assert!(cache.ttl("missing").await.unwrap() <= 0);
    }

    #[tokio::test(start_paused = true)]
    async fn gc_only_purges_expired_keys_under_prefix() {
        let cache = MemoryCache::new();
        cache.set("session/a", b"1", Duration::seconds(1)).await.unwrap();
        cache.set("session/b", b"2", Duration::hours(1)).await.unwrap();
        cache.set("other/c", b"3", Duration::seconds(1)).await.unwrap();

        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        cache.gc("session/").await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("session/b").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn ttl_beyond_clock_range_never_expires() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::MAX).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), i64::MAX);
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::hours(1)).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}

use std::future::Future;
use time::Duration;

/// Key-value cache the session handler stores payloads in.
///
/// Clones must share the same underlying storage.
pub trait Cache: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = crate::Result<Option<Vec<u8>>>> + Send;
    /// Stores `value` for `ttl`. A zero or negative `ttl` stores without expiry.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> impl Future<Output = crate::Result<()>> + Send;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = crate::Result<()>> + Send;
    /// Remaining lifetime in whole seconds: `<= 0` if absent or expired,
    /// `i64::MAX` if the key never expires.
    fn ttl(&self, key: &str) -> impl Future<Output = crate::Result<i64>> + Send;
    /// Purges expired entries whose key starts with `prefix`.
    fn gc(&self, prefix: &str) -> impl Future<Output = crate::Result<()>> + Send;
}

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

//! Error types for session storage operations.

/// Error type for session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session value or payload could not be (de)serialized.
    #[error("session serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The redis backend rejected a command.
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    /// No redis connection could be taken from the pool.
    #[cfg(feature = "redis")]
    #[error("redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
}

/// Result type for session storage operations.
pub type Result<T> = std::result::Result<T, Error>;

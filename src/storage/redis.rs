use crate::storage::Cache;
use deadpool_redis::redis::{self, AsyncCommands};
use time::Duration;
use tracing::debug;

/// Keys visited per SCAN round-trip during gc.
const SCAN_BATCH: usize = 100;

#[derive(Clone)]
pub struct RedisCache {
    pub conn: deadpool_redis::Pool,
}

impl RedisCache {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        RedisCache { conn: pool }
    }
    async fn get_conn(&self) -> crate::Result<deadpool_redis::Connection> {
        Ok(self.conn.get().await?)
    }
}

impl Cache for RedisCache {
    async fn get(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        let mut conn = self.get_conn().await?;
        Ok(conn.get::<&str, Option<Vec<u8>>>(key).await?)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> crate::Result<()> {
        let mut conn = self.get_conn().await?;
        match u64::try_from(ttl.whole_seconds()) {
            Ok(seconds) if seconds > 0 => conn.set_ex::<&str, &[u8], ()>(key, value, seconds).await?,
            _ => conn.set::<&str, &[u8], ()>(key, value).await?,
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> crate::Result<()> {
        let mut conn = self.get_conn().await?;
        conn.del::<&str, ()>(key).await?;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> crate::Result<i64> {
        let mut conn = self.get_conn().await?;
        // TTL answers -2 for a missing key and -1 for a key without expiry.
        match conn.ttl::<&str, i64>(key).await? {
            -1 => Ok(i64::MAX),
            remaining => Ok(remaining),
        }
    }

    async fn gc(&self, prefix: &str) -> crate::Result<()> {
        // Redis evicts expired keys on its own; a SCAN pass additionally
        // reclaims every expired key it visits under the prefix.
        let mut conn = self.get_conn().await?;
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut visited = 0usize;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            visited += keys.len();
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(prefix, visited, "redis gc scan finished");
        Ok(())
    }
}

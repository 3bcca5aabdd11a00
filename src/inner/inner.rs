use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    UnChange,
    Change,
    Clear,
    Destroy,
}

/// One session variable, optionally carrying its own deadline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionValue {
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl SessionValue {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone)]
pub struct SessionInner {
    pub(crate) id: String,
    pub(crate) data: HashMap<String, SessionValue>,
    pub(crate) status: SessionStatus,
    pub(crate) fresh: bool,
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn deadline(ttl: Duration) -> i64 {
    now().saturating_add(ttl.whole_seconds())
}

impl SessionInner {
    /// A session that has never been stored.
    pub fn new(id: String) -> Self {
        SessionInner {
            id,
            data: HashMap::new(),
            status: SessionStatus::UnChange,
            fresh: true,
        }
    }

    /// Rebuilds a stored session from the payload the store returned.
    ///
    /// An empty payload is an empty session. A payload that does not decode
    /// is logged and dropped rather than failing the request.
    pub fn from_payload(id: String, payload: &[u8]) -> Self {
        let data = if payload.is_empty() {
            HashMap::new()
        } else {
            serde_json::from_slice(payload).unwrap_or_else(|err| {
                warn!(session_id = %id, error = %err, "discarding undecodable session payload");
                HashMap::new()
            })
        };
        SessionInner {
            id,
            data,
            status: SessionStatus::UnChange,
            fresh: false,
        }
    }

    pub fn to_payload(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn status(&self) -> SessionStatus {
        self.status
    }
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if self.data.get(key)?.is_expired(now()) {
            self.remove(key);
            return None;
        }
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value::<T>(v.value.clone()).ok())
    }
    pub fn contains(&mut self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).is_some()
    }
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> crate::Result<()> {
        self.insert(key, value, None)
    }
    pub fn set_with_expiry<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> crate::Result<()> {
        self.insert(key, value, Some(deadline(ttl)))
    }
    fn insert<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
        expires_at: Option<i64>,
    ) -> crate::Result<()> {
        let value = serde_json::to_value(value)?;
        self.data
            .insert(key.to_string(), SessionValue { value, expires_at });
        self.mark_changed();
        Ok(())
    }
    /// Attaches a deadline to an existing key. Returns `false` if the key is missing.
    pub fn expire(&mut self, key: &str, ttl: Duration) -> bool {
        if !self.contains(key) {
            return false;
        }
        if let Some(entry) = self.data.get_mut(key) {
            entry.expires_at = Some(deadline(ttl));
        }
        self.mark_changed();
        true
    }
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        if removed {
            self.mark_changed();
        }
        removed
    }
    pub fn clear(&mut self) {
        self.data.clear();
        if self.status != SessionStatus::Destroy {
            self.status = SessionStatus::Clear;
        }
    }
    pub fn destroy(&mut self) {
        self.data.clear();
        self.status = SessionStatus::Destroy;
    }
    pub fn len(&self) -> usize {
        let now = now();
        self.data.values().filter(|v| !v.is_expired(now)).count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mark_changed(&mut self) {
        // Writes after clear/destroy start a new bag that must be stored.
        self.status = SessionStatus::Change;
    }
}

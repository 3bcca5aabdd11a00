use crate::{SessionInner, SessionStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::Duration;

/// Shared handle to the session of the current request
///
/// Cloning is cheap; every clone sees the same session data. The framework
/// layer reads the final state after the handler returns and persists it.
#[derive(Clone, Debug)]
pub struct Session(pub(crate) Arc<Mutex<SessionInner>>);

impl Session {
    /// Wraps session data loaded by the framework layer
    pub fn new(inner: SessionInner) -> Self {
        Session(Arc::new(Mutex::new(inner)))
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session id carried by the session cookie
    pub fn id(&self) -> String {
        self.lock().id().to_string()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    /// Retrieves and deserializes a value from the session
    ///
    /// # Returns
    /// `None` if the key is missing, expired, or does not deserialize into `T`
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.lock().get::<T>(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Serializes and stores a value in the session
    ///
    /// # Returns
    /// Ok(()) if successful, Err if serialization fails
    pub fn set<T>(&self, key: &str, value: T) -> crate::Result<()>
    where
        T: serde::Serialize,
    {
        self.lock().set(key, value)
    }

    /// Stores a value that disappears from the session once `ttl` has elapsed
    pub fn set_with_expiry<T>(&self, key: &str, value: T, ttl: Duration) -> crate::Result<()>
    where
        T: serde::Serialize,
    {
        self.lock().set_with_expiry(key, value, ttl)
    }

    /// Gives an existing key a deadline of `ttl` from now
    ///
    /// # Returns
    /// `false` if the key is not present
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        self.lock().expire(key, ttl)
    }

    /// Removes a key-value pair from the session
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key)
    }

    /// Clears all data from the session
    ///
    /// The stored entry is deleted at the end of the request; the session id is kept.
    pub fn clear(&self) {
        self.lock().clear()
    }

    /// Deletes the stored session and instructs the client to drop its cookie
    pub fn destroy(&self) {
        self.lock().destroy()
    }

    /// Returns the number of live key-value pairs in the session
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a cloned copy of the inner SessionInner data
    pub fn inner(&self) -> SessionInner {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let session = Session::new(SessionInner::new("abc".into()));
        let other = session.clone();
        other.set("count", 1).unwrap();

        assert_eq!(session.get::<i32>("count"), Some(1));
        assert_eq!(session.status(), SessionStatus::Change);
        assert_eq!(session.id(), "abc");
    }

    #[test]
    fn remove_reports_presence() {
        let session = Session::new(SessionInner::new("abc".into()));
        session.set("user", "ann").unwrap();
        assert!(session.remove("user"));
        assert!(!session.remove("user"));
        assert!(session.is_empty());
    }

    #[test]
    fn get_with_wrong_type_is_none() {
        let session = Session::new(SessionInner::new("abc".into()));
        session.set("user", "ann").unwrap();
        assert_eq!(session.get::<i32>("user"), None);
        assert!(session.contains("user"));
    }
}

//! Session cookie persistence.

use std::sync::Arc;

use fieldops_core::ClientError;
use fieldops_kv::{KVError, KVStore};

/// Storage key under which the session cookie is persisted.
pub const SESSION_COOKIE_KEY: &str = "odoo_cookie";

fn storage(e: KVError) -> ClientError {
    ClientError::Storage(e.to_string())
}

/// Persists the session cookie so restarts do not force a fresh login.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KVStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    /// The cached cookie, if one is stored.
    pub fn cookie(&self) -> Result<Option<String>, ClientError> {
        match self.store.get(SESSION_COOKIE_KEY).map_err(storage)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| ClientError::Storage("stored cookie is not valid utf-8".to_string())),
            None => Ok(None),
        }
    }

    pub fn save(&self, cookie: &str) -> Result<(), ClientError> {
        self.store
            .set(SESSION_COOKIE_KEY, cookie.as_bytes())
            .map_err(storage)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.store.delete(SESSION_COOKIE_KEY).map_err(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_kv::MemoryStore;

    #[test]
    fn round_trip_and_clear() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.cookie().unwrap(), None);

        store.save("session_id=abc123").unwrap();
        assert_eq!(store.cookie().unwrap().as_deref(), Some("session_id=abc123"));

        store.clear().unwrap();
        assert_eq!(store.cookie().unwrap(), None);
    }
}

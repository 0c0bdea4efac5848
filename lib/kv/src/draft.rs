use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const PREFIX: &str = "draft:";

fn draft_key(name: &str) -> String {
    format!("{PREFIX}{name}")
}

/// Persists unsaved form input so an interrupted session does not lose
/// it. Drafts are stored as JSON under `draft:<name>`.
pub struct DraftStore {
    store: Arc<dyn KVStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    pub fn save<T: Serialize>(&self, name: &str, draft: &T) -> Result<(), KVError> {
        let bytes =
            serde_json::to_vec(draft).map_err(|e| KVError::Serialization(e.to_string()))?;
        self.store.set(&draft_key(name), &bytes)?;
        debug!(name, "draft saved");
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, KVError> {
        match self.store.get(&draft_key(name))? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KVError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn discard(&self, name: &str) -> Result<(), KVError> {
        self.store.delete(&draft_key(name))
    }

    /// Names of all stored drafts.
    pub fn list(&self) -> Result<Vec<String>, KVError> {
        Ok(self
            .store
            .scan(PREFIX)?
            .into_iter()
            .map(|(key, _)| key[PREFIX.len()..].to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TripDraft {
        vehicle_id: i64,
        start_km: f64,
    }

    fn drafts() -> DraftStore {
        DraftStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn save_load_discard() {
        let drafts = drafts();
        let draft = TripDraft {
            vehicle_id: 4,
            start_km: 120.5,
        };

        drafts.save("trip", &draft).unwrap();
        assert_eq!(drafts.load::<TripDraft>("trip").unwrap(), Some(draft));

        drafts.discard("trip").unwrap();
        assert_eq!(drafts.load::<TripDraft>("trip").unwrap(), None);
    }

    #[test]
    fn list_returns_bare_names() {
        let drafts = drafts();
        drafts.save("trip", &1).unwrap();
        drafts.save("audit", &2).unwrap();
        assert_eq!(drafts.list().unwrap(), vec!["audit", "trip"]);
    }
}

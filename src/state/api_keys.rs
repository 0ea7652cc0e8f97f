//! Raw values of API keys generated from this installation.
//!
//! The backend only returns a key's raw value once, at generation time, and
//! revocation needs that raw value. Keys generated elsewhere are therefore
//! listed but not revocable from here.

#[cfg(test)]
#[path = "api_keys_test.rs"]
mod api_keys_test;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::storage::{self, Storage};

pub const GENERATED_KEYS_KEY: &str = "seckav_generated_keys";

pub const NOT_REVOCABLE: &str =
    "Cannot revoke this API key. Key was generated before this session or in a different browser.";

/// Persisted map of key name to raw key value.
#[derive(Clone, Debug)]
pub struct ApiKeyRing {
    keys: Arc<Mutex<BTreeMap<String, String>>>,
    storage: Arc<dyn Storage>,
}

impl ApiKeyRing {
    /// Load the ring from `storage`. An unreadable record starts empty.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let keys = match storage::load_json::<BTreeMap<String, String>>(storage.as_ref(), GENERATED_KEYS_KEY) {
            Ok(keys) => keys.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "stored api keys unreadable; starting empty");
                BTreeMap::new()
            }
        };
        Self { keys: Arc::new(Mutex::new(keys)), storage }
    }

    fn keys(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.keys.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, keys: &BTreeMap<String, String>) {
        if let Err(e) = storage::save_json(self.storage.as_ref(), GENERATED_KEYS_KEY, keys) {
            warn!(error = %e, "failed to persist api keys");
        }
    }

    /// Record a freshly generated key. A repeated name replaces the old value.
    pub fn remember(&self, name: &str, raw_key: &str) {
        let mut keys = self.keys();
        keys.insert(name.to_owned(), raw_key.to_owned());
        self.persist(&keys);
    }

    pub fn raw_key(&self, name: &str) -> Option<String> {
        self.keys().get(name).cloned()
    }

    pub fn is_revocable(&self, name: &str) -> bool {
        self.keys().contains_key(name)
    }

    pub fn forget(&self, name: &str) {
        let mut keys = self.keys();
        if keys.remove(name).is_some() {
            self.persist(&keys);
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.keys().keys().cloned().collect()
    }
}

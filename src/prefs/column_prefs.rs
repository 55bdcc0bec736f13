use crate::prefs::store::PreferenceStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a store holds for one table, already decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredColumns {
    pub visibility: Option<HashMap<String, bool>>,
    pub order: Option<Vec<String>>,
}

/// Column preferences of one table, namespaced by its storage key.
///
/// Reads and writes never fail outward: storage trouble is logged and the
/// table keeps working with in-memory state.
#[derive(Clone)]
pub struct ColumnPrefs {
    store: Arc<dyn PreferenceStore>,
    storage_key: String,
}

impl ColumnPrefs {
    pub fn new(store: Arc<dyn PreferenceStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn visibility_key(&self) -> String {
        format!("{}-columns", self.storage_key)
    }

    pub fn order_key(&self) -> String {
        format!("{}-column-order", self.storage_key)
    }

    pub fn load(&self) -> StoredColumns {
        StoredColumns {
            visibility: self.read_json(&self.visibility_key()),
            order: self.read_json(&self.order_key()),
        }
    }

    pub fn save_visibility(&self, visibility: &BTreeMap<String, bool>) {
        self.write_json(&self.visibility_key(), visibility);
    }

    pub fn save_order(&self, order: &[String]) {
        self.write_json(&self.order_key(), &order);
    }

    /// Drop everything stored for this table
    pub fn clear(&self) {
        for key in [self.visibility_key(), self.order_key()] {
            if let Err(e) = self.store.remove(&key) {
                warn!(target: "prefs", "Failed to remove '{}': {}", key, e);
            }
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(target: "prefs", "Failed to read '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(target: "prefs", "Error parsing saved '{}': {}", key, e);
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(target: "prefs", "Failed to encode '{}': {}", key, e);
                return;
            }
        };
        match self.store.set(key, &encoded) {
            Ok(()) => debug!(target: "prefs", "Saved '{}' = {}", key, encoded),
            Err(e) => warn!(target: "prefs", "Failed to save '{}': {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::store::MemoryStore;

    #[test]
    fn test_keys_and_roundtrip() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        let prefs = ColumnPrefs::new(store.clone(), "assets");

        assert_eq!(prefs.visibility_key(), "assets-columns");
        assert_eq!(prefs.order_key(), "assets-column-order");
        assert_eq!(prefs.load(), StoredColumns::default());

        let visibility: BTreeMap<String, bool> =
            [("name".to_string(), false)].into_iter().collect();
        prefs.save_visibility(&visibility);
        prefs.save_order(&["name".to_string(), "id".to_string()]);

        assert_eq!(
            store.get("assets-columns").unwrap().as_deref(),
            Some("{\"name\":false}")
        );
        let loaded = prefs.load();
        assert_eq!(loaded.visibility.unwrap()["name"], false);
        assert_eq!(loaded.order.unwrap(), vec!["name", "id"]);

        prefs.clear();
        assert_eq!(prefs.load(), StoredColumns::default());
    }

    #[test]
    fn test_unparseable_value_is_ignored() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        store.set("assets-columns", "{broken").unwrap();

        let prefs = ColumnPrefs::new(store, "assets");
        assert_eq!(prefs.load().visibility, None);
    }
}

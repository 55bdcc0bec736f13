//! Persistence of per-table column preferences.
//!
//! The store is a flat string key/value map, the same shape a browser's
//! local storage has. Only column visibility and order are ever written.

pub mod column_prefs;
pub mod store;

pub use column_prefs::{ColumnPrefs, StoredColumns};
pub use store::{FileStore, MemoryStore, PreferenceStore, PrefsError};

use crate::view::ViewError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Static description of one table column, declared by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub draggable: bool,
    pub default_visible: bool,
    pub hideable: bool,
    /// Left blank when a new row is drafted
    #[serde(default)]
    pub read_only: bool,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            draggable: true,
            default_visible: true,
            hideable: true,
            read_only: false,
        }
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.draggable = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }

    /// The column can never be hidden
    pub fn always_visible(mut self) -> Self {
        self.hideable = false;
        self.default_visible = true;
        self
    }
}

/// Column order and visibility for one table
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    columns: Vec<ColumnDescriptor>,
    order: Vec<String>,
    visibility: HashMap<String, bool>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let order = columns.iter().map(|c| c.key.clone()).collect();
        let visibility = Self::default_visibility(&columns);
        Self {
            columns,
            order,
            visibility,
        }
    }

    /// Build a layout from stored preferences. Stored keys that are no longer
    /// declared are dropped, newly declared columns are appended with their
    /// default visibility, and non-hideable columns are always visible.
    pub fn with_stored(
        columns: Vec<ColumnDescriptor>,
        stored_visibility: Option<&HashMap<String, bool>>,
        stored_order: Option<&[String]>,
    ) -> Self {
        let mut layout = Self::new(columns);

        if let Some(stored) = stored_visibility {
            for column in &layout.columns {
                if let Some(&visible) = stored.get(&column.key) {
                    layout
                        .visibility
                        .insert(column.key.clone(), visible || !column.hideable);
                }
            }
        }

        if let Some(stored) = stored_order {
            let declared: HashSet<&str> = layout.columns.iter().map(|c| c.key.as_str()).collect();
            let mut seen = HashSet::new();
            let mut order: Vec<String> = stored
                .iter()
                .filter(|key| declared.contains(key.as_str()) && seen.insert(key.as_str()))
                .cloned()
                .collect();
            for column in &layout.columns {
                if !seen.contains(column.key.as_str()) {
                    order.push(column.key.clone());
                }
            }
            layout.order = order;
        }

        layout
    }

    fn default_visibility(columns: &[ColumnDescriptor]) -> HashMap<String, bool> {
        columns
            .iter()
            .map(|c| (c.key.clone(), c.default_visible || !c.hideable))
            .collect()
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn descriptor(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(false)
    }

    /// Current order of all declared columns, hidden ones included
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.order
            .iter()
            .filter(|key| self.is_visible(key))
            .filter_map(|key| self.descriptor(key))
            .collect()
    }

    pub fn visible_keys(&self) -> Vec<String> {
        self.visible_columns()
            .into_iter()
            .map(|c| c.key.clone())
            .collect()
    }

    /// Visibility of every declared column, as persisted
    pub fn visibility_map(&self) -> BTreeMap<String, bool> {
        self.columns
            .iter()
            .map(|c| (c.key.clone(), self.is_visible(&c.key)))
            .collect()
    }

    /// Flip a column's visibility. Returns false when nothing changed
    /// (unknown or non-hideable column).
    pub fn toggle(&mut self, key: &str) -> bool {
        let Some(column) = self.descriptor(key) else {
            return false;
        };
        if !column.hideable {
            return false;
        }
        let visible = self.is_visible(key);
        self.visibility.insert(key.to_string(), !visible);
        true
    }

    /// Replace the order with a permutation of the declared keys
    pub fn reorder(&mut self, new_order: &[String]) -> Result<(), ViewError> {
        let declared: HashSet<&str> = self.columns.iter().map(|c| c.key.as_str()).collect();
        let proposed: HashSet<&str> = new_order.iter().map(String::as_str).collect();

        if new_order.len() != self.columns.len() || proposed != declared {
            return Err(ViewError::InvalidColumnOrder(new_order.to_vec()));
        }

        self.order = new_order.to_vec();
        Ok(())
    }

    /// Drag-and-drop move: `active` takes the position `over` held, the
    /// columns between shift by one. Only draggable columns move.
    pub fn move_column(&mut self, active: &str, over: &str) -> bool {
        if active == over {
            return false;
        }
        let draggable = |key: &str| self.descriptor(key).map_or(false, |c| c.draggable);
        if !draggable(active) || !draggable(over) {
            return false;
        }

        let (Some(from), Some(to)) = (
            self.order.iter().position(|k| k == active),
            self.order.iter().position(|k| k == over),
        ) else {
            return false;
        };

        let key = self.order.remove(from);
        self.order.insert(to, key);
        true
    }

    /// Declared order and default visibility
    pub fn reset(&mut self) {
        self.order = self.columns.iter().map(|c| c.key.clone()).collect();
        self.visibility = Self::default_visibility(&self.columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "ID").always_visible().fixed(),
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("site", "Site"),
            ColumnDescriptor::new("notes", "Notes").hidden_by_default(),
        ]
    }

    fn keys(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let layout = ColumnLayout::new(columns());
        assert_eq!(layout.visible_keys(), keys(&["id", "name", "site"]));
        assert!(!layout.visibility_map()["notes"]);
    }

    #[test]
    fn test_toggle_respects_hideable() {
        let mut layout = ColumnLayout::new(columns());

        assert!(!layout.toggle("id"));
        assert!(!layout.toggle("missing"));
        assert!(layout.toggle("notes"));
        assert_eq!(layout.visible_keys(), keys(&["id", "name", "site", "notes"]));
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut layout = ColumnLayout::new(columns());

        assert!(layout.reorder(&keys(&["name", "id"])).is_err());
        assert!(layout
            .reorder(&keys(&["name", "id", "site", "site"]))
            .is_err());
        layout
            .reorder(&keys(&["site", "notes", "name", "id"]))
            .unwrap();
        assert_eq!(layout.visible_keys(), keys(&["site", "name", "id"]));
    }

    #[test]
    fn test_move_column_array_move() {
        let mut layout = ColumnLayout::new(columns());

        assert!(layout.move_column("site", "name"));
        assert_eq!(layout.order(), keys(&["id", "site", "name", "notes"]).as_slice());

        assert!(layout.move_column("site", "notes"));
        assert_eq!(layout.order(), keys(&["id", "name", "notes", "site"]).as_slice());

        // "id" is fixed
        assert!(!layout.move_column("name", "id"));
        assert!(!layout.move_column("id", "name"));
    }

    #[test]
    fn test_with_stored_merges_and_forces_visible() {
        let stored_visibility: HashMap<String, bool> = [
            ("id".to_string(), false),
            ("site".to_string(), false),
            ("gone".to_string(), true),
        ]
        .into_iter()
        .collect();
        let stored_order = keys(&["gone", "site", "name"]);

        let layout = ColumnLayout::with_stored(
            columns(),
            Some(&stored_visibility),
            Some(&stored_order),
        );

        assert_eq!(layout.order(), keys(&["site", "name", "id", "notes"]).as_slice());
        assert_eq!(layout.visible_keys(), keys(&["name", "id"]));
    }
}

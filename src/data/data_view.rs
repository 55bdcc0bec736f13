use std::sync::Arc;

use crate::data::datatable::{DataRow, DataTable, DataValue};
use crate::data::datavalue_compare::compare_for_sort;

/// A view over a DataTable that can filter, sort, and project columns
/// without modifying the underlying data
#[derive(Clone, Debug)]
pub struct DataView {
    /// The underlying immutable data source
    source: Arc<DataTable>,

    /// Row indices that are visible (after filtering and sorting)
    visible_rows: Vec<usize>,

    /// Projected columns as (key, source index). A key the source does not
    /// have projects to null.
    visible_columns: Vec<(String, Option<usize>)>,

    /// Limit and offset for pagination
    limit: Option<usize>,
    offset: usize,
}

impl DataView {
    /// Create a new view showing all data from the table
    pub fn new(source: Arc<DataTable>) -> Self {
        let row_count = source.row_count();
        let visible_columns = source
            .columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), Some(idx)))
            .collect();

        Self {
            source,
            visible_rows: (0..row_count).collect(),
            visible_columns,
            limit: None,
            offset: 0,
        }
    }

    /// Project the view onto the given column keys, in that order
    pub fn with_column_keys<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.visible_columns = keys
            .iter()
            .map(|key| {
                let key = key.as_ref();
                (key.to_string(), self.source.get_column_index(key))
            })
            .collect();
        self
    }

    /// Apply limit and offset
    pub fn with_limit(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Filter rows based on a predicate
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&DataRow) -> bool,
    {
        let source = &self.source;
        self.visible_rows
            .retain(|&row_idx| source.row(row_idx).map_or(false, &predicate));
        self
    }

    /// Stable sort by a source column. Null and missing values go last in
    /// both directions.
    pub fn sort_by(mut self, column_index: Option<usize>, ascending: bool) -> Self {
        let Some(column_index) = column_index else {
            return self;
        };

        let source = &self.source;
        self.visible_rows.sort_by(|&a, &b| {
            compare_for_sort(
                source.get_value(a, column_index),
                source.get_value(b, column_index),
                ascending,
            )
        });
        self
    }

    /// Sort by column key; an unknown key leaves the order alone
    pub fn sort_by_key(self, key: &str, ascending: bool) -> Self {
        let column_index = self.source.get_column_index(key);
        self.sort_by(column_index, ascending)
    }

    /// 1-based page of `page_size` rows
    pub fn page(self, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        self.with_limit(page_size, page.saturating_sub(1) * page_size)
    }

    /// Get the number of visible rows (respecting limit/offset)
    pub fn row_count(&self) -> usize {
        let available = self.visible_rows.len().saturating_sub(self.offset);
        match self.limit {
            Some(limit) => available.min(limit),
            None => available,
        }
    }

    /// Number of rows that passed filtering, ignoring limit/offset
    pub fn total_row_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Get the number of visible columns
    pub fn column_count(&self) -> usize {
        self.visible_columns.len()
    }

    /// Keys of the projected columns
    pub fn column_names(&self) -> Vec<String> {
        self.visible_columns.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Get a source row by view position (respecting limit/offset)
    pub fn source_row(&self, index: usize) -> Option<&DataRow> {
        if let Some(limit) = self.limit {
            if index >= limit {
                return None;
            }
        }
        let row_idx = *self.visible_rows.get(index + self.offset)?;
        self.source.row(row_idx)
    }

    /// Get a projected row by view position (respecting limit/offset)
    pub fn get_row(&self, index: usize) -> Option<DataRow> {
        let row = self.source_row(index)?;
        let values = self
            .visible_columns
            .iter()
            .map(|(_, col_idx)| {
                col_idx
                    .and_then(|idx| row.get(idx))
                    .cloned()
                    .unwrap_or(DataValue::Null)
            })
            .collect();
        Some(DataRow::new(row.id.clone(), values))
    }

    /// Get all visible rows (respecting limit/offset)
    pub fn get_rows(&self) -> Vec<DataRow> {
        (0..self.row_count()).filter_map(|i| self.get_row(i)).collect()
    }

    /// Ids of the visible rows (respecting limit/offset)
    pub fn row_ids(&self) -> Vec<&str> {
        (0..self.row_count())
            .filter_map(|i| self.source_row(i))
            .map(|row| row.id.as_str())
            .collect()
    }

    /// Get visible row indices (before limit/offset)
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }
}

use crate::config::Config;
use crate::data::data_exporter::{DataExporter, ExportError, ExportFile, ExportFormat};
use crate::data::data_view::DataView;
use crate::data::datatable::{DataRow, DataTable, DataValue};
use crate::debouncer::Debouncer;
use crate::prefs::{ColumnPrefs, PreferenceStore};
use crate::view::columns::{ColumnDescriptor, ColumnLayout};
use crate::view::pagination::{page_numbers, PageItem, Pagination};
use crate::view::search::{RowMatcher, SearchMode};
use crate::view::selection::{Selection, SelectionState};
use crate::view::ViewError;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Per-table behaviour chosen by the page
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub page_size: usize,
    pub pagination: bool,
    /// Fields the search term is matched against; `None` means every field
    pub search_fields: Option<Vec<String>>,
    pub search_mode: SearchMode,
    /// When false the term only goes to the search-change callback and the
    /// rows are left unfiltered (the backend searches)
    pub client_search: bool,
    pub search_debounce_ms: u64,
    pub placeholder: String,
    pub empty_message: String,
    pub export_file_name: String,
    pub export_format: ExportFormat,
    pub max_visible_pages: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TableOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.display.page_size,
            pagination: true,
            search_fields: None,
            search_mode: config.search.mode(),
            client_search: true,
            search_debounce_ms: config.search.debounce_ms,
            placeholder: config.display.placeholder.clone(),
            empty_message: config.display.empty_message.clone(),
            export_file_name: config.export.file_name.clone(),
            export_format: config.export.format,
            max_visible_pages: config.display.max_visible_pages,
        }
    }
}

/// What a caller-supplied export handler receives: the filtered rows in
/// display order (all pages), the visible columns in order and the
/// visibility of every declared column
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub rows: Vec<DataRow>,
    pub columns: Vec<ColumnDescriptor>,
    pub visibility: BTreeMap<String, bool>,
}

pub trait ExportHandler: Send {
    fn export(&mut self, request: &ExportRequest) -> Result<(), ExportError>;
}

impl<F> ExportHandler for F
where
    F: FnMut(&ExportRequest) -> Result<(), ExportError> + Send,
{
    fn export(&mut self, request: &ExportRequest) -> Result<(), ExportError> {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The caller's handler took the rows
    Delegated { rows: usize },
    /// Materialized by the controller; the caller saves it
    File(ExportFile),
}

/// A named action over the selected rows
pub struct BulkAction {
    label: String,
    action: Box<dyn FnMut(&[DataRow]) + Send>,
}

impl BulkAction {
    pub fn new(label: impl Into<String>, action: impl FnMut(&[DataRow]) + Send + 'static) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub draggable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub id: String,
    pub cells: Vec<String>,
    pub selected: bool,
    pub disabled: bool,
}

/// Values typed into the new-row draft, by column key
pub type RowDraft = BTreeMap<String, String>;

type RowPredicate = Box<dyn Fn(&DataRow) -> bool + Send>;
type SearchCallback = Box<dyn FnMut(&str) + Send>;
type RowCallback = Box<dyn FnMut(&DataRow) + Send>;
type AddRowCallback = Box<dyn FnMut(&RowDraft) + Send>;

/// Search, sort, pagination, column layout, selection and export over one
/// in-memory data set.
///
/// Column visibility and order are read from the preference store at
/// construction and written back on every change. Everything else starts
/// fresh with each controller.
pub struct TableViewController {
    options: TableOptions,
    prefs: ColumnPrefs,
    layout: ColumnLayout,
    table: Arc<DataTable>,
    /// Search and sort applied, no paging
    filtered: DataView,
    search_term: String,
    sort: Option<SortSpec>,
    pagination: Pagination,
    selection: Selection,
    search_input: Debouncer<String>,
    row_disabled: Option<RowPredicate>,
    export_handler: Option<Box<dyn ExportHandler>>,
    bulk_actions: Vec<BulkAction>,
    on_search_change: Option<SearchCallback>,
    on_row_activate: Option<RowCallback>,
    on_add_row: Option<AddRowCallback>,
    draft: Option<RowDraft>,
}

impl TableViewController {
    pub fn new(
        columns: Vec<ColumnDescriptor>,
        store: Arc<dyn PreferenceStore>,
        storage_key: impl Into<String>,
        options: TableOptions,
    ) -> Self {
        let prefs = ColumnPrefs::new(store, storage_key);
        let stored = prefs.load();
        let layout = ColumnLayout::with_stored(
            columns,
            stored.visibility.as_ref(),
            stored.order.as_deref(),
        );
        debug!(
            target: "table_view",
            "Table '{}' columns: {:?}",
            prefs.storage_key(),
            layout.visible_keys()
        );

        let table = Arc::new(DataTable::new(prefs.storage_key()));
        Self {
            pagination: Pagination::new(options.page_size, options.pagination),
            search_input: Debouncer::new(options.search_debounce_ms),
            filtered: DataView::new(table.clone()),
            table,
            options,
            prefs,
            layout,
            search_term: String::new(),
            sort: None,
            selection: Selection::default(),
            row_disabled: None,
            export_handler: None,
            bulk_actions: Vec::new(),
            on_search_change: None,
            on_row_activate: None,
            on_add_row: None,
            draft: None,
        }
    }

    /// Rows matching the predicate are shown greyed out and cannot be selected
    pub fn with_row_disabled(
        mut self,
        predicate: impl Fn(&DataRow) -> bool + Send + 'static,
    ) -> Self {
        self.row_disabled = Some(Box::new(predicate));
        self
    }

    pub fn with_export_handler(mut self, handler: impl ExportHandler + 'static) -> Self {
        self.export_handler = Some(Box::new(handler));
        self
    }

    pub fn with_bulk_action(mut self, action: BulkAction) -> Self {
        self.bulk_actions.push(action);
        self
    }

    /// Called with every applied search term, filtered locally or not
    pub fn on_search_change(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_search_change = Some(Box::new(callback));
        self
    }

    /// Called with the row when it is clicked or opened
    pub fn on_row_activate(mut self, callback: impl FnMut(&DataRow) + Send + 'static) -> Self {
        self.on_row_activate = Some(Box::new(callback));
        self
    }

    /// Enables the new-row draft; the callback receives each saved draft
    pub fn on_add_row(mut self, callback: impl FnMut(&RowDraft) + Send + 'static) -> Self {
        self.on_add_row = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn storage_key(&self) -> &str {
        self.prefs.storage_key()
    }

    // ---- data ----

    pub fn set_data(&mut self, table: DataTable) {
        self.set_table(Arc::new(table));
    }

    /// Replace the full data set. Search and sort are re-applied, selected
    /// ids no longer present are dropped and the page is clamped.
    pub fn set_table(&mut self, table: Arc<DataTable>) {
        let pruned = self.selection.retain(|id| table.contains_id(id));
        self.table = table;
        self.recompute();
        info!(
            target: "table_view",
            "Table '{}' loaded {} rows ({} after search, {} stale selections dropped)",
            self.storage_key(),
            self.table.row_count(),
            self.filtered_count(),
            pruned
        );
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn total_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.total_row_count()
    }

    // ---- search ----

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Replace the search term and go back to the first page
    pub fn set_search_term(&mut self, term: &str) {
        self.search_input.reset();
        self.apply_search(term.to_string());
    }

    pub fn clear_search(&mut self) {
        self.set_search_term("");
    }

    /// Feed raw input; the term is applied by `poll_search` once typing pauses
    pub fn type_search(&mut self, raw: impl Into<String>) {
        self.search_input.push(raw.into());
    }

    pub fn type_search_at(&mut self, raw: impl Into<String>, now: Instant) {
        self.search_input.push_at(raw.into(), now);
    }

    /// Apply typed input if the debounce delay has passed. Returns true when
    /// a term was applied.
    pub fn poll_search(&mut self) -> bool {
        self.poll_search_at(Instant::now())
    }

    pub fn poll_search_at(&mut self, now: Instant) -> bool {
        match self.search_input.poll_at(now) {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    /// Apply typed input immediately
    pub fn flush_search(&mut self) -> bool {
        match self.search_input.flush() {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.search_input.is_pending()
    }

    fn apply_search(&mut self, term: String) {
        debug!(target: "table_view", "Search term '{}' -> '{}'", self.search_term, term);
        self.search_term = term;
        self.pagination.reset();
        if let Some(callback) = self.on_search_change.as_mut() {
            callback(&self.search_term);
        }
        self.recompute();
    }

    // ---- sort ----

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Sort by `key`, or flip the direction if it already is the sort
    /// column. Returns false for unknown or non-sortable columns.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        if !self.layout.descriptor(key).map_or(false, |c| c.sortable) {
            debug!(target: "table_view", "Ignoring sort on '{}'", key);
            return false;
        }

        self.sort = Some(match self.sort.take() {
            Some(current) if current.key == key => SortSpec {
                direction: current.direction.flipped(),
                ..current
            },
            _ => SortSpec {
                key: key.to_string(),
                direction: SortDirection::Ascending,
            },
        });
        debug!(target: "table_view", "Sort: {:?}", self.sort);
        self.recompute();
        true
    }

    // ---- pagination ----

    pub fn current_page(&self) -> usize {
        self.pagination.page()
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.filtered_count())
    }

    /// Go to page `page`, clamped into range; returns the page shown
    pub fn set_page(&mut self, page: usize) -> usize {
        let rows = self.filtered_count();
        self.pagination.set_page(page, rows)
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page() + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.current_page().saturating_sub(1))
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let rows = self.filtered_count();
        self.pagination.set_page_size(page_size, rows);
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(
            self.current_page(),
            self.total_pages(),
            self.options.max_visible_pages,
        )
    }

    // ---- columns ----

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.layout.visible_columns()
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        self.layout.is_visible(key)
    }

    /// Show or hide a column and persist. Returns false when the column is
    /// unknown or cannot be hidden.
    pub fn toggle_column_visibility(&mut self, key: &str) -> bool {
        if !self.layout.toggle(key) {
            debug!(target: "table_view", "Column '{}' visibility unchanged", key);
            return false;
        }
        self.prefs.save_visibility(&self.layout.visibility_map());
        true
    }

    pub fn reorder_columns(&mut self, new_order: &[String]) -> Result<(), ViewError> {
        self.layout.reorder(new_order)?;
        self.prefs.save_order(self.layout.order());
        Ok(())
    }

    /// Drag `active` onto the position of `over`
    pub fn move_column(&mut self, active: &str, over: &str) -> bool {
        if !self.layout.move_column(active, over) {
            return false;
        }
        self.prefs.save_order(self.layout.order());
        true
    }

    /// Declared order and default visibility, written back to the store
    pub fn reset_columns(&mut self) {
        self.layout.reset();
        self.prefs.clear();
        self.prefs.save_visibility(&self.layout.visibility_map());
        self.prefs.save_order(self.layout.order());
        info!(target: "table_view", "Reset columns of '{}'", self.storage_key());
    }

    // ---- selection ----

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Returns true when the selection changed. Unknown and disabled rows
    /// cannot be selected.
    pub fn select_row(&mut self, id: &str, selected: bool) -> bool {
        if selected {
            let Some(row) = self
                .table
                .row_index_by_id(id)
                .and_then(|index| self.table.row(index))
            else {
                return false;
            };
            if self.is_disabled(row) {
                return false;
            }
        }
        self.selection.set(id, selected)
    }

    /// Select every enabled filtered row, or deselect every filtered row
    pub fn select_all(&mut self, selected: bool) {
        let ids: Vec<String> = self
            .filtered_rows()
            .filter(|row| !selected || !self.is_disabled(row))
            .map(|row| row.id.clone())
            .collect();
        for id in &ids {
            self.selection.set(id, selected);
        }
        debug!(
            target: "table_view",
            "select_all({}) over {} rows, {} selected",
            selected,
            ids.len(),
            self.selection.len()
        );
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Header checkbox state over the enabled filtered rows
    pub fn selection_state(&self) -> SelectionState {
        self.selection.state(
            self.filtered_rows()
                .filter(|row| !self.is_disabled(row))
                .map(|row| row.id.as_str()),
        )
    }

    /// Selected rows within the current search, in display order
    pub fn selected_rows(&self) -> Vec<DataRow> {
        self.filtered_rows()
            .filter(|row| self.selection.contains(&row.id))
            .cloned()
            .collect()
    }

    pub fn bulk_action_labels(&self) -> Vec<&str> {
        self.bulk_actions.iter().map(BulkAction::label).collect()
    }

    /// Run the named bulk action over the selected rows. Ok(false) when
    /// nothing is selected.
    pub fn run_bulk_action(&mut self, label: &str) -> Result<bool, ViewError> {
        let rows = self.selected_rows();
        let action = self
            .bulk_actions
            .iter_mut()
            .find(|a| a.label == label)
            .ok_or_else(|| ViewError::UnknownBulkAction(label.to_string()))?;

        if rows.is_empty() {
            return Ok(false);
        }
        (action.action)(&rows);
        info!(target: "table_view", "Bulk action '{}' ran on {} rows", label, rows.len());
        Ok(true)
    }

    // ---- row activation ----

    /// Hand the row to the activation callback. False for unknown ids or
    /// when no callback is registered.
    pub fn activate_row(&mut self, id: &str) -> bool {
        let table = self.table.clone();
        let Some(row) = table.row_index_by_id(id).and_then(|index| table.row(index)) else {
            debug!(target: "table_view", "Activate on unknown row '{}'", id);
            return false;
        };
        match self.on_row_activate.as_mut() {
            Some(callback) => {
                callback(row);
                true
            }
            None => false,
        }
    }

    // ---- new row draft ----

    pub fn can_add_row(&self) -> bool {
        self.on_add_row.is_some()
    }

    pub fn is_adding_row(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&RowDraft> {
        self.draft.as_ref()
    }

    /// Visible columns that take input in the draft row
    pub fn draft_columns(&self) -> Vec<&ColumnDescriptor> {
        self.visible_columns()
            .into_iter()
            .filter(|c| !c.read_only)
            .collect()
    }

    /// Open an empty draft. False when adding rows is not enabled.
    pub fn begin_add_row(&mut self) -> bool {
        if !self.can_add_row() {
            return false;
        }
        self.draft = Some(RowDraft::new());
        true
    }

    /// Set one draft cell. Blank text clears it. Read-only and unknown
    /// columns are refused, as is any edit without an open draft.
    pub fn set_draft_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        if !self.layout.descriptor(key).map_or(false, |c| !c.read_only) {
            return false;
        }
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let value = value.into();
        if value.trim().is_empty() {
            draft.remove(key);
        } else {
            draft.insert(key.to_string(), value);
        }
        true
    }

    pub fn cancel_add_row(&mut self) {
        self.draft = None;
    }

    /// Close the draft, passing it to the add-row callback if anything was
    /// entered. Returns true when the callback ran.
    pub fn save_new_row(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        if draft.is_empty() {
            debug!(target: "table_view", "Discarding empty draft row");
            return false;
        }
        match self.on_add_row.as_mut() {
            Some(callback) => {
                callback(&draft);
                info!(target: "table_view", "New row submitted with {} values", draft.len());
                true
            }
            None => false,
        }
    }

    // ---- rendering ----

    pub fn headers(&self) -> Vec<HeaderCell> {
        self.layout
            .visible_columns()
            .into_iter()
            .map(|c| HeaderCell {
                key: c.key.clone(),
                label: c.label.clone(),
                sortable: c.sortable,
                draggable: c.draggable,
                sort: self
                    .sort
                    .as_ref()
                    .filter(|s| s.key == c.key)
                    .map(|s| s.direction),
            })
            .collect()
    }

    /// Cells of the current page, one per visible column
    pub fn page_rows(&self) -> Vec<RenderedRow> {
        let keys = self.layout.visible_keys();
        let mut view = self.filtered.clone().with_column_keys(&keys);
        if self.pagination.is_enabled() {
            view = view.page(self.current_page(), self.page_size());
        }

        (0..view.row_count())
            .filter_map(|i| {
                let source = view.source_row(i)?;
                let projected = view.get_row(i)?;
                Some(RenderedRow {
                    selected: self.selection.contains(&projected.id),
                    disabled: self.is_disabled(source),
                    cells: projected.values.iter().map(|v| self.cell_text(v)).collect(),
                    id: projected.id,
                })
            })
            .collect()
    }

    /// Message to show instead of rows, if there are none
    pub fn empty_message(&self) -> Option<&str> {
        (self.filtered_count() == 0).then_some(self.options.empty_message.as_str())
    }

    pub fn cell_text(&self, value: &DataValue) -> String {
        match value {
            DataValue::Null => self.options.placeholder.clone(),
            DataValue::String(s) if s.trim().is_empty() => self.options.placeholder.clone(),
            other => other.to_string(),
        }
    }

    // ---- export ----

    pub fn export_rows(&mut self) -> Result<ExportOutcome, ViewError> {
        self.export_rows_on(Local::now().date_naive())
    }

    /// Export the filtered rows (all pages) over the visible columns. A
    /// registered handler gets the rows; otherwise a file is produced.
    pub fn export_rows_on(&mut self, date: NaiveDate) -> Result<ExportOutcome, ViewError> {
        if self.export_handler.is_some() {
            let request = ExportRequest {
                rows: self.filtered_rows().cloned().collect(),
                columns: self.visible_columns().into_iter().cloned().collect(),
                visibility: self.layout.visibility_map(),
            };
            if let Some(handler) = self.export_handler.as_mut() {
                handler.export(&request)?;
            }
            info!(
                target: "table_view",
                "Export of {} rows handed to caller",
                request.rows.len()
            );
            return Ok(ExportOutcome::Delegated {
                rows: request.rows.len(),
            });
        }

        let columns = self.visible_columns();
        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        let headers: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
        let view = self.filtered.clone().with_column_keys(&keys);

        let file = DataExporter::export(
            &view,
            &headers,
            self.options.export_format,
            &self.options.export_file_name,
            date,
        )?;
        Ok(ExportOutcome::File(file))
    }

    // ---- internals ----

    fn is_disabled(&self, row: &DataRow) -> bool {
        self.row_disabled.as_ref().map_or(false, |f| f(row))
    }

    fn filtered_rows(&self) -> impl Iterator<Item = &DataRow> {
        self.filtered
            .visible_row_indices()
            .iter()
            .filter_map(move |&index| self.table.row(index))
    }

    fn search_field_indices(&self) -> Vec<usize> {
        match &self.options.search_fields {
            Some(keys) => keys
                .iter()
                .filter_map(|key| self.table.get_column_index(key))
                .collect(),
            None => (0..self.table.column_count()).collect(),
        }
    }

    /// Re-derive the filtered view from the data, search term and sort,
    /// then pull the page back into range
    fn recompute(&mut self) {
        let mut view = DataView::new(self.table.clone());

        if self.options.client_search && !self.search_term.is_empty() {
            let matcher = RowMatcher::new(
                &self.search_term,
                self.options.search_mode,
                self.search_field_indices(),
            );
            view = view.filter(|row| matcher.matches(row));
        }

        if let Some(sort) = &self.sort {
            view = view.sort_by_key(&sort.key, sort.direction.is_ascending());
        }

        self.filtered = view;
        let rows = self.filtered_count();
        self.pagination.clamp(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataColumn;
    use crate::prefs::MemoryStore;

    fn table() -> DataTable {
        let mut table = DataTable::new("rooms");
        table.add_column(DataColumn::new("name"));
        table.add_column(DataColumn::new("floor"));
        for (id, name, floor) in [
            ("1", "Board room", Some(3)),
            ("2", "", Some(1)),
            ("3", "Lobby", None),
        ] {
            table
                .add_row(DataRow::new(
                    id,
                    vec![
                        DataValue::String(name.to_string()),
                        floor.map(DataValue::Integer).unwrap_or(DataValue::Null),
                    ],
                ))
                .unwrap();
        }
        table
    }

    fn controller() -> TableViewController {
        let columns = vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("floor", "Floor"),
            ColumnDescriptor::new("capacity", "Capacity").not_sortable(),
        ];
        let mut controller = TableViewController::new(
            columns,
            Arc::new(MemoryStore::new()),
            "rooms",
            TableOptions::default(),
        );
        controller.set_data(table());
        controller
    }

    #[test]
    fn test_placeholder_for_null_blank_and_missing() {
        let controller = controller();
        let rows = controller.page_rows();

        assert_eq!(rows[0].cells, vec!["Board room", "3", "-"]);
        assert_eq!(rows[1].cells, vec!["-", "1", "-"]);
        assert_eq!(rows[2].cells, vec!["Lobby", "-", "-"]);
    }

    #[test]
    fn test_toggle_sort_flips_and_ignores_unsortable() {
        let mut controller = controller();

        assert!(!controller.toggle_sort("capacity"));
        assert!(!controller.toggle_sort("unknown"));
        assert!(controller.sort().is_none());

        controller.toggle_sort("floor");
        let ids: Vec<String> = controller.page_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        controller.toggle_sort("floor");
        assert_eq!(controller.sort().unwrap().direction, SortDirection::Descending);
        let ids: Vec<String> = controller.page_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let headers = controller.headers();
        assert_eq!(headers[1].sort, Some(SortDirection::Descending));
        assert_eq!(headers[0].sort, None);
    }

    #[test]
    fn test_client_search_disabled_forwards_term() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut controller = TableViewController::new(
            vec![ColumnDescriptor::new("name", "Name")],
            Arc::new(MemoryStore::new()),
            "rooms",
            TableOptions {
                client_search: false,
                ..TableOptions::default()
            },
        )
        .on_search_change(move |term| sink.lock().unwrap().push(term.to_string()));
        controller.set_data(table());

        controller.set_search_term("lobby");
        assert_eq!(controller.filtered_count(), 3);
        assert_eq!(controller.search_term(), "lobby");
        assert_eq!(*seen.lock().unwrap(), vec!["lobby".to_string()]);
    }

    #[test]
    fn test_debounced_search() {
        let mut controller = controller();
        let start = Instant::now();

        controller.type_search_at("lob", start);
        assert!(!controller.poll_search_at(start + std::time::Duration::from_millis(100)));
        assert_eq!(controller.filtered_count(), 3);

        assert!(controller.poll_search_at(start + std::time::Duration::from_millis(800)));
        assert_eq!(controller.filtered_count(), 1);

        controller.type_search("board");
        assert!(controller.flush_search());
        assert_eq!(controller.page_rows()[0].id, "1");
    }

    #[test]
    fn test_activate_row_invokes_callback_for_known_ids() {
        let opened = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = opened.clone();
        let mut controller = TableViewController::new(
            vec![ColumnDescriptor::new("name", "Name")],
            Arc::new(MemoryStore::new()),
            "rooms",
            TableOptions::default(),
        )
        .on_row_activate(move |row| sink.lock().unwrap().push(row.id.clone()));
        controller.set_data(table());

        assert!(controller.activate_row("3"));
        assert!(!controller.activate_row("99"));
        assert_eq!(*opened.lock().unwrap(), vec!["3".to_string()]);

        // Without a callback nothing is activated
        let mut plain = self::controller();
        assert!(!plain.activate_row("1"));
    }

    #[test]
    fn test_draft_row_skips_read_only_and_empty_drafts() {
        let saved = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = saved.clone();
        let mut controller = TableViewController::new(
            vec![
                ColumnDescriptor::new("id", "Id").read_only(),
                ColumnDescriptor::new("name", "Name"),
                ColumnDescriptor::new("floor", "Floor"),
            ],
            Arc::new(MemoryStore::new()),
            "rooms",
            TableOptions::default(),
        )
        .on_add_row(move |draft: &RowDraft| sink.lock().unwrap().push(draft.clone()));
        controller.set_data(table());

        assert!(controller.can_add_row());
        assert!(!controller.set_draft_value("name", "Atrium"));
        assert!(controller.begin_add_row());
        let keys: Vec<&str> = controller
            .draft_columns()
            .into_iter()
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(keys, vec!["name", "floor"]);

        // Nothing entered: closes without calling back
        assert!(!controller.save_new_row());
        assert!(!controller.is_adding_row());

        controller.begin_add_row();
        assert!(!controller.set_draft_value("id", "7"));
        assert!(!controller.set_draft_value("unknown", "x"));
        assert!(controller.set_draft_value("name", "Atrium"));
        assert!(controller.set_draft_value("floor", "2"));
        assert!(controller.set_draft_value("floor", "  "));
        assert!(controller.save_new_row());
        assert!(controller.draft().is_none());

        controller.begin_add_row();
        controller.set_draft_value("name", "Cancelled");
        controller.cancel_add_row();
        assert!(!controller.save_new_row());

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].get("name").map(String::as_str), Some("Atrium"));
        assert!(!saved[0].contains_key("floor"));
        assert!(!saved[0].contains_key("id"));
    }

    #[test]
    fn test_add_row_disabled_without_callback() {
        let mut controller = controller();
        assert!(!controller.can_add_row());
        assert!(!controller.begin_add_row());
    }

    #[test]
    fn test_empty_message() {
        let mut controller = controller();
        assert_eq!(controller.empty_message(), None);
        controller.set_search_term("nothing matches this");
        assert_eq!(controller.empty_message(), Some("No data available"));
        assert!(controller.page_rows().is_empty());
    }
}

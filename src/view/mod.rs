//! Interactive table state: search, sort, pagination, column layout,
//! selection and export over a `DataTable`.

pub mod columns;
pub mod controller;
pub mod pagination;
pub mod search;
pub mod selection;

use crate::data::data_exporter::ExportError;
use thiserror::Error;

pub use columns::{ColumnDescriptor, ColumnLayout};
pub use controller::{
    BulkAction, ExportHandler, ExportOutcome, ExportRequest, HeaderCell, RenderedRow,
    RowDraft, SortDirection, SortSpec, TableOptions, TableViewController,
};
pub use pagination::{page_numbers, PageItem, Pagination};
pub use search::{RowMatcher, SearchMode};
pub use selection::{Selection, SelectionState};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("column order must be a permutation of the declared columns, got {0:?}")]
    InvalidColumnOrder(Vec<String>),

    #[error("no bulk action named '{0}'")]
    UnknownBulkAction(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

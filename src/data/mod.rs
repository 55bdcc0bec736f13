//! Data layer for DataTable/DataView architecture
//!
//! Rows are validated against a `RowSchema` into an immutable `DataTable`;
//! `DataView` projects, filters, sorts and pages it without copying rows.

pub mod data_exporter;
pub mod data_view;
pub mod datatable;
pub mod datavalue_compare;
pub mod schema;

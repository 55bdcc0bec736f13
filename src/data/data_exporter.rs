use crate::data::data_view::DataView;
use crate::data::datatable::DataValue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("expected {expected} headers for {expected} columns, got {actual}")]
    HeaderMismatch { expected: usize, actual: usize },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export buffer error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// A materialized export: bytes plus the name the caller should save them
/// under. Writing or downloading is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Handles exporting data from views to various formats
pub struct DataExporter;

impl DataExporter {
    /// `<base>-<YYYY-MM-DD>.<ext>`
    pub fn file_name(base: &str, date: NaiveDate, format: ExportFormat) -> String {
        format!("{}-{}.{}", base, date.format("%Y-%m-%d"), format.extension())
    }

    /// Export every row of the view (respecting its limit/offset) with one
    /// column per projected column, headed by `headers`
    pub fn export(
        view: &DataView,
        headers: &[String],
        format: ExportFormat,
        base_name: &str,
        date: NaiveDate,
    ) -> Result<ExportFile, ExportError> {
        let bytes = match format {
            ExportFormat::Csv => Self::to_csv(view, headers)?,
            ExportFormat::Json => Self::to_json(view, headers)?,
        };
        let file_name = Self::file_name(base_name, date, format);

        info!(
            target: "export",
            "Exported {} rows x {} columns to {} ({} bytes)",
            view.row_count(),
            view.column_count(),
            file_name,
            bytes.len()
        );

        Ok(ExportFile {
            file_name,
            content_type: format.content_type(),
            bytes,
        })
    }

    /// CSV with a header line. Fields containing a comma, quote or newline
    /// are quoted; null cells are empty.
    pub fn to_csv(view: &DataView, headers: &[String]) -> Result<Vec<u8>, ExportError> {
        Self::check_shape(view, headers)?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(headers)?;
        for row in view.get_rows() {
            writer.write_record(row.values.iter().map(DataValue::to_string))?;
        }

        writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }

    /// Pretty JSON array of objects keyed by header
    pub fn to_json(view: &DataView, headers: &[String]) -> Result<Vec<u8>, ExportError> {
        Self::check_shape(view, headers)?;

        let records: Vec<Value> = view
            .get_rows()
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = headers
                    .iter()
                    .cloned()
                    .zip(row.values.iter().map(DataValue::to_json))
                    .collect();
                Value::Object(obj)
            })
            .collect();

        Ok(serde_json::to_vec_pretty(&records)?)
    }

    fn check_shape(view: &DataView, headers: &[String]) -> Result<(), ExportError> {
        if view.row_count() == 0 {
            return Err(ExportError::NoData);
        }
        if headers.len() != view.column_count() {
            return Err(ExportError::HeaderMismatch {
                expected: view.column_count(),
                actual: headers.len(),
            });
        }
        Ok(())
    }
}

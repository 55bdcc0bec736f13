use crate::data::schema::SchemaError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Represents the data type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Null,
    Mixed, // For columns with mixed types
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return DataType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return DataType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if parse_finite(value).is_some() {
            return DataType::Float;
        }

        if looks_like_datetime(value) {
            return DataType::DateTime;
        }

        DataType::String
    }

    /// Merge two types (for columns with mixed types)
    pub fn merge(&self, other: &DataType) -> DataType {
        if self == other {
            return *self;
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => *t,
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                DataType::Float
            }
            _ => DataType::Mixed,
        }
    }
}

/// NaN and infinities are not numbers a table can order or export
fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Dates as the backend sends them: plain ISO dates, RFC 3339 timestamps,
/// or naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`.
fn looks_like_datetime(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
}

/// Column metadata and definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub null_count: usize,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            nullable: true,
            null_count: 0,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// A single cell value in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 text, compares lexically
    Null,
}

impl DataValue {
    pub fn from_string(s: &str, data_type: &DataType) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return DataValue::Null;
        }

        match data_type {
            DataType::String => DataValue::String(s.to_string()),
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Float => parse_finite(s)
                .map(DataValue::Float)
                .unwrap_or_else(|| DataValue::String(s.to_string())),
            DataType::Boolean => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => DataValue::Boolean(true),
                "false" | "0" | "no" => DataValue::Boolean(false),
                _ => DataValue::String(s.to_string()),
            },
            DataType::DateTime => DataValue::DateTime(s.to_string()),
            DataType::Null => DataValue::Null,
            DataType::Mixed => {
                let inferred = DataType::infer_from_string(s);
                Self::from_string(s, &inferred)
            }
        }
    }

    /// Convert a JSON value without a declared type
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => {
                if looks_like_datetime(s) {
                    DataValue::DateTime(s.clone())
                } else {
                    DataValue::String(s.clone())
                }
            }
            // Nested values are kept as their JSON text
            JsonValue::Array(_) | JsonValue::Object(_) => DataValue::String(json.to_string()),
        }
    }

    /// Convert a JSON value to the declared column type. Values that do not
    /// fit the declared type are kept as text rather than rejected.
    pub fn coerce_json(json: &JsonValue, data_type: &DataType) -> Self {
        match (json, data_type) {
            (JsonValue::Null, _) => DataValue::Null,
            (JsonValue::String(s), _) => Self::from_string(s, data_type),
            (JsonValue::Number(n), DataType::String) => DataValue::String(n.to_string()),
            (JsonValue::Number(n), DataType::Float) => n
                .as_f64()
                .map(DataValue::Float)
                .unwrap_or_else(|| DataValue::String(n.to_string())),
            (JsonValue::Number(n), DataType::Integer) => match n.as_i64() {
                Some(i) => DataValue::Integer(i),
                None => DataValue::from_json(json),
            },
            (JsonValue::Bool(b), DataType::String) => DataValue::String(b.to_string()),
            _ => DataValue::from_json(json),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::String(_) => DataType::String,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::DateTime(_) => DataType::DateTime,
            DataValue::Null => DataType::Null,
        }
    }

    /// JSON form used by the JSON exporter
    pub fn to_json(&self) -> JsonValue {
        match self {
            DataValue::String(s) | DataValue::DateTime(s) => JsonValue::String(s.clone()),
            DataValue::Integer(i) => JsonValue::from(*i),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DataValue::Boolean(b) => JsonValue::Bool(*b),
            DataValue::Null => JsonValue::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Null => write!(f, ""),
        }
    }
}

/// A row of data in the table, identified by a stable id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub id: String,
    pub values: Vec<DataValue>,
}

impl DataRow {
    pub fn new(id: impl Into<String>, values: Vec<DataValue>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The full, immutable row set a page hands to the controller
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    rows: Vec<DataRow>,
    id_index: HashMap<String, usize>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> Result<(), SchemaError> {
        let actual = row.len();
        if actual != self.columns.len() {
            return Err(SchemaError::RowWidth {
                id: row.id,
                expected: self.columns.len(),
                actual,
            });
        }
        if self.id_index.contains_key(&row.id) {
            return Err(SchemaError::DuplicateId(row.id));
        }
        self.id_index.insert(row.id.clone(), self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    pub fn get_column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn row_index_by_id(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Get column names as a vector
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Recount nulls per column without touching declared types
    pub fn refresh_null_counts(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            column.null_count = self
                .rows
                .iter()
                .filter(|row| row.get(col_idx).map_or(true, DataValue::is_null))
                .count();
        }
    }

    /// Get a value at specific row and column
    pub fn get_value(&self, row: usize, col: usize) -> Option<&DataValue> {
        self.rows.get(row)?.get(col)
    }

    /// Get a value by row index and column name
    pub fn get_value_by_name(&self, row: usize, col_name: &str) -> Option<&DataValue> {
        let col_idx = self.get_column_index(col_name)?;
        self.get_value(row, col_idx)
    }
}

//! Typed row schema, validated where JSON from the backend enters the crate.
//!
//! A page declares which fields it reads and their types. Rows that would
//! break table invariants (no id, duplicate id, not an object, a required
//! field absent) are rejected here; anything else is coerced and tolerated.

use crate::data::datatable::{DataColumn, DataRow, DataTable, DataType, DataValue};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("row {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("row {index} has no usable value for id field '{field}'")]
    MissingId { index: usize, field: String },

    #[error("duplicate row id '{0}'")]
    DuplicateId(String),

    #[error("row {index} is missing required field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("row '{id}' has {actual} values but the table has {expected} columns")]
    RowWidth {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("required fields missing: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("expected a JSON array of rows")]
    NotAnArray,
}

/// One declared field of a row
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub data_type: DataType,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSchema {
    pub name: String,
    /// Field holding the row id. `None` numbers rows by position.
    pub id_field: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl RowSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: Some("id".to_string()),
            fields: Vec::new(),
        }
    }

    pub fn with_id_field(mut self, id_field: Option<&str>) -> Self {
        self.id_field = id_field.map(str::to_string);
        self
    }

    pub fn field(mut self, key: impl Into<String>, data_type: DataType) -> Self {
        self.fields.push(FieldSpec {
            key: key.into(),
            data_type,
            required: false,
        });
        self
    }

    pub fn required_field(mut self, key: impl Into<String>, data_type: DataType) -> Self {
        self.fields.push(FieldSpec {
            key: key.into(),
            data_type,
            required: true,
        });
        self
    }

    pub fn field_keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }

    /// Derive a schema from the data itself: union of keys in first-seen
    /// order, types merged across rows. Uses `id` as the id field when every
    /// row carries one.
    pub fn infer(name: impl Into<String>, values: &[JsonValue]) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let mut types: Vec<DataType> = Vec::new();

        for obj in values.iter().filter_map(JsonValue::as_object) {
            for (key, value) in obj {
                let value_type = DataValue::from_json(value).data_type();
                if seen.insert(key.clone()) {
                    keys.push(key.clone());
                    types.push(value_type);
                } else if let Some(pos) = keys.iter().position(|k| k == key) {
                    types[pos] = types[pos].merge(&value_type);
                }
            }
        }

        let all_have_id = !values.is_empty()
            && values
                .iter()
                .all(|v| v.get("id").map_or(false, |id| id_text(id).is_some()));

        let mut schema = Self::new(name).with_id_field(if all_have_id { Some("id") } else { None });
        for (key, data_type) in keys.into_iter().zip(types) {
            let data_type = if data_type == DataType::Null {
                DataType::String
            } else {
                data_type
            };
            schema = schema.field(key, data_type);
        }
        schema
    }

    /// Validate a JSON array at the page boundary and build the table
    pub fn from_json(&self, value: &JsonValue) -> Result<DataTable, SchemaError> {
        let rows = value.as_array().ok_or(SchemaError::NotAnArray)?;
        self.from_json_rows(rows)
    }

    pub fn from_json_rows(&self, values: &[JsonValue]) -> Result<DataTable, SchemaError> {
        let mut table = DataTable::new(self.name.clone());
        for field in &self.fields {
            table.add_column(
                DataColumn::new(field.key.clone())
                    .with_type(field.data_type)
                    .with_nullable(!field.required),
            );
        }

        for (index, json_row) in values.iter().enumerate() {
            let obj = json_row
                .as_object()
                .ok_or(SchemaError::NotAnObject { index })?;

            let id = match &self.id_field {
                Some(field) => obj.get(field).and_then(id_text).ok_or_else(|| {
                    SchemaError::MissingId {
                        index,
                        field: field.clone(),
                    }
                })?,
                None => index.to_string(),
            };

            let mut row_values = Vec::with_capacity(self.fields.len());
            for field in &self.fields {
                match obj.get(&field.key) {
                    Some(value) => row_values.push(DataValue::coerce_json(value, &field.data_type)),
                    None if field.required => {
                        return Err(SchemaError::MissingField {
                            index,
                            field: field.key.clone(),
                        })
                    }
                    None => row_values.push(DataValue::Null),
                }
            }

            table.add_row(DataRow::new(id, row_values))?;
        }

        table.refresh_null_counts();

        debug!(
            target: "table_view",
            "Validated {} rows against schema '{}' ({} fields)",
            table.row_count(),
            self.name,
            self.fields.len()
        );
        Ok(table)
    }
}

/// Ids may arrive as strings or numbers; blank strings are not ids
fn id_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Client-side required-field check performed before a form is submitted.
/// Reports every field that is absent, null or blank.
pub fn validate_required(form: &Map<String, JsonValue>, fields: &[&str]) -> Result<(), SchemaError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| match form.get(**field) {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => s.trim().is_empty(),
            Some(JsonValue::Array(items)) => items.is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingRequired(missing))
    }
}

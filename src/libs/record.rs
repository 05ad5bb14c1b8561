//! Schema-validated record instances.
//!
//! A [`Record`] is the validated form of one entity: a typed value for
//! every schema field, in declaration order. Validation happens here, in
//! full, before anything touches storage; a record that fails validation
//! writes zero rows.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use crate::libs::error::ValidationError;
use crate::libs::schema::{FieldKind, RecordSchema, StorageType};

/// A typed value bound into one column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Decimal(Decimal),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Text form for the storage layer. Decimals keep their scale;
    /// timestamps are RFC 3339 with a `Z` suffix and subsecond digits
    /// only where needed, so the stored text round-trips the instant.
    pub fn storage_text(&self) -> Option<String> {
        match self {
            SqlValue::Decimal(d) => Some(d.to_string()),
            SqlValue::Timestamp(t) => {
                Some(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            _ => None,
        }
    }
}

/// A validated, immutable value set for one entity.
///
/// Values are held in schema declaration order, one per column. Built
/// from any `Serialize` type whose serialized form is an object with
/// exactly the schema's field names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<SqlValue>,
}

impl Record {
    /// Validate `item` against `schema`.
    ///
    /// Fails if `item` does not serialize to an object, if any schema
    /// field is missing, carries a value outside its declared type's
    /// domain, or exceeds the text bound, or if the object carries a
    /// field the schema does not declare.
    pub fn from_serialize<T: Serialize>(
        schema: &RecordSchema,
        item: &T,
    ) -> Result<Record, ValidationError> {
        let json = serde_json::to_value(item).map_err(|_| ValidationError::NotAnObject)?;
        let map = match json {
            Value::Object(map) => map,
            _ => return Err(ValidationError::NotAnObject),
        };

        for key in map.keys() {
            if !schema.fields().iter().any(|f| f.name == *key) {
                return Err(ValidationError::Unexpected { field: key.clone() });
            }
        }

        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = map.get(&field.name).ok_or_else(|| ValidationError::Missing {
                field: field.name.clone(),
            })?;
            values.push(coerce(&field.name, field.kind, value)?);
        }
        Ok(Record { values })
    }

    /// Values in schema declaration order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

fn coerce(field: &str, kind: FieldKind, value: &Value) -> Result<SqlValue, ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: kind.type_name(),
        got: type_of(value),
    };
    match kind {
        FieldKind::Integer => value.as_i64().map(SqlValue::Int).ok_or_else(mismatch),
        FieldKind::Text => {
            let s = value.as_str().ok_or_else(mismatch)?;
            let max = match kind.storage() {
                StorageType::Text { max_len } => max_len,
                _ => unreachable!(),
            };
            let len = s.chars().count();
            if len > max {
                return Err(ValidationError::Oversize {
                    field: field.to_string(),
                    max,
                    len,
                });
            }
            Ok(SqlValue::Text(s.to_string()))
        }
        FieldKind::Number => match value {
            // Decimal serializes as a string, which keeps its scale.
            Value::String(s) => Decimal::from_str(s.trim())
                .map(SqlValue::Decimal)
                .map_err(|_| mismatch()),
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .map(SqlValue::Decimal)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        FieldKind::Boolean => value.as_bool().map(SqlValue::Bool).ok_or_else(mismatch),
        FieldKind::Timestamp => {
            let s = value.as_str().ok_or_else(mismatch)?;
            DateTime::parse_from_rfc3339(s)
                .map(|t| SqlValue::Timestamp(t.with_timezone(&Utc)))
                .map_err(|_| mismatch())
        }
    }
}

fn type_of(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

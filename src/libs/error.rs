//! Error types for structable operations.
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`SchemaError`] - Malformed schema definitions
//! - [`ValidationError`] - Record instances that fail their schema

use thiserror::Error;

/// Main error type for structable operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or empty schema definition. Fatal; fix the schema.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// An existing table's shape disagrees with the requested schema.
    /// Fatal for that table name until resolved.
    #[error("table {table} exists with a different shape: expected {expected:?}, found {found:?}")]
    SchemaConflict {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A record instance does not satisfy its schema. Recoverable per
    /// record; sibling records in a batch are unaffected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage-engine failure. The enclosing transaction, if any, is
    /// rolled back in full; the caller may retry the single record.
    #[error("storage error: {0}")]
    Write(#[from] sqlx::Error),
}

/// Errors detected while building a record schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema has no fields")]
    Empty,

    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    #[error("duplicate field {0:?}")]
    DuplicateField(String),
}

/// Errors detected while validating a record against its schema.
///
/// Validation runs in full before any storage mutation, so a failed
/// record writes zero rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record did not serialize to an object")]
    NotAnObject,

    #[error("missing field {field:?}")]
    Missing { field: String },

    #[error("unexpected field {field:?} not present in schema")]
    Unexpected { field: String },

    #[error("field {field:?}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: String,
    },

    #[error("field {field:?}: text of {len} chars exceeds bound of {max}")]
    Oversize {
        field: String,
        max: usize,
        len: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! Record schemas and their storage-side projection.
//!
//! A [`RecordSchema`] is an ordered, named set of typed field declarations.
//! It is the single source of truth for both the table layout and record
//! validation: every field yields exactly one column, in declaration order,
//! through the static [`FieldKind`] -> [`StorageType`] mapping. The mapping
//! is closed-world; the column layout is fully determined before any row is
//! written.

use crate::libs::error::SchemaError;

/// Upper bound, in characters, for [`FieldKind::Text`] values.
///
/// The bound is enforced during record validation; oversized text is
/// rejected, never truncated.
pub const TEXT_MAX_LEN: usize = 16;

/// Semantic field types a record schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 64-bit signed integer.
    Integer,
    /// UTF-8 text, at most [`TEXT_MAX_LEN`] characters.
    Text,
    /// Exact decimal numeric (money-safe, no binary float drift).
    Number,
    /// Boolean.
    Boolean,
    /// Date-time with timezone, carried as a UTC instant.
    Timestamp,
}

impl FieldKind {
    /// Storage type this kind maps to.
    pub fn storage(self) -> StorageType {
        match self {
            FieldKind::Integer => StorageType::Integer,
            FieldKind::Text => StorageType::Text { max_len: TEXT_MAX_LEN },
            FieldKind::Number => StorageType::Decimal,
            FieldKind::Boolean => StorageType::Boolean,
            FieldKind::Timestamp => StorageType::TimestampTz,
        }
    }

    /// Human-readable type name for error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Storage-engine types columns are declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// Signed 64-bit integer column.
    Integer,
    /// Bounded text column; the bound is validated at write time.
    Text { max_len: usize },
    /// Exact decimal, stored as a canonical decimal string. SQLite has no
    /// decimal type, and a NUMERIC-affinity column would coerce the text
    /// to REAL and lose precision, so the column is declared TEXT.
    Decimal,
    /// Boolean column, stored as 0/1.
    Boolean,
    /// RFC 3339 UTC text. Non-numeric text is unaffected by the declared
    /// type's affinity, so the instant round-trips verbatim.
    TimestampTz,
}

impl StorageType {
    /// SQL type as it appears in DDL (and in `PRAGMA table_info`).
    pub fn sql_type(self) -> String {
        match self {
            StorageType::Integer => "INTEGER".to_string(),
            StorageType::Text { max_len } => format!("VARCHAR({})", max_len),
            StorageType::Decimal => "TEXT".to_string(),
            StorageType::Boolean => "BOOLEAN".to_string(),
            StorageType::TimestampTz => "TIMESTAMP".to_string(),
        }
    }
}

/// One declared field of a record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// Storage-side projection of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub storage: StorageType,
}

/// Derive column descriptors from an ordered field list.
///
/// Pure function: one column per field, declaration order preserved,
/// storage types resolved through [`FieldKind::storage`]. Fails on an
/// empty field list.
pub fn derive_columns(fields: &[FieldDef]) -> Result<Vec<ColumnDescriptor>, SchemaError> {
    if fields.is_empty() {
        return Err(SchemaError::Empty);
    }
    Ok(fields
        .iter()
        .map(|f| ColumnDescriptor {
            name: f.name.clone(),
            storage: f.kind.storage(),
        })
        .collect())
}

/// An ordered, named set of typed field declarations.
///
/// Immutable once built. Column descriptors are derived once at
/// construction and cached.
///
/// # Example
/// ```
/// use structable::{FieldKind, RecordSchema};
///
/// let schema = RecordSchema::builder("invoices")
///     .field("invoice_id", FieldKind::Integer)
///     .field("amount", FieldKind::Number)
///     .build()?;
/// assert_eq!(schema.columns().len(), 2);
/// # Ok::<(), structable::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    table_name: String,
    fields: Vec<FieldDef>,
    columns: Vec<ColumnDescriptor>,
}

impl RecordSchema {
    /// Start building a schema for the given table name.
    pub fn builder(table_name: &str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            table_name: table_name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Cached column descriptors, one per field, in declaration order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
}

/// Builder for [`RecordSchema`]; validates on [`build`](Self::build).
pub struct RecordSchemaBuilder {
    table_name: String,
    fields: Vec<FieldDef>,
}

impl RecordSchemaBuilder {
    /// Append a field. Declaration order is significant and preserved.
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Requires at least one field, a well-formed table name, and unique
    /// well-formed field names. Names double as SQL identifiers, so they
    /// are restricted to `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        if !is_identifier(&self.table_name) {
            return Err(SchemaError::InvalidTableName(self.table_name));
        }
        let mut seen = std::collections::HashSet::new();
        for f in &self.fields {
            if !is_identifier(&f.name) {
                return Err(SchemaError::InvalidFieldName(f.name.clone()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(SchemaError::DuplicateField(f.name.clone()));
            }
        }
        let columns = derive_columns(&self.fields)?;
        Ok(RecordSchema {
            table_name: self.table_name,
            fields: self.fields,
            columns,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

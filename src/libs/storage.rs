//! Storage engine handle, table materialization, and row-level I/O.
//!
//! [`Storage`] wraps a SQLite pool and is passed explicitly into every
//! call; there is no process-wide handle. Tables are materialized from a
//! [`RecordSchema`] exactly once per name: a second materialization with
//! an identical shape reuses the relation, a mismatched shape is refused.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::libs::error::{Error, Result};
use crate::libs::record::{Record, SqlValue};
use crate::libs::schema::{FieldKind, RecordSchema};
use crate::libs::table::Table;

/// Identifier of one committed row (the storage rowid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to the underlying storage engine.
///
/// Cheap to clone; clones share the same pool. The pool is capped at a
/// single connection: `sqlite::memory:` would otherwise open one private
/// database per connection, and single-writer-at-a-time is a hard
/// constraint of this crate.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Connect to a SQLite database.
    ///
    /// # Example
    /// ```no_run
    /// # use structable::Storage;
    /// # async fn run() -> structable::Result<()> {
    /// let storage = Storage::connect("sqlite://invoices.db?mode=rwc").await?;
    /// # Ok(()) }
    /// ```
    pub async fn connect(database_url: &str) -> Result<Self> {
        log::info!("connecting to {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect to a fresh in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn placeholders(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("${}", i)).collect()
    }

    // -------- Materialize a table --------

    /// Create the table for `schema`, or reuse it if it already exists
    /// with an identical shape.
    ///
    /// Shape means column names, order, and declared SQL types, compared
    /// against `PRAGMA table_info`. A table with the same name but a
    /// different shape fails with [`Error::SchemaConflict`]; it is never
    /// silently written through.
    ///
    /// # Example
    /// ```no_run
    /// # async fn run(storage: structable::Storage, schema: structable::RecordSchema) -> structable::Result<()> {
    /// # #[derive(serde::Serialize, serde::Deserialize)] struct Invoice { invoice_id: i64 }
    /// let invoices = storage.ensure_table::<Invoice>(&schema).await?;
    /// # Ok(()) }
    /// ```
    pub async fn ensure_table<T>(&self, schema: &RecordSchema) -> Result<Table<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let expected: Vec<(String, String)> = schema
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.storage.sql_type()))
            .collect();

        let found = self.table_shape(schema.table_name()).await?;
        if !found.is_empty() {
            if found != expected {
                return Err(Error::SchemaConflict {
                    table: schema.table_name().to_string(),
                    expected: expected.into_iter().map(|(n, t)| format!("{} {}", n, t)).collect(),
                    found: found.into_iter().map(|(n, t)| format!("{} {}", n, t)).collect(),
                });
            }
            log::debug!("reusing table {}", schema.table_name());
            return Ok(Table::new(self.clone(), schema.clone()));
        }

        let cols: Vec<String> = expected
            .iter()
            .map(|(name, sql_type)| format!("{} {} NOT NULL", name, sql_type))
            .collect();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            schema.table_name(),
            cols.join(", ")
        );
        sqlx::query(&sql).execute(self.pool()).await?;
        log::info!("created table {}", schema.table_name());
        Ok(Table::new(self.clone(), schema.clone()))
    }

    /// Column (name, declared type) pairs in order; empty if the table
    /// does not exist.
    async fn table_shape(&self, table_name: &str) -> Result<Vec<(String, String)>> {
        let sql = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        let mut shape = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let sql_type: String = row.try_get("type")?;
            shape.push((name, sql_type));
        }
        Ok(shape)
    }

    // -------- Insert a record --------

    /// Write one validated record in its own transaction.
    ///
    /// Begin, insert, commit; a storage failure at any point rolls the
    /// transaction back in full, so no partial row ever lands.
    pub(crate) async fn insert_row(
        &self,
        schema: &RecordSchema,
        record: &Record,
    ) -> Result<RecordId> {
        let cols: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        let placeholders = Self::placeholders(cols.len());
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table_name(),
            cols.join(","),
            placeholders.join(",")
        );

        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = match value {
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Bool(b) => query.bind(*b),
                // Decimals and timestamps travel as their canonical text.
                other => query.bind(other.storage_text()),
            };
        }

        let mut tx = self.pool().begin().await?;
        let result = query.execute(&mut *tx).await?;
        tx.commit().await?;
        log::debug!(
            "inserted row {} into {}",
            result.last_insert_rowid(),
            schema.table_name()
        );
        Ok(RecordId(result.last_insert_rowid()))
    }

    // -------- Read rows back --------

    /// All rows in insertion (rowid) order, decoded by schema kind into
    /// JSON objects ready for `serde_json::from_value`.
    pub(crate) async fn fetch_values(&self, schema: &RecordSchema) -> Result<Vec<Value>> {
        let sql = format!("SELECT * FROM {} ORDER BY rowid", schema.table_name());
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let mut map = serde_json::Map::new();
            for field in schema.fields() {
                let name = field.name.as_str();
                let value = match field.kind {
                    FieldKind::Integer => row
                        .try_get::<Option<i64>, _>(name)?
                        .map(Value::from)
                        .unwrap_or(Value::Null),
                    FieldKind::Boolean => row
                        .try_get::<Option<bool>, _>(name)?
                        .map(Value::from)
                        .unwrap_or(Value::Null),
                    // Text, decimals and timestamps come back as the
                    // stored text and deserialize from there.
                    FieldKind::Text | FieldKind::Number | FieldKind::Timestamp => row
                        .try_get::<Option<String>, _>(name)?
                        .map(Value::from)
                        .unwrap_or(Value::Null),
                };
                map.insert(field.name.clone(), value);
            }
            results.push(Value::Object(map));
        }
        Ok(results)
    }

    pub(crate) async fn count_rows(&self, table_name: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table_name);
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(self.pool()).await?;
        Ok(row.0 as u64)
    }
}

//! Typed table handles: the write (and read-back) surface.

use serde::{Serialize, de::DeserializeOwned};

use crate::libs::error::Result;
use crate::libs::record::Record;
use crate::libs::schema::RecordSchema;
use crate::libs::storage::{RecordId, Storage};

/// A typed handle to a materialized table.
///
/// Handles are only produced by [`Storage::ensure_table`], so holding one
/// means the relation exists with exactly this schema's shape. Two handles
/// with the same [`name`](Self::name) against the same storage refer to
/// the same relation.
#[derive(Debug)]
pub struct Table<T> {
    storage: Storage,
    schema: RecordSchema,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub(crate) fn new(storage: Storage, schema: RecordSchema) -> Self {
        Self {
            storage,
            schema,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.table_name()
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Validate and insert a single record, one transaction per record.
    ///
    /// Validation runs in full before the transaction begins; an invalid
    /// record leaves the table untouched. A committed insert returns the
    /// new row's [`RecordId`].
    ///
    /// # Example
    /// ```no_run
    /// # #[derive(serde::Serialize, serde::Deserialize)] pub struct Invoice { invoice_id: i64 }
    /// # async fn run(invoices: structable::Table<Invoice>, invoice: Invoice) -> structable::Result<()> {
    /// let id = invoices.insert(&invoice).await?;
    /// # Ok(()) }
    /// ```
    pub async fn insert(&self, item: &T) -> Result<RecordId> {
        let record = Record::from_serialize(&self.schema, item)?;
        self.storage.insert_row(&self.schema, &record).await
    }

    /// Insert each record independently, in input order.
    ///
    /// Does not short-circuit: a failed record is reported in its slot
    /// and its siblings are still attempted, so batch ingestion surfaces
    /// every failure rather than only the first.
    pub async fn insert_many(&self, items: &[T]) -> Vec<Result<RecordId>> {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            outcomes.push(self.insert(item).await);
        }
        outcomes
    }

    /// All rows in insertion order, decoded back into `T`.
    pub async fn fetch_all(&self) -> Result<Vec<T>> {
        let values = self.storage.fetch_values(&self.schema).await?;
        let mut results = Vec::with_capacity(values.len());
        for value in values {
            let item = serde_json::from_value::<T>(value).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "serde_json".into(),
                    source: Box::new(e),
                }
            })?;
            results.push(item);
        }
        Ok(results)
    }

    /// Number of rows currently in the table.
    pub async fn count(&self) -> Result<u64> {
        self.storage.count_rows(self.schema.table_name()).await
    }
}

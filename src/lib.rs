//! Schema-driven table materialization and validated row inserts.
//!
//! Define a record schema once (with [`record`] on a struct, or the
//! [`RecordSchema`] builder), materialize it as a SQLite table, and write
//! schema-validated records into it, one transaction per record.
//!
//! ```no_run
//! use structable::{Storage, record};
//! use serde::{Deserialize, Serialize};
//!
//! #[record(table_name = "invoices")]
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Invoice {
//!     pub invoice_id: i64,
//!     pub account_id: String,
//!     pub amount: rust_decimal::Decimal,
//!     pub direct_success: bool,
//! }
//!
//! # async fn run() -> structable::Result<()> {
//! let storage = Storage::in_memory().await?;
//! let invoices = storage.ensure_table::<Invoice>(&Invoice::record_schema()).await?;
//! # let invoice: Invoice = todo!();
//! invoices.insert(&invoice).await?;
//! # Ok(()) }
//! ```

pub mod libs;

pub use libs::*;
pub use structable_derive::record;

//! Boundary for an external natural-language query collaborator.
//!
//! The core never calls this; it only fixes the interface a collaborator
//! must offer against materialized tables. Implementations live outside
//! this crate.

use async_trait::async_trait;

use crate::libs::error::Result;

/// Outcome of translating one natural-language question.
#[derive(Debug, Clone)]
pub struct NlAnswer {
    /// SQL the collaborator generated for the question.
    pub sql: String,
    /// Result rows, one JSON object per row.
    pub rows: Vec<serde_json::Value>,
}

/// Translates natural-language questions into SQL over one table.
#[async_trait]
pub trait QueryEngine {
    async fn query(&self, question: &str, table_name: &str) -> Result<NlAnswer>;
}

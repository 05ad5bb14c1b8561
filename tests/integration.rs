//! End-to-end tests over an in-memory database: materialization,
//! validated inserts, and read-back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use structable::{
    Error, FieldKind, RecordSchema, Storage, ValidationError, record,
};

#[record(table_name = "invoices")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: i64,
    pub account_id: String,
    pub first_transaction_at: DateTime<Utc>,
    pub last_transaction_at: DateTime<Utc>,
    pub amount: Decimal,
    pub direct_success: bool,
    pub has_failure: bool,
    pub recovered: bool,
    pub failed: bool,
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn invoice(id: i64, amount: &str, direct_success: bool) -> Invoice {
    Invoice {
        invoice_id: id,
        account_id: "abc".into(),
        first_transaction_at: ts("2023-01-01T00:00:00Z"),
        last_transaction_at: ts("2023-01-08T00:00:00Z"),
        amount: Decimal::from_str(amount).unwrap(),
        direct_success,
        has_failure: false,
        recovered: false,
        failed: false,
    }
}

#[tokio::test]
async fn derived_schema_matches_struct() {
    let schema = Invoice::record_schema();
    assert_eq!(schema.table_name(), "invoices");
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "invoice_id",
            "account_id",
            "first_transaction_at",
            "last_transaction_at",
            "amount",
            "direct_success",
            "has_failure",
            "recovered",
            "failed",
        ]
    );
    assert_eq!(schema.fields()[0].kind, FieldKind::Integer);
    assert_eq!(schema.fields()[2].kind, FieldKind::Timestamp);
    assert_eq!(schema.fields()[4].kind, FieldKind::Number);
    assert_eq!(schema.fields()[5].kind, FieldKind::Boolean);
}

#[tokio::test]
async fn ensure_table_is_idempotent_for_identical_schema() {
    let storage = Storage::in_memory().await.unwrap();
    let schema = Invoice::record_schema();

    let first = storage.ensure_table::<Invoice>(&schema).await.unwrap();
    let second = storage.ensure_table::<Invoice>(&schema).await.unwrap();
    assert_eq!(first.name(), second.name());

    // Both handles refer to the same relation.
    first.insert(&invoice(1, "10.00", true)).await.unwrap();
    assert_eq!(second.count().await.unwrap(), 1);
}

#[tokio::test]
async fn ensure_table_rejects_conflicting_shape() {
    let storage = Storage::in_memory().await.unwrap();
    storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let conflicting = RecordSchema::builder("invoices")
        .field("invoice_id", FieldKind::Integer)
        .field("amount", FieldKind::Text)
        .build()
        .unwrap();
    let err = storage
        .ensure_table::<serde_json::Value>(&conflicting)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaConflict { .. }));
}

#[tokio::test]
async fn insert_round_trips_exactly() {
    let storage = Storage::in_memory().await.unwrap();
    let table = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let mut original = invoice(1, "10.00", true);
    original.first_transaction_at = ts("2023-01-01T12:34:56.123456Z");

    table.insert(&original).await.unwrap();
    let rows = table.fetch_all().await.unwrap();
    assert_eq!(rows, vec![original.clone()]);

    // The UTC instant survives the text round trip exactly.
    assert_eq!(rows[0].first_transaction_at, original.first_transaction_at);
    // The decimal keeps its scale; no binary rounding.
    assert_eq!(rows[0].amount, Decimal::from_str("10.00").unwrap());
    assert_eq!(rows[0].amount.to_string(), "10.00");
}

#[tokio::test]
async fn invoice_scenario_preserves_order_and_amounts() {
    let storage = Storage::in_memory().await.unwrap();
    let table = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let batch = vec![invoice(1, "10.00", true), invoice(2, "15.00", false)];
    let outcomes = table.insert_many(&batch).await;
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let rows = table.fetch_all().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].invoice_id, 1);
    assert_eq!(rows[1].invoice_id, 2);
    assert_eq!(rows[0].amount.to_string(), "10.00");
    assert_eq!(rows[1].amount.to_string(), "15.00");
    assert!(rows[0].direct_success);
    assert!(!rows[1].direct_success);
}

#[tokio::test]
async fn oversized_text_writes_nothing() {
    let storage = Storage::in_memory().await.unwrap();
    let table = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let mut bad = invoice(1, "10.00", true);
    bad.account_id = "seventeen chars!!".into();
    assert_eq!(bad.account_id.chars().count(), 17);

    assert_eq!(table.count().await.unwrap(), 0);
    let err = table.insert(&bad).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Oversize { .. })
    ));
    assert_eq!(table.count().await.unwrap(), 0);
}

#[tokio::test]
async fn missing_field_writes_nothing() {
    let storage = Storage::in_memory().await.unwrap();
    let schema = RecordSchema::builder("payments")
        .field("payment_id", FieldKind::Integer)
        .field("amount", FieldKind::Number)
        .build()
        .unwrap();
    let table = storage
        .ensure_table::<serde_json::Value>(&schema)
        .await
        .unwrap();

    let err = table.insert(&json!({"payment_id": 1})).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Missing { .. })
    ));
    assert_eq!(table.count().await.unwrap(), 0);
}

#[tokio::test]
async fn extra_field_writes_nothing() {
    let storage = Storage::in_memory().await.unwrap();
    let schema = RecordSchema::builder("payments")
        .field("payment_id", FieldKind::Integer)
        .build()
        .unwrap();
    let table = storage
        .ensure_table::<serde_json::Value>(&schema)
        .await
        .unwrap();

    let err = table
        .insert(&json!({"payment_id": 1, "note": "extra"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Unexpected { .. })
    ));
    assert_eq!(table.count().await.unwrap(), 0);
}

#[tokio::test]
async fn batch_continues_past_invalid_record() {
    let storage = Storage::in_memory().await.unwrap();
    let table = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let mut bad = invoice(2, "20.00", false);
    bad.account_id = "way too long for the bound".into();
    let batch = vec![
        invoice(1, "10.00", true),
        bad,
        invoice(3, "30.00", true),
    ];

    let outcomes = table.insert_many(&batch).await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1],
        Err(Error::Validation(ValidationError::Oversize { .. }))
    ));
    assert!(outcomes[2].is_ok());

    let rows = table.fetch_all().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].invoice_id, 1);
    assert_eq!(rows[1].invoice_id, 3);
}

#[tokio::test]
async fn record_ids_follow_insertion_order() {
    let storage = Storage::in_memory().await.unwrap();
    let table = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await
        .unwrap();

    let first = table.insert(&invoice(1, "10.00", true)).await.unwrap();
    let second = table.insert(&invoice(2, "15.00", false)).await.unwrap();
    assert!(second.0 > first.0);
}

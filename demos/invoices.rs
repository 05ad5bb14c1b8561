use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use structable::{Storage, record};

#[record(table_name = "invoices")]
#[derive(Debug, Serialize, Deserialize)]
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

#[tokio::main]
async fn main() -> structable::Result<()> {
    env_logger::init();

    // Create some test data
    let test_invoices = vec![
        Invoice {
            invoice_id: 1,
            account_id: "abc".into(),
            first_transaction_at: ts("2023-01-01T00:00:00Z"),
            last_transaction_at: ts("2023-01-08T00:00:00Z"),
            amount: Decimal::from_str("10.00").unwrap(),
            direct_success: true,
            has_failure: false,
            recovered: false,
            failed: false,
        },
        Invoice {
            invoice_id: 2,
            account_id: "abc".into(),
            first_transaction_at: ts("2023-01-02T00:00:00Z"),
            last_transaction_at: ts("2023-01-09T00:00:00Z"),
            amount: Decimal::from_str("15.00").unwrap(),
            direct_success: false,
            has_failure: true,
            recovered: true,
            failed: false,
        },
    ];

    // Set up the database
    let storage = Storage::in_memory().await?;
    let invoices = storage
        .ensure_table::<Invoice>(&Invoice::record_schema())
        .await?;
    for outcome in invoices.insert_many(&test_invoices).await {
        match outcome {
            Ok(id) => println!("inserted row {}", id),
            Err(e) => println!("insert failed: {}", e),
        }
    }

    // Check that the database has been populated with data
    for row in invoices.fetch_all().await? {
        println!("{:?}", row);
    }

    Ok(())
}

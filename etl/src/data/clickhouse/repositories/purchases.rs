//! ClickHouse purchases repository
//!
//! Writes validated purchases into the append-only fact table. The `id`
//! column is left out of the row so ClickHouse fills it from its default.

use clickhouse::Client;
use clickhouse::Row;
use serde::Serialize;

use crate::data::clickhouse::ClickhouseError;
use crate::data::clickhouse::schema::PURCHASES_TABLE;
use crate::data::types::PurchaseRecord;
use crate::utils::time::naive_to_offset;

/// Row structure for inserting purchases into ClickHouse
#[derive(Debug, Row, Serialize)]
struct PurchaseRow {
    clientcode: i64,
    gender: String,
    price: f64,
    amount: f64,
    #[serde(with = "clickhouse::serde::time::datetime")]
    timestamp: time::OffsetDateTime,
}

impl From<&PurchaseRecord> for PurchaseRow {
    fn from(record: &PurchaseRecord) -> Self {
        Self {
            clientcode: record.client_code,
            gender: record.gender.clone(),
            price: record.price,
            amount: record.amount,
            timestamp: naive_to_offset(record.timestamp),
        }
    }
}

/// Insert one batch of purchases as a single INSERT
pub async fn insert_batch(client: &Client, batch: &[PurchaseRecord]) -> Result<(), ClickhouseError> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut insert: clickhouse::insert::Insert<PurchaseRow> =
        client.insert(PURCHASES_TABLE).await?;

    for record in batch {
        let row = PurchaseRow::from(record);
        insert.write(&row).await?;
    }

    insert.end().await?;
    Ok(())
}

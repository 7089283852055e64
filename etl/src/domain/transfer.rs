//! Cross-store transfer: staging projection to the analytical purchases table

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDateTime;

use crate::data::error::DataError;
use crate::data::traits::{AnalyticalStore, RelationalStore};
use crate::data::types::{PurchaseProjection, PurchaseRecord};

/// Counts of one transfer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Rows read from the staging projection
    pub fetched: usize,
    /// Rows written to `purchases`
    pub loaded: usize,
    /// Rows rejected by re-validation
    pub skipped: usize,
    /// Insert calls issued
    pub batches: usize,
}

/// Batches of a transfer already written by earlier attempts
///
/// A retried transfer resumes after the last written batch instead of
/// inserting those rows a second time.
#[derive(Debug, Default)]
pub struct TransferProgress {
    batches_written: AtomicUsize,
}

impl TransferProgress {
    pub fn batches_written(&self) -> usize {
        self.batches_written.load(Ordering::Acquire)
    }
}

/// Unix seconds a ClickHouse `DateTime` can hold
const DATETIME_RANGE: std::ops::RangeInclusive<i64> = 0..=u32::MAX as i64;

/// Re-validate one projected row
///
/// An absent gender becomes the empty string and an absent timestamp falls
/// back to `now`; client code, price and amount are mandatory. Timestamps
/// outside 1970-01-01 ..= 2106-02-07 are rejected.
pub fn revalidate(
    row: &PurchaseProjection,
    now: NaiveDateTime,
) -> Result<PurchaseRecord, String> {
    let code = row
        .client_code
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| "client code is missing".to_string())?;
    let client_code = code
        .parse::<i64>()
        .map_err(|_| format!("client code '{}' is not an integer", code))?;
    let price = row
        .price
        .filter(|p| p.is_finite())
        .ok_or_else(|| "price is missing".to_string())?;
    let amount = row
        .amount
        .filter(|a| a.is_finite())
        .ok_or_else(|| "amount is missing".to_string())?;

    let timestamp = row.timestamp.unwrap_or(now);
    if !DATETIME_RANGE.contains(&timestamp.and_utc().timestamp()) {
        return Err(format!("timestamp {} is out of range", timestamp));
    }

    Ok(PurchaseRecord {
        client_code,
        gender: row.gender.clone().unwrap_or_default(),
        price,
        amount,
        timestamp,
    })
}

/// Re-validate projected rows, keeping order and dropping invalid ones
pub fn prepare_purchases(
    rows: &[PurchaseProjection],
    now: NaiveDateTime,
) -> (Vec<PurchaseRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for (i, row) in rows.iter().enumerate() {
        match revalidate(row, now) {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped += 1;
                tracing::warn!(row = i, reason = %reason, "Skipping staged purchase");
            }
        }
    }
    (records, skipped)
}

/// Insert records in order, `batch_size` rows per insert call
///
/// Each batch is its own unit: a failure leaves earlier batches in place.
/// Batches already recorded in `progress` are not inserted again. Returns the
/// total batch count.
pub async fn load_batches(
    store: &dyn AnalyticalStore,
    records: &[PurchaseRecord],
    batch_size: usize,
    progress: &TransferProgress,
) -> Result<usize, DataError> {
    if batch_size == 0 {
        return Err(DataError::Config(
            "pipeline.batch_size must be greater than 0".to_string(),
        ));
    }

    let written = progress.batches_written();
    if written > 0 {
        tracing::info!(batches = written, "Resuming transfer after written batches");
    }

    let total = records.len().div_ceil(batch_size);
    for (i, batch) in records.chunks(batch_size).enumerate().skip(written) {
        store.insert_purchases(batch).await?;
        progress.batches_written.store(i + 1, Ordering::Release);
        tracing::debug!(batch = i + 1, rows = batch.len(), "Purchase batch inserted");
    }
    Ok(total)
}

/// Move the staging projection into the analytical store
pub async fn transfer_purchases(
    relational: &dyn RelationalStore,
    analytical: &dyn AnalyticalStore,
    batch_size: usize,
    now: NaiveDateTime,
    progress: &TransferProgress,
) -> Result<TransferSummary, DataError> {
    let projection = relational.fetch_purchase_projection().await?;
    let (records, skipped) = prepare_purchases(&projection, now);
    let batches = load_batches(analytical, &records, batch_size, progress).await?;

    Ok(TransferSummary {
        fetched: projection.len(),
        loaded: records.len(),
        skipped,
        batches,
    })
}

//! Daily rollups built inside the analytical store

use std::sync::OnceLock;

use crate::data::error::DataError;
use crate::data::traits::AnalyticalStore;

/// Row counts of the two rollup tables after a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub daily_rows: u64,
    pub gender_rows: u64,
}

/// Rollups of an aggregation already built by earlier attempts
///
/// Both rollups append, so a retried aggregation must not run a finished
/// step again.
#[derive(Debug, Default)]
pub struct AggregateProgress {
    daily_rows: OnceLock<u64>,
}

/// Fill `date_purchases` then `date_purchases_by_gender` from `purchases`
pub async fn build_aggregates(
    store: &dyn AnalyticalStore,
    progress: &AggregateProgress,
) -> Result<AggregateSummary, DataError> {
    let daily_rows = match progress.daily_rows.get() {
        Some(&rows) => {
            tracing::info!(rows, "Daily totals already built, skipping");
            rows
        }
        None => {
            let rows = store.build_daily_totals().await?;
            let _ = progress.daily_rows.set(rows);
            tracing::debug!(rows, "Daily totals built");
            rows
        }
    };

    let gender_rows = store.build_gender_totals().await?;
    tracing::debug!(rows = gender_rows, "Daily totals by gender built");

    Ok(AggregateSummary {
        daily_rows,
        gender_rows,
    })
}

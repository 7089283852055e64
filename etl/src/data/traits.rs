//! Store traits for the two database backends
//!
//! The pipeline only talks to these traits. PostgreSQL implements
//! `RelationalStore` and ClickHouse implements `AnalyticalStore`; tests swap
//! in in-memory fakes.

use async_trait::async_trait;

use crate::core::config::StagingMode;
use crate::data::error::DataError;
use crate::data::types::{
    DailyRollup, GenderRevenue, NormalizeSummary, PurchaseProjection, PurchaseRecord, StagingRow,
};

// ============================================================================
// Relational Store Trait
// ============================================================================

/// Staging table plus normalized star schema
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Create `temp_data` if it does not exist
    async fn create_staging_table(&self) -> Result<(), DataError>;

    /// Insert validated rows into `temp_data` in one transaction
    ///
    /// Returns the number of rows inserted.
    async fn load_staging(&self, rows: &[StagingRow], mode: StagingMode)
    -> Result<u64, DataError>;

    /// Create the dimension and fact tables if they do not exist
    async fn create_star_schema(&self) -> Result<(), DataError>;

    /// Populate the star schema from `temp_data` in dependency order
    async fn populate_star_schema(&self) -> Result<NormalizeSummary, DataError>;

    /// Read the flattened purchase columns back out of `temp_data`
    async fn fetch_purchase_projection(&self) -> Result<Vec<PurchaseProjection>, DataError>;

    /// Release pooled connections
    async fn close(&self);
}

// ============================================================================
// Analytical Store Trait
// ============================================================================

/// Purchases fact table plus daily aggregate tables
#[async_trait]
pub trait AnalyticalStore: Send + Sync {
    /// Drop and recreate `purchases`, `date_purchases` and `date_purchases_by_gender`
    async fn rebuild_tables(&self) -> Result<(), DataError>;

    /// Insert one batch of purchases as a single independent insert
    async fn insert_purchases(&self, batch: &[PurchaseRecord]) -> Result<(), DataError>;

    /// Fill `date_purchases` from `purchases`, returning its row count
    async fn build_daily_totals(&self) -> Result<u64, DataError>;

    /// Fill `date_purchases_by_gender` from `purchases`, returning its row count
    async fn build_gender_totals(&self) -> Result<u64, DataError>;

    /// All-time revenue, `SUM(amount * price)`
    async fn revenue_total(&self) -> Result<f64, DataError>;

    /// All-time revenue grouped by gender
    async fn revenue_by_gender(&self) -> Result<Vec<GenderRevenue>, DataError>;

    /// All-time revenue of a single gender
    async fn revenue_for_gender(&self, gender: &str) -> Result<f64, DataError>;

    /// Rows of `date_purchases` ordered by day
    async fn daily_rollups(&self) -> Result<Vec<DailyRollup>, DataError>;

    async fn close(&self);
}

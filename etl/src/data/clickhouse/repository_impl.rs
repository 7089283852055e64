//! AnalyticalStore trait implementation for ClickHouse
//!
//! Implements the AnalyticalStore trait for Arc<ClickhouseService>.
//! ClickHouse operations are natively async so no spawn_blocking needed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::AnalyticalStore;
use crate::data::types::{DailyRollup, GenderRevenue, PurchaseRecord};

use super::ClickhouseService;
use super::repositories::{aggregates, purchases, report, tables};

#[async_trait]
impl AnalyticalStore for Arc<ClickhouseService> {
    async fn rebuild_tables(&self) -> Result<(), DataError> {
        tables::rebuild(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn insert_purchases(&self, batch: &[PurchaseRecord]) -> Result<(), DataError> {
        purchases::insert_batch(self.client(), batch)
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn build_daily_totals(&self) -> Result<u64, DataError> {
        aggregates::build_daily_totals(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn build_gender_totals(&self) -> Result<u64, DataError> {
        aggregates::build_gender_totals(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn revenue_total(&self) -> Result<f64, DataError> {
        report::revenue_total(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn revenue_by_gender(&self) -> Result<Vec<GenderRevenue>, DataError> {
        report::revenue_by_gender(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn revenue_for_gender(&self, gender: &str) -> Result<f64, DataError> {
        report::revenue_for_gender(self.client(), gender)
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn daily_rollups(&self) -> Result<Vec<DailyRollup>, DataError> {
        report::daily_rollups(self.client())
            .await
            .map_err(|e| self.classify(e).into())
    }

    async fn close(&self) {
        ClickhouseService::close(self).await
    }
}

//! RelationalStore trait implementation for PostgreSQL
//!
//! Implements the RelationalStore trait for Arc<PostgresService>.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::StagingMode;
use crate::data::error::DataError;
use crate::data::traits::RelationalStore;
use crate::data::types::{NormalizeSummary, PurchaseProjection, StagingRow};

use super::PostgresService;
use super::repositories::{projection, staging, star_schema};

#[async_trait]
impl RelationalStore for Arc<PostgresService> {
    async fn create_staging_table(&self) -> Result<(), DataError> {
        staging::create_staging_table(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn load_staging(
        &self,
        rows: &[StagingRow],
        mode: StagingMode,
    ) -> Result<u64, DataError> {
        staging::load_rows(self.pool(), rows, mode)
            .await
            .map_err(Into::into)
    }

    async fn create_star_schema(&self) -> Result<(), DataError> {
        star_schema::create_tables(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn populate_star_schema(&self) -> Result<NormalizeSummary, DataError> {
        star_schema::populate(self.pool()).await.map_err(Into::into)
    }

    async fn fetch_purchase_projection(&self) -> Result<Vec<PurchaseProjection>, DataError> {
        projection::fetch_purchases(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn close(&self) {
        PostgresService::close(self).await
    }
}

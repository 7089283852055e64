//! Data storage layer
//!
//! Provides the two database services a run needs:
//! - `postgres` - Relational store (staging table and star schema)
//! - `clickhouse` - Analytical store (purchases and daily rollups)
//! - `types` - Row and result types shared by both stores
//! - `traits` - Store traits the pipeline is written against
//! - `error` - Unified error type for both backends

pub mod clickhouse;
pub mod error;
pub mod postgres;
pub mod traits;
pub mod types;

// Re-export backend-specific services
pub use clickhouse::ClickhouseService;
pub use postgres::PostgresService;

// Re-export unified error type
pub use error::DataError;

// Re-export store traits
pub use traits::{AnalyticalStore, RelationalStore};

use std::sync::Arc;

use crate::core::config::{ClickhouseConfig, PostgresConfig};

/// Both store handles of one run
pub struct Stores {
    pub relational: Arc<PostgresService>,
    pub analytical: Arc<ClickhouseService>,
}

impl Stores {
    /// Connect to PostgreSQL and ClickHouse concurrently
    ///
    /// The first connection failure aborts start-up; no stage runs against a
    /// missing store.
    pub async fn connect(
        postgres: &PostgresConfig,
        clickhouse: &ClickhouseConfig,
    ) -> Result<Self, DataError> {
        let (relational, analytical) =
            tokio::try_join!(connect_relational(postgres), connect_analytical(clickhouse))?;
        Ok(Self {
            relational,
            analytical,
        })
    }

    /// Close both stores
    pub async fn close(&self) {
        tokio::join!(self.relational.close(), self.analytical.close());
    }
}

/// Connect to PostgreSQL only
pub async fn connect_relational(config: &PostgresConfig) -> Result<Arc<PostgresService>, DataError> {
    let service = PostgresService::init(config).await.map_err(|e| match e {
        postgres::PostgresError::Database(inner) => {
            DataError::backend_unavailable("postgres", inner.to_string())
        }
        other => other.into(),
    })?;
    Ok(Arc::new(service))
}

/// Connect to ClickHouse only (used by `report`)
pub async fn connect_analytical(
    config: &ClickhouseConfig,
) -> Result<Arc<ClickhouseService>, DataError> {
    let service = ClickhouseService::init(config).await?;
    Ok(Arc::new(service))
}

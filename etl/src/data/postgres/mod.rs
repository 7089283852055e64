//! PostgreSQL relational store
//!
//! Owns the connection pool used for staging loads and star schema
//! normalization. One run is sequential, so the pool stays small; every
//! logical unit of work takes its own transaction.

pub mod error;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::PostgresError;
pub use sqlx::PgPool;

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::PostgresConfig;

/// PostgreSQL database service
///
/// Created once per run and shared with the pipeline through the
/// `RelationalStore` trait.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    /// Connect to PostgreSQL
    ///
    /// Fails immediately if the server cannot be reached, so a run never
    /// proceeds without its relational store.
    pub async fn init(config: &PostgresConfig) -> Result<Self, PostgresError> {
        let mut options = connect_options(config)?;

        options = options.log_statements(LevelFilter::Debug);

        if config.statement_timeout_secs > 0 {
            options = options.options([(
                "statement_timeout",
                format!("{}s", config.statement_timeout_secs),
            )]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::debug!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            statement_timeout_secs = config.statement_timeout_secs,
            "PostgresService initialized"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

/// Build connect options from `url`, or from the discrete fields when no URL is set
fn connect_options(config: &PostgresConfig) -> Result<PgConnectOptions, PostgresError> {
    if let Some(ref url) = config.url {
        if url.trim().is_empty() {
            return Err(PostgresError::Config("PostgreSQL URL is empty".into()));
        }
        return url
            .parse()
            .map_err(|e| PostgresError::Config(format!("Invalid PostgreSQL URL: {}", e)));
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.database);
    if let Some(ref password) = config.password {
        options = options.password(password);
    }
    Ok(options)
}

//! Unified error type for data layer
//!
//! Wraps the PostgreSQL and ClickHouse errors behind one type so the pipeline
//! can treat both stores uniformly while keeping track of which backend failed.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// PostgreSQL error (relational store)
    #[error("PostgreSQL error: {0}")]
    Postgres(sqlx::Error),

    /// ClickHouse error (analytical store)
    #[error("ClickHouse error: {0}")]
    Clickhouse(#[from] clickhouse::error::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store state forbids the operation (e.g. non-empty staging table)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Backend not reachable
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Whether a stage-level retry could plausibly succeed
    ///
    /// Configuration problems and store-state conflicts do not change between
    /// attempts; statement and connection failures might.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Conflict(_))
    }

    /// Backend that generated this error, if a store raised it
    pub fn backend(&self) -> Option<&'static str> {
        match self {
            Self::Postgres(_) => Some("postgres"),
            Self::Clickhouse(_) => Some("clickhouse"),
            Self::Timeout { backend, .. } => Some(*backend),
            Self::BackendUnavailable { backend, .. } => Some(*backend),
            Self::Config(_) | Self::Conflict(_) => None,
        }
    }
}

/// Convert from the PostgresError type
impl From<crate::data::postgres::PostgresError> for DataError {
    fn from(e: crate::data::postgres::PostgresError) -> Self {
        match e {
            crate::data::postgres::PostgresError::Database(e) => Self::Postgres(e),
            crate::data::postgres::PostgresError::Config(msg) => Self::Config(msg),
            crate::data::postgres::PostgresError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

/// Convert from the ClickhouseError type
impl From<crate::data::clickhouse::ClickhouseError> for DataError {
    fn from(e: crate::data::clickhouse::ClickhouseError) -> Self {
        match e {
            crate::data::clickhouse::ClickhouseError::Database(e) => Self::Clickhouse(e),
            crate::data::clickhouse::ClickhouseError::Connection(reason) => {
                Self::BackendUnavailable {
                    backend: "clickhouse",
                    reason,
                }
            }
            crate::data::clickhouse::ClickhouseError::Timeout { timeout_secs } => Self::Timeout {
                backend: "clickhouse",
                timeout_secs,
            },
        }
    }
}

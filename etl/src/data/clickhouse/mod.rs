//! ClickHouse analytical store
//!
//! Holds the HTTP client for the purchases fact table and the daily rollup
//! tables. The client is one shared handle used sequentially by the pipeline.
//!
//! Inserts are synchronous (no `async_insert`), so row counts read right after
//! an insert already include it.

pub mod error;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::ClickhouseError;

use clickhouse::Client;

use crate::core::config::ClickhouseConfig;

/// ClickHouse error code for `max_execution_time` being exceeded
const TIMEOUT_EXCEEDED_CODE: &str = "Code: 159";

/// ClickHouse analytics service
pub struct ClickhouseService {
    client: Client,
    query_timeout_secs: u64,
}

impl ClickhouseService {
    /// Initialize the analytics service and verify the server is reachable
    pub async fn init(config: &ClickhouseConfig) -> Result<Self, ClickhouseError> {
        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database);

        if let Some(ref user) = config.user {
            client = client.with_user(user);
        }
        if let Some(ref password) = config.password {
            client = client.with_password(password);
        }

        if config.compression {
            client = client.with_compression(clickhouse::Compression::Lz4);
        }

        if config.query_timeout_secs > 0 {
            client = client.with_option(
                "max_execution_time",
                config.query_timeout_secs.to_string(),
            );
        }

        let service = Self {
            client,
            query_timeout_secs: config.query_timeout_secs,
        };

        service.health_check().await.map_err(|e| {
            ClickhouseError::Connection(format!(
                "{}. Verify ClickHouse is running and accessible at {}",
                e, config.url
            ))
        })?;

        tracing::debug!(
            url = %config.url,
            database = %config.database,
            compression = %config.compression,
            query_timeout_secs = config.query_timeout_secs,
            "ClickhouseService initialized"
        );

        Ok(service)
    }

    /// Get the ClickHouse client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Health check - verify connection to ClickHouse
    pub async fn health_check(&self) -> Result<(), ClickhouseError> {
        self.client
            .query("SELECT 1")
            .execute()
            .await
            .map_err(ClickhouseError::from)
    }

    /// Turn server-side execution timeouts into `Timeout`
    fn classify(&self, error: ClickhouseError) -> ClickhouseError {
        classify_error(error, self.query_timeout_secs)
    }

    /// Close the connection gracefully (no-op for ClickHouse HTTP client)
    pub async fn close(&self) {
        tracing::debug!("ClickHouse connection closed");
    }
}

fn classify_error(error: ClickhouseError, query_timeout_secs: u64) -> ClickhouseError {
    match error {
        ClickhouseError::Database(e)
            if query_timeout_secs > 0 && e.to_string().contains(TIMEOUT_EXCEEDED_CODE) =>
        {
            ClickhouseError::Timeout {
                timeout_secs: query_timeout_secs,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_timeout() {
        let err = ClickhouseError::Database(clickhouse::error::Error::BadResponse(
            "Code: 159. DB::Exception: Timeout exceeded: elapsed 30.1 seconds".to_string(),
        ));
        assert!(matches!(
            classify_error(err, 30),
            ClickhouseError::Timeout { timeout_secs: 30 }
        ));
    }

    #[test]
    fn test_classify_leaves_other_errors() {
        let err = ClickhouseError::Database(clickhouse::error::Error::BadResponse(
            "Code: 60. DB::Exception: Table default.purchases does not exist".to_string(),
        ));
        assert!(matches!(
            classify_error(err, 30),
            ClickhouseError::Database(_)
        ));

        let err = ClickhouseError::Connection("refused".to_string());
        assert!(matches!(
            classify_error(err, 0),
            ClickhouseError::Connection(_)
        ));
    }
}

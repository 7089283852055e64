//! Analytical table lifecycle

use clickhouse::Client;

use crate::data::clickhouse::ClickhouseError;
use crate::data::clickhouse::schema::{ANALYTIC_TABLES, create_table_sql, drop_table_sql};

/// Drop every analytical table, then create them again empty
pub async fn rebuild(client: &Client) -> Result<(), ClickhouseError> {
    for table in ANALYTIC_TABLES {
        client.query(&drop_table_sql(table)).execute().await?;
    }

    for table in ANALYTIC_TABLES {
        if let Some(sql) = create_table_sql(table) {
            client.query(sql).execute().await?;
            tracing::debug!(table, "Created analytical table");
        }
    }
    Ok(())
}

/// Row count of a table
pub async fn count_rows(client: &Client, table: &str) -> Result<u64, ClickhouseError> {
    let count: u64 = client
        .query(&format!("SELECT count() FROM {}", table))
        .fetch_one()
        .await?;
    Ok(count)
}

//! Daily rollup statements

use clickhouse::Client;

use super::tables::count_rows;
use crate::data::clickhouse::ClickhouseError;
use crate::data::clickhouse::schema::{
    DATE_PURCHASES_BY_GENDER_TABLE, DATE_PURCHASES_TABLE, INSERT_DAILY_TOTALS,
    INSERT_GENDER_TOTALS,
};

/// Fill `date_purchases`, returning the table's row count afterwards
pub async fn build_daily_totals(client: &Client) -> Result<u64, ClickhouseError> {
    client.query(INSERT_DAILY_TOTALS).execute().await?;
    count_rows(client, DATE_PURCHASES_TABLE).await
}

/// Fill `date_purchases_by_gender`, returning the table's row count afterwards
pub async fn build_gender_totals(client: &Client) -> Result<u64, ClickhouseError> {
    client.query(INSERT_GENDER_TOTALS).execute().await?;
    count_rows(client, DATE_PURCHASES_BY_GENDER_TABLE).await
}

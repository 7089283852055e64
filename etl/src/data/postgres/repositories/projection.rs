//! Purchase projection over the staging table

use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::PurchaseProjection;

type ProjectionRow = (
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<NaiveDateTime>,
);

/// Read `CLIENTCODE, GENDER, PRICE, AMOUNT, DATE_` for every staged row
pub async fn fetch_purchases(pool: &PgPool) -> Result<Vec<PurchaseProjection>, PostgresError> {
    let rows = sqlx::query_as::<_, ProjectionRow>(
        "SELECT CLIENTCODE, GENDER, PRICE, AMOUNT, DATE_ FROM temp_data",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(client_code, gender, price, amount, timestamp)| PurchaseProjection {
                client_code,
                gender,
                price,
                amount,
                timestamp,
            },
        )
        .collect())
}

//! Revenue and rollup queries for the `report` command

use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::data::clickhouse::ClickhouseError;
use crate::data::types::{DailyRollup, GenderRevenue};
use crate::utils::time::offset_to_naive;

/// ClickHouse row for revenue per gender
#[derive(Row, Deserialize)]
struct ChGenderRevenueRow {
    gender: String,
    revenue: f64,
}

/// ClickHouse row for `date_purchases`
#[derive(Row, Deserialize)]
struct ChDailyRow {
    #[serde(with = "clickhouse::serde::time::datetime")]
    day: time::OffsetDateTime,
    date_amount: f64,
    date_price: f64,
    average_price: f64,
}

/// All-time revenue over every purchase
pub async fn revenue_total(client: &Client) -> Result<f64, ClickhouseError> {
    let revenue: f64 = client
        .query("SELECT toFloat64(sum(amount * price)) FROM purchases")
        .fetch_one()
        .await?;
    Ok(revenue)
}

/// All-time revenue for one gender value
pub async fn revenue_for_gender(client: &Client, gender: &str) -> Result<f64, ClickhouseError> {
    let revenue: f64 = client
        .query("SELECT toFloat64(sum(amount * price)) FROM purchases WHERE gender = ?")
        .bind(gender)
        .fetch_one()
        .await?;
    Ok(revenue)
}

pub async fn revenue_by_gender(client: &Client) -> Result<Vec<GenderRevenue>, ClickhouseError> {
    let rows: Vec<ChGenderRevenueRow> = client
        .query(
            "SELECT gender, toFloat64(sum(amount * price)) AS revenue \
             FROM purchases GROUP BY gender ORDER BY gender",
        )
        .fetch_all()
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| GenderRevenue {
            gender: r.gender,
            revenue: r.revenue,
        })
        .collect())
}

/// Daily totals ordered by day
pub async fn daily_rollups(client: &Client) -> Result<Vec<DailyRollup>, ClickhouseError> {
    let rows: Vec<ChDailyRow> = client
        .query(
            "SELECT day, date_amount, date_price, average_price FROM date_purchases ORDER BY day",
        )
        .fetch_all()
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| DailyRollup {
            day: offset_to_naive(r.day),
            date_amount: r.date_amount,
            date_price: r.date_price,
            average_price: r.average_price,
        })
        .collect())
}

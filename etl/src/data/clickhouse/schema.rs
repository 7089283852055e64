//! ClickHouse schema definitions
//!
//! The analytical tables are disposable: every run drops and recreates them,
//! then refills `purchases` from PostgreSQL and derives the daily rollups.

/// Append-only purchases fact table
pub const PURCHASES_TABLE: &str = "purchases";

/// Daily totals
pub const DATE_PURCHASES_TABLE: &str = "date_purchases";

/// Daily totals per gender
pub const DATE_PURCHASES_BY_GENDER_TABLE: &str = "date_purchases_by_gender";

/// Tables in creation order
pub const ANALYTIC_TABLES: [&str; 3] = [
    PURCHASES_TABLE,
    DATE_PURCHASES_TABLE,
    DATE_PURCHASES_BY_GENDER_TABLE,
];

const CREATE_PURCHASES: &str = r#"
CREATE TABLE purchases (
    id UUID DEFAULT generateUUIDv4(),
    clientcode Int64,
    gender String,
    price Float64,
    amount Float64,
    timestamp DateTime
) ENGINE = MergeTree()
ORDER BY (timestamp, id)
"#;

const CREATE_DATE_PURCHASES: &str = r#"
CREATE TABLE date_purchases (
    id UUID DEFAULT generateUUIDv4(),
    day DateTime,
    date_amount Float64,
    date_price Float64,
    average_price Float64
) ENGINE = MergeTree()
ORDER BY (day)
"#;

const CREATE_DATE_PURCHASES_BY_GENDER: &str = r#"
CREATE TABLE date_purchases_by_gender (
    id UUID DEFAULT generateUUIDv4(),
    gender String,
    day DateTime,
    date_amount Float64,
    date_price Float64,
    average_price Float64
) ENGINE = MergeTree()
ORDER BY (day, gender)
"#;

/// Daily rollup over the whole purchases table
pub const INSERT_DAILY_TOTALS: &str = r#"
INSERT INTO date_purchases (day, date_amount, date_price, average_price)
SELECT
    toStartOfDay(timestamp) AS day,
    SUM(amount) AS date_amount,
    SUM(price) AS date_price,
    date_price / date_amount
FROM purchases
GROUP BY day
"#;

/// Daily rollup split by gender
pub const INSERT_GENDER_TOTALS: &str = r#"
INSERT INTO date_purchases_by_gender (day, gender, date_amount, date_price, average_price)
SELECT
    toStartOfDay(timestamp) AS day,
    gender,
    SUM(amount) AS date_amount,
    SUM(price) AS date_price,
    date_price / date_amount
FROM purchases
GROUP BY day, gender
"#;

/// CREATE statement for one of the analytical tables
pub fn create_table_sql(table: &str) -> Option<&'static str> {
    match table {
        PURCHASES_TABLE => Some(CREATE_PURCHASES),
        DATE_PURCHASES_TABLE => Some(CREATE_DATE_PURCHASES),
        DATE_PURCHASES_BY_GENDER_TABLE => Some(CREATE_DATE_PURCHASES_BY_GENDER),
        _ => None,
    }
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table)
}

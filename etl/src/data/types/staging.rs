//! Row types for the relational side of the pipeline
//!
//! `StagingRow` mirrors the wide `temp_data` landing table one field per
//! column. Only the fields the validator requires are non-optional; every
//! other column is consumed opportunistically and stored as NULL when absent.

use chrono::NaiveDateTime;

/// One validated spreadsheet row, ready for `temp_data`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagingRow {
    pub id: Option<i64>,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub fiche_no: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub amount: f64,
    pub price: f64,
    pub line_net_total: Option<f64>,
    pub line_net: Option<f64>,
    pub branch_nr: Option<i32>,
    pub branch: Option<String>,
    pub salesman: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub client_code: i64,
    pub client_name: Option<String>,
    pub brand_code: Option<String>,
    pub brand: Option<String>,
    pub category_name1: Option<String>,
    pub category_name2: Option<String>,
    pub category_name3: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub gender: Option<String>,
}

/// Flattened purchase columns as they come back out of `temp_data`
///
/// Nothing is guaranteed here: the staging table has no constraints and may
/// have been filled by an earlier run or another tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseProjection {
    pub client_code: Option<String>,
    pub gender: Option<String>,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
}

/// Fully typed purchase, ready for the analytical `purchases` table
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub client_code: i64,
    pub gender: String,
    pub price: f64,
    pub amount: f64,
    pub timestamp: NaiveDateTime,
}

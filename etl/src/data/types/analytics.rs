//! Result types shared by the store traits and the pipeline summary

use chrono::NaiveDateTime;

/// Rows inserted into one table by a set-based statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: &'static str,
    pub rows: u64,
}

/// Per-table insert counts of one star-schema population pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub tables: Vec<TableLoad>,
}

impl NormalizeSummary {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Rows inserted into `table`, 0 if the table was not part of the pass
    pub fn rows_for(&self, table: &str) -> u64 {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.rows)
            .unwrap_or(0)
    }
}

/// One row of `date_purchases`
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRollup {
    pub day: NaiveDateTime,
    pub date_amount: f64,
    pub date_price: f64,
    pub average_price: f64,
}

/// All-time revenue of one gender value
#[derive(Debug, Clone, PartialEq)]
pub struct GenderRevenue {
    pub gender: String,
    pub revenue: f64,
}

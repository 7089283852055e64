//! In-memory store fakes for pipeline and domain tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};

use crate::core::config::StagingMode;
use crate::data::error::DataError;
use crate::data::traits::{AnalyticalStore, RelationalStore};
use crate::data::types::{
    DailyRollup, GenderRevenue, NormalizeSummary, PurchaseProjection, PurchaseRecord, StagingRow,
    TableLoad,
};

fn unavailable(backend: &'static str) -> DataError {
    DataError::backend_unavailable(backend, "connection reset by peer")
}

// ============================================================================
// Relational fake
// ============================================================================

#[derive(Default)]
struct RelationalState {
    staged: Vec<StagingRow>,
    projection: Option<Vec<PurchaseProjection>>,
    populate_failures: u32,
    populate_calls: u32,
}

#[derive(Default)]
pub struct MemoryRelational {
    state: Mutex<RelationalState>,
}

impl MemoryRelational {
    /// Serve `rows` instead of deriving the projection from staged rows
    pub fn set_projection(&self, rows: Vec<PurchaseProjection>) {
        self.state.lock().unwrap().projection = Some(rows);
    }

    pub fn seed_staging(&self, rows: Vec<StagingRow>) {
        self.state.lock().unwrap().staged.extend(rows);
    }

    /// Fail the next `times` populate calls with a transient error
    pub fn fail_populate(&self, times: u32) {
        self.state.lock().unwrap().populate_failures = times;
    }

    pub fn staged(&self) -> Vec<StagingRow> {
        self.state.lock().unwrap().staged.clone()
    }

    pub fn populate_calls(&self) -> u32 {
        self.state.lock().unwrap().populate_calls
    }
}

#[async_trait]
impl RelationalStore for MemoryRelational {
    async fn create_staging_table(&self) -> Result<(), DataError> {
        Ok(())
    }

    async fn load_staging(
        &self,
        rows: &[StagingRow],
        mode: StagingMode,
    ) -> Result<u64, DataError> {
        let mut state = self.state.lock().unwrap();
        match mode {
            StagingMode::Append => {}
            StagingMode::Truncate => state.staged.clear(),
            StagingMode::RequireEmpty if !state.staged.is_empty() => {
                return Err(DataError::Conflict(format!(
                    "temp_data already holds {} rows",
                    state.staged.len()
                )));
            }
            StagingMode::RequireEmpty => {}
        }
        state.staged.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn create_star_schema(&self) -> Result<(), DataError> {
        Ok(())
    }

    async fn populate_star_schema(&self) -> Result<NormalizeSummary, DataError> {
        let mut state = self.state.lock().unwrap();
        state.populate_calls += 1;
        if state.populate_failures > 0 {
            state.populate_failures -= 1;
            return Err(unavailable("postgres"));
        }
        let sales: BTreeSet<(Option<String>, Option<NaiveDateTime>)> = state
            .staged
            .iter()
            .map(|r| (r.fiche_no.clone(), r.date))
            .collect();
        Ok(NormalizeSummary {
            tables: vec![
                TableLoad {
                    table: "sales",
                    rows: sales.len() as u64,
                },
                TableLoad {
                    table: "sale_items",
                    rows: state.staged.len() as u64,
                },
            ],
        })
    }

    async fn fetch_purchase_projection(&self) -> Result<Vec<PurchaseProjection>, DataError> {
        let state = self.state.lock().unwrap();
        if let Some(rows) = &state.projection {
            return Ok(rows.clone());
        }
        Ok(state
            .staged
            .iter()
            .map(|r| PurchaseProjection {
                client_code: Some(r.client_code.to_string()),
                gender: r.gender.clone(),
                price: Some(r.price),
                amount: Some(r.amount),
                timestamp: r.date,
            })
            .collect())
    }

    async fn close(&self) {}
}

// ============================================================================
// Analytical fake
// ============================================================================

#[derive(Default)]
struct AnalyticalState {
    purchases: Vec<PurchaseRecord>,
    batch_sizes: Vec<usize>,
    fail_insert_after: Option<usize>,
    fail_insert_at: Option<usize>,
    gender_failures: u32,
    daily: Vec<DailyRollup>,
    by_gender: Vec<(NaiveDateTime, String)>,
    rebuilds: u32,
}

#[derive(Default)]
pub struct MemoryAnalytical {
    state: Mutex<AnalyticalState>,
}

impl MemoryAnalytical {
    pub fn purchases(&self) -> Vec<PurchaseRecord> {
        self.state.lock().unwrap().purchases.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }

    /// Let `batches` inserts succeed, then fail every later one
    pub fn fail_insert_after(&self, batches: usize) {
        self.state.lock().unwrap().fail_insert_after = Some(batches);
    }

    /// Fail the insert of batch `batch` (0-based) once
    pub fn fail_insert_at(&self, batch: usize) {
        self.state.lock().unwrap().fail_insert_at = Some(batch);
    }

    /// Fail the next `times` gender rollup builds with a transient error
    pub fn fail_gender_totals(&self, times: u32) {
        self.state.lock().unwrap().gender_failures = times;
    }

    pub fn rebuilds(&self) -> u32 {
        self.state.lock().unwrap().rebuilds
    }
}

fn start_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

#[async_trait]
impl AnalyticalStore for MemoryAnalytical {
    async fn rebuild_tables(&self) -> Result<(), DataError> {
        let mut state = self.state.lock().unwrap();
        state.purchases.clear();
        state.batch_sizes.clear();
        state.daily.clear();
        state.by_gender.clear();
        state.rebuilds += 1;
        Ok(())
    }

    async fn insert_purchases(&self, batch: &[PurchaseRecord]) -> Result<(), DataError> {
        let mut state = self.state.lock().unwrap();
        if let Some(limit) = state.fail_insert_after
            && state.batch_sizes.len() >= limit
        {
            return Err(unavailable("clickhouse"));
        }
        if state.fail_insert_at == Some(state.batch_sizes.len()) {
            state.fail_insert_at = None;
            return Err(unavailable("clickhouse"));
        }
        state.batch_sizes.push(batch.len());
        state.purchases.extend_from_slice(batch);
        Ok(())
    }

    async fn build_daily_totals(&self) -> Result<u64, DataError> {
        let mut state = self.state.lock().unwrap();
        let mut days: BTreeMap<NaiveDateTime, (f64, f64)> = BTreeMap::new();
        for p in &state.purchases {
            let entry = days.entry(start_of_day(p.timestamp)).or_default();
            entry.0 += p.amount;
            entry.1 += p.price;
        }
        // INSERT ... SELECT appends to whatever the table already holds
        state
            .daily
            .extend(
                days.into_iter()
                    .map(|(day, (date_amount, date_price))| DailyRollup {
                        day,
                        date_amount,
                        date_price,
                        average_price: date_price / date_amount,
                    }),
            );
        Ok(state.daily.len() as u64)
    }

    async fn build_gender_totals(&self) -> Result<u64, DataError> {
        let mut state = self.state.lock().unwrap();
        if state.gender_failures > 0 {
            state.gender_failures -= 1;
            return Err(unavailable("clickhouse"));
        }
        let groups: BTreeSet<(NaiveDateTime, String)> = state
            .purchases
            .iter()
            .map(|p| (start_of_day(p.timestamp), p.gender.clone()))
            .collect();
        state.by_gender.extend(groups);
        Ok(state.by_gender.len() as u64)
    }

    async fn revenue_total(&self) -> Result<f64, DataError> {
        let state = self.state.lock().unwrap();
        Ok(state.purchases.iter().map(|p| p.amount * p.price).sum())
    }

    async fn revenue_by_gender(&self) -> Result<Vec<GenderRevenue>, DataError> {
        let state = self.state.lock().unwrap();
        let mut by_gender: BTreeMap<String, f64> = BTreeMap::new();
        for p in &state.purchases {
            *by_gender.entry(p.gender.clone()).or_default() += p.amount * p.price;
        }
        Ok(by_gender
            .into_iter()
            .map(|(gender, revenue)| GenderRevenue { gender, revenue })
            .collect())
    }

    async fn revenue_for_gender(&self, gender: &str) -> Result<f64, DataError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .purchases
            .iter()
            .filter(|p| p.gender == gender)
            .map(|p| p.amount * p.price)
            .sum())
    }

    async fn daily_rollups(&self) -> Result<Vec<DailyRollup>, DataError> {
        Ok(self.state.lock().unwrap().daily.clone())
    }

    async fn close(&self) {}
}

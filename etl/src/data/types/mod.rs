//! Shared data types for both stores
//!
//! Staging and projection rows travel between the spreadsheet reader, the
//! relational store and the analytical store; result types are what the store
//! traits report back to the pipeline.

mod analytics;
mod staging;

pub use analytics::{DailyRollup, GenderRevenue, NormalizeSummary, TableLoad};
pub use staging::{PurchaseProjection, PurchaseRecord, StagingRow};

//! Domain logic for the retail sales ETL
//!
//! - `ingest` - Spreadsheet reading and row validation
//! - `transfer` - Staging projection to analytical purchases
//! - `aggregate` - Daily rollup tables
//! - `report` - Revenue queries over the analytical store
//! - `pipeline` - Stage runner tying the above together

pub mod aggregate;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod transfer;

pub use pipeline::{Pipeline, PipelineError, PipelineSettings, RunReport, Stage};

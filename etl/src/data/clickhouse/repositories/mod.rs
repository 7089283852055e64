//! ClickHouse repository modules
//!
//! - **tables**: drop/recreate of the analytical tables
//! - **purchases**: batch inserts into the purchases fact table
//! - **aggregates**: daily rollup statements
//! - **report**: revenue and rollup queries

pub mod aggregates;
pub mod purchases;
pub mod report;
pub mod tables;

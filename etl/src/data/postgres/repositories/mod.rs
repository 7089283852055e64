//! PostgreSQL repository modules
//!
//! - **staging**: `temp_data` creation and bulk loads
//! - **star_schema**: dimension/fact table creation and population
//! - **projection**: flattened purchase columns for the analytical transfer

pub mod projection;
pub mod staging;
pub mod star_schema;

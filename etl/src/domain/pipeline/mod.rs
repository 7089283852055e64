//! Stage runner
//!
//! ```text
//! STAGE_CREATE ─▶ STAGE_LOAD ─▶ NORMALIZE_CREATE ─▶ NORMALIZE_POPULATE
//!      ─▶ ANALYTIC_REBUILD ─▶ ANALYTIC_LOAD ─▶ AGGREGATE
//! ```
//!
//! - `stage` - stage enum and range selection
//! - `error` - stage and pipeline errors
//! - `runner` - executes a stage range with retry and halt-on-failure

mod error;
mod runner;
mod stage;

pub use error::{PipelineError, StageError};
pub use runner::{Pipeline, PipelineSettings, RunReport, StageDetail, StageOutcome, StageStatus};
pub use stage::Stage;

//! Pipeline error types

use thiserror::Error;

use super::stage::Stage;
use crate::data::error::DataError;
use crate::domain::ingest::IngestError;

/// Failure of a single stage attempt
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Data(#[from] DataError),

    /// Blocking task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl StageError {
    /// Input problems never fix themselves between attempts
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ingest(_) | Self::Task(_) => false,
            Self::Data(e) => e.is_retryable(),
        }
    }

    /// Store that raised the error, if any
    pub fn backend(&self) -> Option<&'static str> {
        match self {
            Self::Data(e) => e.backend(),
            Self::Ingest(_) | Self::Task(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage {stage} failed after {attempts} attempt(s): {source}")]
    Stage {
        stage: Stage,
        attempts: u32,
        source: StageError,
    },

    #[error("Invalid stage range: {from} runs after {to}")]
    InvalidRange { from: Stage, to: Stage },
}

impl PipelineError {
    /// Stage that failed, if the error came from a stage
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::InvalidRange { .. } => None,
        }
    }

    /// Store that caused a stage failure, if any
    pub fn backend(&self) -> Option<&'static str> {
        match self {
            Self::Stage { source, .. } => source.backend(),
            Self::InvalidRange { .. } => None,
        }
    }
}

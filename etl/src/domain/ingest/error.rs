//! Spreadsheet input error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a run before or while reading the input spreadsheet
///
/// None of these are worth retrying: the same file yields the same error.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No input spreadsheet configured (set input.path or --input)")]
    NoInput,

    #[error("Failed to open spreadsheet {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    #[error("Spreadsheet {} has no worksheets", .path.display())]
    NoSheets { path: PathBuf },

    #[error("Worksheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Failed to read worksheet '{sheet}': {reason}")]
    Read { sheet: String, reason: String },

    #[error("Worksheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error("Configuration error: missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid data: all {total} rows were rejected")]
    NoValidData { total: usize },
}

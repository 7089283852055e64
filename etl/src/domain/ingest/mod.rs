//! Spreadsheet ingestion
//!
//! - `sheet` - workbook reader producing typed cells
//! - `coerce` - cell coercion to staging column types
//! - `validate` - required-column check and per-row validation

pub mod coerce;
pub mod error;
pub mod sheet;
pub mod validate;

pub use error::IngestError;
pub use sheet::{Cell, Sheet, read_workbook};
pub use validate::{SkippedRow, ValidatedRows, validate_sheet};

use std::path::Path;

/// Read and validate the input spreadsheet
pub fn load_input(path: &Path, sheet: Option<&str>) -> Result<ValidatedRows, IngestError> {
    let sheet = read_workbook(path, sheet)?;
    let validated = validate_sheet(&sheet)?;

    tracing::info!(
        path = %path.display(),
        sheet = %sheet.name,
        rows = validated.total,
        valid = validated.rows.len(),
        skipped = validated.skipped.len(),
        "Input validated"
    );
    Ok(validated)
}

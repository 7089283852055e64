//! Spreadsheet reader
//!
//! Opens a workbook with calamine (xls, xlsx, xlsb, ods), picks the configured
//! or first worksheet, and exposes it as a header row plus typed cells.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;

use super::error::IngestError;
use crate::utils::time::parse_timestamp;

/// One spreadsheet cell after sentinel scrubbing
///
/// Blank strings, NaN and spreadsheet error cells all arrive as `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) if f.is_nan() => Cell::Empty,
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Empty),
            Data::DateTimeIso(s) => parse_timestamp(s)
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// A worksheet as header names plus data rows
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Spreadsheet line number (1-based) of `rows[0]`
    pub first_line: usize,
}

impl Sheet {
    /// Spreadsheet line number of a data row
    pub fn line_of(&self, row_index: usize) -> usize {
        self.first_line + row_index
    }
}

fn header_name(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Read one worksheet of a workbook
///
/// `sheet` selects a worksheet by name; `None` takes the first one.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Sheet, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                sheet: wanted.to_string(),
                available: names.join(", "),
            })?,
        None => names.first().cloned().ok_or_else(|| IngestError::NoSheets {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::Read {
            sheet: name.clone(),
            reason: e.to_string(),
        })?;

    // Ranges start at the first used cell, which is not always A1
    let header_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_name).collect(),
        None => return Err(IngestError::EmptySheet { sheet: name }),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::EmptySheet { sheet: name });
    }

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    tracing::debug!(
        path = %path.display(),
        sheet = %name,
        columns = headers.len(),
        rows = rows.len(),
        "Worksheet read"
    );

    Ok(Sheet {
        name,
        headers,
        rows,
        first_line: header_line + 1,
    })
}

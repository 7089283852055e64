//! Row validation and normalization
//!
//! Maps worksheet columns by header name, coerces the required purchase
//! fields, and turns every surviving row into a `StagingRow`. Rows whose
//! client code, price or amount cannot be coerced are skipped with a warning;
//! only a sheet with no surviving rows at all is an error.

use std::collections::HashMap;

use super::coerce::{CoerceError, to_float, to_int, to_text, to_timestamp};
use super::error::IngestError;
use super::sheet::{Cell, Sheet};
use crate::core::constants::REQUIRED_COLUMNS;
use crate::data::types::StagingRow;

static EMPTY: Cell = Cell::Empty;

/// A rejected row
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Spreadsheet line number (1-based, header is line 1)
    pub line: usize,
    pub reason: String,
}

/// Outcome of validating one worksheet
#[derive(Debug, Clone)]
pub struct ValidatedRows {
    pub rows: Vec<StagingRow>,
    pub skipped: Vec<SkippedRow>,
    /// Non-blank data rows seen
    pub total: usize,
}

/// Header name to column index, upper-cased
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(sheet: &Sheet) -> Self {
        let mut index = HashMap::new();
        for (i, header) in sheet.headers.iter().enumerate() {
            // First occurrence wins when a header repeats
            index.entry(header.trim().to_uppercase()).or_insert(i);
        }
        Self { index }
    }

    fn missing_required(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| !self.index.contains_key(**c))
            .map(|c| c.to_string())
            .collect()
    }

    fn get<'a>(&self, row: &'a [Cell], name: &str) -> &'a Cell {
        self.index
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or(&EMPTY)
    }
}

fn required<T>(column: &str, value: Result<T, CoerceError>) -> Result<T, String> {
    value.map_err(|e| format!("{}: {}", column, e))
}

fn build_row(columns: &Columns, row: &[Cell]) -> Result<StagingRow, String> {
    let cell = |name: &str| columns.get(row, name);

    let client_code = required("CLIENTCODE", to_int(cell("CLIENTCODE")))?;
    let price = required("PRICE", to_float(cell("PRICE")))?;
    let amount = required("AMOUNT", to_float(cell("AMOUNT")))?;

    Ok(StagingRow {
        id: to_int(cell("ID")).ok(),
        item_code: to_text(cell("ITEMCODE")),
        item_name: to_text(cell("ITEMNAME")),
        fiche_no: to_text(cell("FICHENO")),
        date: to_timestamp(cell("DATE_")).ok().flatten(),
        amount,
        price,
        line_net_total: to_float(cell("LINENETTOTAL")).ok(),
        line_net: to_float(cell("LINENET")).ok(),
        branch_nr: to_int(cell("BRANCHNR"))
            .ok()
            .and_then(|v| i32::try_from(v).ok()),
        branch: to_text(cell("BRANCH")),
        salesman: to_text(cell("SALESMAN")),
        city: to_text(cell("CITY")),
        region: to_text(cell("REGION")),
        latitude: to_float(cell("LATITUDE")).ok(),
        longitude: to_float(cell("LONGITUDE")).ok(),
        client_code,
        client_name: to_text(cell("CLIENTNAME")),
        brand_code: to_text(cell("BRANDCODE")),
        brand: to_text(cell("BRAND")),
        category_name1: to_text(cell("CATEGORY_NAME1")),
        category_name2: to_text(cell("CATEGORY_NAME2")),
        category_name3: to_text(cell("CATEGORY_NAME3")),
        start_date: to_timestamp(cell("STARTDATE")).ok().flatten(),
        end_date: to_timestamp(cell("ENDDATE")).ok().flatten(),
        gender: to_text(cell("GENDER")),
    })
}

/// Validate every data row of a worksheet
///
/// Fails before looking at any row if a required column is missing from the
/// header. Fully blank rows are ignored.
pub fn validate_sheet(sheet: &Sheet) -> Result<ValidatedRows, IngestError> {
    let columns = Columns::new(sheet);

    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let mut rows = Vec::with_capacity(sheet.rows.len());
    let mut skipped = Vec::new();
    let mut total = 0usize;

    for (i, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        total += 1;

        match build_row(&columns, row) {
            Ok(staging_row) => rows.push(staging_row),
            Err(reason) => {
                let line = sheet.line_of(i);
                tracing::warn!(line, reason = %reason, "Skipping spreadsheet row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    if rows.is_empty() {
        return Err(IngestError::NoValidData { total });
    }

    Ok(ValidatedRows {
        rows,
        skipped,
        total,
    })
}

//! Cell coercion to the staging column types

use chrono::NaiveDateTime;
use thiserror::Error;

use super::sheet::Cell;
use crate::utils::time::parse_timestamp;

/// Largest float that still truncates to a valid i64
const I64_FLOAT_LIMIT: f64 = 9_223_372_036_854_775_807.0;

/// Why a cell could not be coerced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoerceError {
    #[error("value is missing")]
    Missing,

    #[error("'{0}' is not an integer")]
    NotInteger(String),

    #[error("'{0}' is not a number")]
    NotNumber(String),

    #[error("boolean values are not accepted")]
    Boolean,

    #[error("'{0}' is not a timestamp")]
    NotTimestamp(String),
}

fn describe(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(dt) => dt.to_string(),
    }
}

/// Integer cells as-is, finite floats truncated toward zero, trimmed integer strings
pub fn to_int(cell: &Cell) -> Result<i64, CoerceError> {
    match cell {
        Cell::Empty => Err(CoerceError::Missing),
        Cell::Int(i) => Ok(*i),
        Cell::Float(f) if f.is_finite() && f.trunc().abs() < I64_FLOAT_LIMIT => {
            Ok(f.trunc() as i64)
        }
        Cell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoerceError::NotInteger(s.clone())),
        Cell::Bool(_) => Err(CoerceError::Boolean),
        other => Err(CoerceError::NotInteger(describe(other))),
    }
}

/// Numeric cells and finite float strings
pub fn to_float(cell: &Cell) -> Result<f64, CoerceError> {
    match cell {
        Cell::Empty => Err(CoerceError::Missing),
        Cell::Int(i) => Ok(*i as f64),
        Cell::Float(f) if f.is_finite() => Ok(*f),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            _ => Err(CoerceError::NotNumber(s.clone())),
        },
        Cell::Bool(_) => Err(CoerceError::Boolean),
        other => Err(CoerceError::NotNumber(describe(other))),
    }
}

/// Text representation of any non-empty cell
///
/// Whole floats print without a fractional part so numeric codes keep their
/// natural form (`4711.0` reads back as `4711`).
pub fn to_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Float(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            Some(format!("{:.0}", f))
        }
        Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => Some(describe(other)),
    }
}

/// Native date cells and timestamp strings; empty cells are `Ok(None)`
pub fn to_timestamp(cell: &Cell) -> Result<Option<NaiveDateTime>, CoerceError> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::DateTime(dt) => Ok(Some(*dt)),
        Cell::Text(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| CoerceError::NotTimestamp(s.clone())),
        other => Err(CoerceError::NotTimestamp(describe(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(&Cell::Int(42)), Ok(42));
        assert_eq!(to_int(&Cell::Float(42.9)), Ok(42));
        assert_eq!(to_int(&Cell::Float(-3.7)), Ok(-3));
        assert_eq!(to_int(&Cell::Text(" 17 ".into())), Ok(17));
        assert_eq!(to_int(&Cell::Empty), Err(CoerceError::Missing));
        assert_eq!(to_int(&Cell::Bool(true)), Err(CoerceError::Boolean));
        assert_eq!(
            to_int(&Cell::Text("12.5".into())),
            Err(CoerceError::NotInteger("12.5".into()))
        );
        assert!(to_int(&Cell::Float(f64::INFINITY)).is_err());
        assert!(to_int(&Cell::Float(1e300)).is_err());
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(&Cell::Int(2)), Ok(2.0));
        assert_eq!(to_float(&Cell::Float(2.5)), Ok(2.5));
        assert_eq!(to_float(&Cell::Text("3.25".into())), Ok(3.25));
        assert_eq!(
            to_float(&Cell::Text("abc".into())),
            Err(CoerceError::NotNumber("abc".into()))
        );
        assert!(to_float(&Cell::Text("inf".into())).is_err());
        assert_eq!(to_float(&Cell::Bool(false)), Err(CoerceError::Boolean));
        assert_eq!(to_float(&Cell::Empty), Err(CoerceError::Missing));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&Cell::Empty), None);
        assert_eq!(to_text(&Cell::Float(4711.0)), Some("4711".into()));
        assert_eq!(to_text(&Cell::Float(1.5)), Some("1.5".into()));
        assert_eq!(to_text(&Cell::Int(9)), Some("9".into()));
        assert_eq!(to_text(&Cell::Text("Kadın".into())), Some("Kadın".into()));
    }

    #[test]
    fn test_to_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(to_timestamp(&Cell::DateTime(dt)), Ok(Some(dt)));
        assert_eq!(to_timestamp(&Cell::Text("05.03.2024".into())), Ok(Some(dt)));
        assert_eq!(to_timestamp(&Cell::Empty), Ok(None));
        assert!(to_timestamp(&Cell::Text("yesterday".into())).is_err());
        assert!(to_timestamp(&Cell::Float(45000.0)).is_err());
    }
}

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cell of a call record. Serializes to a bare JSON null, number, or
/// string so merged datasets round-trip as plain JSON tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Num(f64),
    Str(String),
}

/// One call record keyed by column name. Inside a merged dataset every row
/// carries exactly the dataset's column set (see `ingest::normalize_rows`).
pub type Row = HashMap<String, Cell>;

impl Cell {
    /// Empty fields normalize to `Null`; everything else stays a raw string.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Null
        } else {
            Cell::Str(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the cell: `Num` directly, `Str` parsed when possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Num(n) => Some(*n),
            Cell::Str(s) => s.trim().parse::<f64>().ok(),
            Cell::Null => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    // Datetime-bearing cells still contribute their date part.
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.date());
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn from_raw_normalizes_empty_to_null() {
        assert_eq!(Cell::from_raw(""), Cell::Null);
        assert_eq!(Cell::from_raw("x"), Cell::Str("x".to_string()));
    }

    #[test]
    fn as_number_coerces_numeric_strings() {
        assert_eq!(Cell::Str("42.5".into()).as_number(), Some(42.5));
        assert_eq!(Cell::Str(" 7 ".into()).as_number(), Some(7.0));
        assert_eq!(Cell::Str("seven".into()).as_number(), None);
        assert_eq!(Cell::Null.as_number(), None);
    }

    #[test]
    fn cell_serializes_as_plain_json() {
        assert_eq!(serde_json::to_string(&Cell::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Cell::Num(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&Cell::Str("CA".into())).unwrap(),
            "\"CA\""
        );
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("05/06/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024-05-06 14:30:00").unwrap(), expected);
        assert!(parse_naive_date("never").is_err());
    }
}

//! Cell values and cell errors.
//!
//! [`CellValue`] is the typed value of a single cell. `Empty` is an
//! explicit value (a patch can write it to clear a cell) and is distinct
//! from a cell that is simply absent from the sheet.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::style::Font;

/// The seven spreadsheet error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Div0,
    NA,
    Name,
    Null,
    Num,
    Ref,
    Value,
}

impl CellError {
    /// The literal error text as it appears in cells and formulas.
    pub fn code(self) -> &'static str {
        match self {
            CellError::Div0 => "#DIV/0!",
            CellError::NA => "#N/A",
            CellError::Name => "#NAME?",
            CellError::Null => "#NULL!",
            CellError::Num => "#NUM!",
            CellError::Ref => "#REF!",
            CellError::Value => "#VALUE!",
        }
    }

    /// Parse an error literal. Returns `None` for unknown text.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "#DIV/0!" => Some(CellError::Div0),
            "#N/A" => Some(CellError::NA),
            "#NAME?" => Some(CellError::Name),
            "#NULL!" => Some(CellError::Null),
            "#NUM!" => Some(CellError::Num),
            "#REF!" => Some(CellError::Ref),
            "#VALUE!" => Some(CellError::Value),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One run of rich text: a fragment with an optional font override.
#[derive(Debug, Clone, PartialEq)]
pub struct RichRun {
    pub text: String,
    pub font: Option<Font>,
}

impl RichRun {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font: None,
        }
    }
}

/// The typed value of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Explicitly empty; distinct from "cell not present".
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// Rich text: an ordered sequence of runs.
    Rich(Vec<RichRun>),
    /// Numeric value. Excel stores all numbers as IEEE doubles.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Local date-time; serialized as an OOXML serial number.
    DateTime(NaiveDateTime),
    /// Formula (without the leading `=`) and its cached result. The cache
    /// is never itself a formula.
    Formula {
        expr: String,
        cached: Option<Box<CellValue>>,
    },
    /// Error value.
    Error(CellError),
}

impl CellValue {
    /// A formula with no cached result.
    pub fn formula(expr: &str) -> Self {
        CellValue::Formula {
            expr: expr.to_string(),
            cached: None,
        }
    }

    /// A formula with a cached result. Nested formulas are flattened to
    /// their own cache (or dropped) to preserve the no-nesting invariant.
    pub fn formula_with_cache(expr: &str, cached: CellValue) -> Self {
        let cached = match cached {
            CellValue::Formula { cached, .. } => cached,
            other => Some(Box::new(other)),
        };
        CellValue::Formula {
            expr: expr.to_string(),
            cached,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Plain-text view of rich text; other variants render as displayed.
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Rich(runs) => {
                for run in runs {
                    write!(f, "{}", run.text)?;
                }
                Ok(())
            }
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
            CellValue::Formula { expr, cached } => match cached {
                Some(v) => write!(f, "{v}"),
                None => write!(f, "={expr}"),
            },
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

// ---------------------------------------------------------------------------
// OOXML serial dates
// ---------------------------------------------------------------------------

/// The OOXML serial epoch: day 0 is 1899-12-30 (which absorbs the Lotus
/// 1900 leap-year bug for dates from 1900-03-01 on).
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Convert a date-time to an OOXML serial number (days since the epoch,
/// fractional part for time of day).
pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let days = (dt.date() - serial_epoch()).num_days() as f64;
    let seconds = dt.time().signed_duration_since(
        chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
    );
    days + seconds.num_seconds() as f64 / 86_400.0
}

/// Convert an OOXML serial number back to a date-time, rounding to whole
/// seconds.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let total_seconds = (serial * 86_400.0).round() as i64;
    serial_epoch()
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(total_seconds))
}

//! Typed cell values and cell addressing

use crate::error::{OdsError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;

/// ODF value types (`office:value-type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    Float,
    Percentage,
    Currency,
    Date,
    Time,
    String,
    Void,
}

impl ValueType {
    /// Value of the `office:value-type` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Float => "float",
            ValueType::Percentage => "percentage",
            ValueType::Currency => "currency",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::String => "string",
            ValueType::Void => "void",
        }
    }

    /// Attribute carrying the value, `None` for void
    pub fn value_attribute(&self) -> Option<&'static str> {
        match self {
            ValueType::Boolean => Some("office:boolean-value"),
            ValueType::Float | ValueType::Percentage | ValueType::Currency => Some("office:value"),
            ValueType::Date => Some("office:date-value"),
            ValueType::Time => Some("office:time-value"),
            ValueType::String => Some("office:string-value"),
            ValueType::Void => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default currency code for coerced currency values
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Represents a single cell value in an ODS table
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// Never set
    #[default]
    Empty,
    /// Explicitly empty
    Void,
    /// String value
    String(String),
    /// Integer value, written as a float
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Percentage, 0.25 is 25%
    Percentage(f64),
    /// Amount with an ISO 4217 currency code
    Currency { value: f64, currency: String },
    /// Date and time
    Date(NaiveDateTime),
    /// Duration
    Time(TimeDelta),
}

impl CellValue {
    /// Value type, `None` while the cell was never set
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            CellValue::Empty => None,
            CellValue::Void => Some(ValueType::Void),
            CellValue::String(_) => Some(ValueType::String),
            CellValue::Int(_) | CellValue::Float(_) => Some(ValueType::Float),
            CellValue::Bool(_) => Some(ValueType::Boolean),
            CellValue::Percentage(_) => Some(ValueType::Percentage),
            CellValue::Currency { .. } => Some(ValueType::Currency),
            CellValue::Date(_) => Some(ValueType::Date),
            CellValue::Time(_) => Some(ValueType::Time),
        }
    }

    /// Check if cell was never set
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty | CellValue::Void => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Percentage(p) => format!("{}%", p * 100.0),
            CellValue::Currency { value, currency } => format!("{} {}", value, currency),
            CellValue::Date(d) => format_date(d),
            CellValue::Time(t) => format_duration(t),
        }
    }

    /// Try to convert to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) | CellValue::Percentage(f) => Some(*f),
            CellValue::Currency { value, .. } => Some(*value),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => Some(*i != 0),
            CellValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Try to convert to a date. Accepts `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM:SS[.fff]`.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => {
                let s = s.trim();
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
            }
            _ => None,
        }
    }

    /// Try to convert to a duration. Numbers are seconds, strings are `HH:MM:SS`.
    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            CellValue::Time(t) => Some(*t),
            CellValue::Int(i) => TimeDelta::try_seconds(*i),
            CellValue::Float(f) => {
                if f.is_finite() {
                    TimeDelta::try_milliseconds((f * 1000.0).round() as i64)
                } else {
                    None
                }
            }
            CellValue::String(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .ok()
                .map(|t| t - NaiveTime::MIN),
            _ => None,
        }
    }

    /// Coerce this value to the type given as hint
    ///
    /// # Examples
    ///
    /// ```
    /// use fastods::types::{CellValue, ValueType};
    ///
    /// let value = CellValue::from("12.5").coerce(ValueType::Float).unwrap();
    /// assert_eq!(value, CellValue::Float(12.5));
    ///
    /// assert!(CellValue::from("abc").coerce(ValueType::Float).is_err());
    /// ```
    pub fn coerce(self, hint: ValueType) -> Result<CellValue> {
        let converted = match hint {
            ValueType::Boolean => self.as_bool().map(CellValue::Bool),
            ValueType::Float => match self {
                CellValue::Int(_) | CellValue::Float(_) => Some(self.clone()),
                _ => self.as_f64().map(CellValue::Float),
            },
            ValueType::Percentage => match &self {
                CellValue::String(s) if s.trim().ends_with('%') => s
                    .trim()
                    .trim_end_matches('%')
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|p| CellValue::Percentage(p / 100.0)),
                _ => self.as_f64().map(CellValue::Percentage),
            },
            ValueType::Currency => match &self {
                CellValue::Currency { .. } => Some(self.clone()),
                _ => self.as_f64().map(|value| CellValue::Currency {
                    value,
                    currency: DEFAULT_CURRENCY.to_string(),
                }),
            },
            ValueType::Date => self.as_date().map(CellValue::Date),
            ValueType::Time => self.as_duration().map(CellValue::Time),
            ValueType::String => Some(CellValue::String(self.as_string())),
            ValueType::Void => Some(CellValue::Void),
        };
        let value = converted.ok_or_else(|| OdsError::Conversion {
            value: self.as_string(),
            target: hint.as_str(),
        })?;
        value.ensure_finite()?;
        Ok(value)
    }

    /// Reject infinite and NaN numbers, which spreadsheet cells can't hold
    pub fn ensure_finite(&self) -> Result<()> {
        let (number, target) = match self {
            CellValue::Float(f) => (*f, "float"),
            CellValue::Percentage(f) => (*f, "percentage"),
            CellValue::Currency { value, .. } => (*value, "currency"),
            _ => return Ok(()),
        };
        if number.is_finite() {
            Ok(())
        } else {
            Err(OdsError::Conversion {
                value: number.to_string(),
                target,
            })
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d.and_time(NaiveTime::MIN))
    }
}

impl From<TimeDelta> for CellValue {
    fn from(t: TimeDelta) -> Self {
        CellValue::Time(t)
    }
}

/// `office:date-value` format: `yyyy-MM-ddTHH:mm:ss.SSS`
pub fn format_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// `office:time-value` format: ISO 8601 duration, e.g. `PT12H30M5.250S`
pub fn format_duration(duration: &TimeDelta) -> String {
    let sign = if *duration < TimeDelta::zero() { "-" } else { "" };
    let total_ms = duration.num_milliseconds().unsigned_abs();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    if millis == 0 {
        format!("{}PT{}H{}M{}S", sign, hours, minutes, seconds)
    } else {
        format!("{}PT{}H{}M{}.{:03}S", sign, hours, minutes, seconds, millis)
    }
}

/// Convert column index to letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut col = col + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Cell reference such as `B3` (0-based indexes)
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Table name as it appears in a cell address, quoted when needed
pub fn table_reference(table: &str) -> String {
    if table.chars().all(|c| c.is_alphanumeric() || c == '_') {
        table.to_string()
    } else {
        format!("'{}'", table.replace('\'', "''"))
    }
}

/// Absolute range address such as `$t1.$A$1:.$C$10`
pub fn range_address(table: &str, r1: u32, c1: u32, r2: u32, c2: u32) -> String {
    format!(
        "${}.${}${}:.${}${}",
        table_reference(table),
        col_to_letter(c1),
        r1 + 1,
        col_to_letter(c2),
        r2 + 1
    )
}

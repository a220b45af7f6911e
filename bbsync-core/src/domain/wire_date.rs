//! Date encodings used by the statement API
//!
//! The bank packs day, month and year into one run of digits:
//!
//! - request encoding: day without leading zero (`3032024` for 2024-03-03)
//! - storage encoding: day always two digits (`03032024`)
//!
//! Responses may use either width, so parsing accepts 7 and 8 digits.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};

/// Years outside this window are treated as corrupt upstream data
const MIN_YEAR: i32 = 2020;
const MAX_YEAR: i32 = 2050;

/// Encode a date for a request parameter (no leading zero on the day)
pub fn format_wire_date(date: NaiveDate) -> String {
    format!("{}{:02}{:04}", date.day(), date.month(), date.year())
}

/// Encode a date for storage (fixed width, 8 digits)
pub fn format_internal_date(date: NaiveDate) -> String {
    format!("{:02}{:02}{:04}", date.day(), date.month(), date.year())
}

/// Strict parse of a 7 or 8 digit encoded date
///
/// Returns `None` for anything that is not a real calendar date within the
/// accepted year window.
pub fn try_parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !(raw.len() == 7 || raw.len() == 8) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let padded = format!("{:0>8}", raw);
    let day: u32 = padded[0..2].parse().ok()?;
    let month: u32 = padded[2..4].parse().ok()?;
    let year: i32 = padded[4..8].parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Lenient parse used on response data: falls back to `today` when the value
/// is missing or out of range
pub fn parse_wire_date(raw: &str, today: NaiveDate) -> NaiveDate {
    match try_parse_wire_date(raw) {
        Some(date) => date,
        None => {
            warn!(raw = raw, fallback = %today, "Unparseable statement date, using today");
            today
        }
    }
}

/// Replace a date in the future with `today`
pub fn clamp_not_future(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    if date > today {
        info!(requested = %date, clamped = %today, "Clamping future date to today");
        today
    } else {
        date
    }
}

/// A date argument as supplied by a caller
///
/// Calendar dates are clamped and encoded on the way out; strings that are
/// already wire-encoded are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateParam {
    Calendar(NaiveDate),
    Encoded(String),
}

impl DateParam {
    /// Produce the request encoding, clamping calendar dates to `today`
    pub fn to_wire(&self, today: NaiveDate) -> String {
        match self {
            Self::Calendar(date) => format_wire_date(clamp_not_future(*date, today)),
            Self::Encoded(raw) => raw.clone(),
        }
    }

    /// Calendar value after clamping, if this is a calendar date
    pub fn resolved(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Calendar(date) => Some(clamp_not_future(*date, today)),
            Self::Encoded(raw) => try_parse_wire_date(raw),
        }
    }
}

impl From<NaiveDate> for DateParam {
    fn from(date: NaiveDate) -> Self {
        Self::Calendar(date)
    }
}

impl FromStr for DateParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::Calendar(date));
        }
        if (s.len() == 7 || s.len() == 8) && s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::Encoded(s.to_string()));
        }
        Err(Error::validation(format!(
            "Invalid date '{}': expected YYYY-MM-DD or DMMYYYY",
            s
        )))
    }
}

impl fmt::Display for DateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calendar(date) => write!(f, "{}", date),
            Self::Encoded(raw) => write!(f, "{}", raw),
        }
    }
}

/// Deserialize a wire date that can be a JSON number or string
///
/// Zero, null and empty strings become `None`.
pub fn deserialize_wire_date_raw<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => {
            let s = n.to_string();
            Ok(if s == "0" { None } else { Some(s) })
        }
        Some(JsonValue::String(s)) => {
            let s = s.trim().to_string();
            Ok(if s.is_empty() || s == "0" { None } else { Some(s) })
        }
        Some(_) => Err(D::Error::custom("expected number or string for date")),
    }
}

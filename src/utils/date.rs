//! Date prefix derivation.
//!
//! Exported posts carry their publication date in many shapes
//! (`2021-05-03`, `2021-05-03 10:00:00 +0000`, `2019-12-01T10:20:30.000Z`,
//! `May 3, 2021`, ...). Every accepted shape is reduced to the calendar
//! date as written and formatted as `YYYY-MM-DD` for file naming.
//!
//! # Examples
//!
//! ```ignore
//! assert_eq!(date_prefix("2021-05-03T23:30:00-07:00").unwrap(), "2021-05-03");
//! assert_eq!(find_date_in_name("post-2019-12-01-draft.md"), Some("2019-12-01"));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Output format of a date prefix.
pub const PREFIX_FORMAT: &str = "%Y-%m-%d";

/// `####-##-##` anywhere in a file name.
static NAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid date regex"));

/// Date-times with an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %:z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Date-times without an offset.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Plain calendar dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// A metadata `date` value that is not a recognizable date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized date `{0}`")]
pub struct DateParseError(pub String);

/// Parse a textual date or date-time into its calendar date.
///
/// The date is taken as written: `2021-05-03T23:30:00-07:00` is May 3rd even
/// though it is May 4th in UTC.
pub fn parse_date(text: &str) -> Result<NaiveDate, DateParseError> {
    let s = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.date_naive());
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
        .ok_or_else(|| DateParseError(text.to_string()))
}

/// Parse `text` and format it as a `YYYY-MM-DD` prefix.
pub fn date_prefix(text: &str) -> Result<String, DateParseError> {
    parse_date(text).map(|date| date.format(PREFIX_FORMAT).to_string())
}

/// Find the first `YYYY-MM-DD` shaped substring of a file name.
///
/// The match is returned verbatim, it is not validated as a calendar date.
pub fn find_date_in_name(file_name: &str) -> Option<&str> {
    NAME_DATE.find(file_name).map(|m| m.as_str())
}

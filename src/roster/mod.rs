//! Roster parsing.
//!
//! [`RosterParser`] turns uploaded roster bytes into [`DutyRecord`]s. Three
//! layouts are supported: comma-separated, tab-separated and the crew-roster
//! text layout. Parsing is a pure function of the input bytes, so a failed
//! upload can simply be parsed again.

mod fields;
mod tabular;
mod text;

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::DutyRecord;

pub use fields::{
    DEFAULT_AIRPORT_DUTY_HOURS, MAX_DUTY_HOURS, classify_duty_code, classify_flight, is_truthy,
    parse_date, parse_duration,
};

/// The layout of an uploaded roster.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RosterFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Tab-separated values with a header row.
    Tsv,
    /// The crew-roster text layout.
    Text,
}

impl RosterFormat {
    /// Returns the lowercase format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RosterFormat::Csv => "csv",
            RosterFormat::Tsv => "tsv",
            RosterFormat::Text => "text",
        }
    }
}

impl fmt::Display for RosterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RosterFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(RosterFormat::Csv),
            "tsv" => Ok(RosterFormat::Tsv),
            "text" | "txt" => Ok(RosterFormat::Text),
            other => Err(EngineError::MalformedInput {
                line: 0,
                message: format!("unknown roster format '{}'", other),
            }),
        }
    }
}

/// Parses roster bytes into duty records.
///
/// # Example
///
/// ```
/// use pilot_pay::roster::{RosterFormat, RosterParser};
///
/// let csv = b"date,flight,departure,arrival,duration\n2024-01-01,101,JFK,LAX,5.5\n";
/// let records = RosterParser::parse(csv, RosterFormat::Csv)?;
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].departure, "JFK");
/// # Ok::<(), pilot_pay::error::EngineError>(())
/// ```
pub struct RosterParser;

impl RosterParser {
    /// Parses `bytes` in the declared `format`.
    ///
    /// Empty or whitespace-only input yields no records. Invalid UTF-8 is
    /// replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` with the offending line for a missing
    /// required column, an unparsable date or duration, a negative duration,
    /// or a text-roster leg without block times.
    pub fn parse(bytes: &[u8], format: RosterFormat) -> EngineResult<Vec<DutyRecord>> {
        let content = String::from_utf8_lossy(bytes);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = match format {
            RosterFormat::Csv => tabular::parse(&content, b',')?,
            RosterFormat::Tsv => tabular::parse(&content, b'\t')?,
            RosterFormat::Text => text::parse(&content)?,
        };

        info!(format = %format, records = records.len(), "Roster parsed");
        Ok(records)
    }
}

/// Parses a `YYYY-MM` month selector into (year, month).
///
/// # Example
///
/// ```
/// use pilot_pay::roster::parse_month;
///
/// assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
/// assert!(parse_month("2024-13").is_err());
/// ```
pub fn parse_month(raw: &str) -> EngineResult<(i32, u32)> {
    let invalid = || EngineError::MalformedInput {
        line: 0,
        message: format!("invalid month '{}', expected YYYY-MM", raw),
    };

    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Keeps the records dated within the given calendar month.
pub fn filter_month(records: Vec<DutyRecord>, year: i32, month: u32) -> Vec<DutyRecord> {
    records
        .into_iter()
        .filter(|record| record.date.year() == year && record.date.month() == month)
        .collect()
}

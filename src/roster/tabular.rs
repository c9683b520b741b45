//! Delimited (CSV/TSV) roster reader.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{DutyKind, DutyRecord};

use super::fields::{
    DEFAULT_AIRPORT_DUTY_HOURS, classify_duty_code, classify_flight, is_truthy, malformed,
    parse_code, parse_date, parse_duration,
};

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    date: usize,
    flight: usize,
    departure: usize,
    arrival: usize,
    duration: usize,
    positioning: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> EngineResult<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();
        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));
        let require = |column: &str, aliases: &[&str]| {
            find(aliases).ok_or_else(|| malformed(1, format!("missing required column '{}'", column)))
        };

        Ok(Self {
            date: require("date", &["date"])?,
            flight: require("flight", &["flight", "flight_number"])?,
            departure: require("departure", &["departure", "dep", "origin"])?,
            arrival: require("arrival", &["arrival", "arr", "destination"])?,
            duration: require("duration", &["duration", "hours", "block_hours"])?,
            positioning: find(&["positioning"]),
        })
    }
}

/// Parses a delimited roster with a header row.
pub(super) fn parse(text: &str, delimiter: u8) -> EngineResult<Vec<DutyRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| malformed(1, e.to_string()))?
        .clone();
    let columns = Columns::resolve(&headers)?;
    debug!(?columns, "Roster header resolved");

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or_default();
            malformed(line, e.to_string())
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let flight_raw = field(columns.flight);
        if flight_raw.is_empty() {
            return Err(malformed(line, "missing flight number"));
        }
        let date = parse_date(field(columns.date), line)?;

        if let Some(kind) = classify_duty_code(flight_raw) {
            records.push(DutyRecord {
                row: records.len() + 1,
                date,
                flight_number: flight_raw.to_ascii_uppercase(),
                departure: String::new(),
                arrival: String::new(),
                duration_hours: ground_duration(field(columns.duration), kind, line)?,
                kind,
                landing_at: None,
            });
            continue;
        }

        let positioning = columns.positioning.is_some_and(|idx| is_truthy(field(idx)));
        let (flight_number, kind) = classify_flight(flight_raw, positioning);

        records.push(DutyRecord {
            row: records.len() + 1,
            date,
            flight_number,
            departure: parse_code(field(columns.departure), "departure", line)?,
            arrival: parse_code(field(columns.arrival), "arrival", line)?,
            duration_hours: parse_duration(field(columns.duration), line)?,
            kind,
            landing_at: None,
        });
    }

    Ok(records)
}

/// Duration of a duty-code row; a blank cell means none, or the default
/// length for an airport duty.
fn ground_duration(raw: &str, kind: DutyKind, line: usize) -> EngineResult<Decimal> {
    match (raw.is_empty(), kind) {
        (true, DutyKind::AirportDuty) => Ok(Decimal::from(DEFAULT_AIRPORT_DUTY_HOURS)),
        (true, _) => Ok(Decimal::ZERO),
        (false, _) => parse_duration(raw, line),
    }
}

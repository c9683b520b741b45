//! Crew-roster text layout reader.
//!
//! A text roster is a sequence of day blocks. Each block starts with a
//! `DD/MM/YYYY <Dow>` line and holds flight legs such as
//! `EJU1234 [320] *MXP - FCO A06:05 - A07:15`, crew listings and non-flight
//! day codes. Reading stops at the statistics footer.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{DutyKind, DutyRecord};

use super::fields::{
    DEFAULT_AIRPORT_DUTY_HOURS, classify_duty_code, classify_flight, malformed, minutes_to_hours,
};

const FOOTER: &str = "Total Hours and Statistics";
const CREW_PREFIXES: [&str; 4] = ["CP ", "FO ", "FA ", "PU "];
const MINUTES_PER_DAY: u32 = 24 * 60;

fn day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}/\d{2}/\d{4})\s+\w+").expect("text roster: invalid day regex")
    })
}

fn leg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([A-Z0-9]+)\s*(?:\[(\w+)\])?\s*(\*?)\s*([A-Z]{3})\s*-\s*([A-Z]{3})")
            .expect("text roster: invalid leg regex")
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"A?(\d{2}):(\d{2})\S*\s*-\s*A?(\d{2}):(\d{2})")
            .expect("text roster: invalid time regex")
    })
}

/// What one day block has collected so far.
struct DayBlock {
    date: NaiveDate,
    legs: usize,
    /// Duty codes in order of appearance.
    codes: Vec<(String, DutyKind)>,
    /// First time range on a line without legs, as (start, end) minutes.
    duty_window: Option<(u32, u32)>,
}

impl DayBlock {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            legs: 0,
            codes: Vec::new(),
            duty_window: None,
        }
    }

    /// Emits the block's non-flight entries.
    ///
    /// A day without legs becomes one entry for its first duty code. A
    /// flight day keeps only the training codes it carries.
    fn close(self, records: &mut Vec<DutyRecord>) {
        let entries: Vec<&(String, DutyKind)> = if self.legs == 0 {
            self.codes.first().into_iter().collect()
        } else {
            self.codes
                .iter()
                .filter(|(_, kind)| *kind == DutyKind::Training)
                .collect()
        };

        for (code, kind) in entries {
            let window_hours = self
                .duty_window
                .map(|(start, end)| minutes_to_hours(end - start));
            let duration_hours = match kind {
                DutyKind::AirportDuty => {
                    window_hours.unwrap_or_else(|| Decimal::from(DEFAULT_AIRPORT_DUTY_HOURS))
                }
                DutyKind::Training if self.legs == 0 => window_hours.unwrap_or_default(),
                _ => Decimal::ZERO,
            };
            records.push(DutyRecord {
                row: records.len() + 1,
                date: self.date,
                flight_number: code.clone(),
                departure: String::new(),
                arrival: String::new(),
                duration_hours,
                kind: *kind,
                landing_at: None,
            });
        }
    }
}

/// Parses a text roster into duty records numbered in entry order.
pub(super) fn parse(text: &str) -> EngineResult<Vec<DutyRecord>> {
    let mut records = Vec::new();
    let mut block: Option<DayBlock> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.starts_with(FOOTER) {
            debug!(line = line_no, "Reached roster statistics footer");
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = day_pattern().captures(line) {
            let date = NaiveDate::parse_from_str(&caps[1], "%d/%m/%Y")
                .map_err(|_| malformed(line_no, format!("invalid date '{}'", &caps[1])))?;
            if let Some(done) = block.replace(DayBlock::new(date)) {
                done.close(&mut records);
            }
        }

        // Lines before the first day block are preamble.
        let Some(day) = block.as_mut() else {
            continue;
        };
        if CREW_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            continue;
        }

        let times: Vec<_> = time_pattern().captures_iter(line).collect();
        let legs: Vec<_> = leg_pattern().captures_iter(line).collect();

        if legs.is_empty() {
            for token in line.split_whitespace() {
                if let Some(kind) = classify_duty_code(token) {
                    day.codes.push((token.to_ascii_uppercase(), kind));
                }
            }
            if day.duty_window.is_none() {
                if let Some(time) = times.first() {
                    let start = minute_of_day(&time[1], &time[2], line_no)?;
                    let end = minute_of_day(&time[3], &time[4], line_no)?;
                    day.duty_window = Some((start, past(start, end)));
                }
            }
            continue;
        }

        for (leg_idx, leg) in legs.iter().enumerate() {
            let Some(time) = times.get(leg_idx) else {
                return Err(malformed(
                    line_no,
                    format!("flight leg '{}' has no block times", &leg[0]),
                ));
            };

            let takeoff = minute_of_day(&time[1], &time[2], line_no)?;
            let landing = past(takeoff, minute_of_day(&time[3], &time[4], line_no)?);

            let (flight_number, kind) = classify_flight(&leg[1], !leg[3].is_empty());
            records.push(DutyRecord {
                row: records.len() + 1,
                date: day.date,
                flight_number,
                departure: leg[4].to_string(),
                arrival: leg[5].to_string(),
                duration_hours: minutes_to_hours(landing - takeoff),
                kind,
                landing_at: Some(landing_time(day.date, landing)),
            });
            day.legs += 1;
        }
    }

    if let Some(done) = block {
        done.close(&mut records);
    }

    Ok(records)
}

/// Parses `HH`/`MM` captures into minutes past midnight.
fn minute_of_day(hour: &str, minute: &str, line: usize) -> EngineResult<u32> {
    let (h, m): (u32, u32) = (
        hour.parse().unwrap_or(u32::MAX),
        minute.parse().unwrap_or(u32::MAX),
    );
    if h >= 24 || m >= 60 {
        return Err(malformed(
            line,
            format!("invalid block time '{}:{}'", hour, minute),
        ));
    }
    Ok(h * 60 + m)
}

/// Moves `end` into the next day when it does not follow `start`.
fn past(start: u32, end: u32) -> u32 {
    if end <= start {
        end + MINUTES_PER_DAY
    } else {
        end
    }
}

/// The landing instant for a leg starting on `date`, `minutes` after its
/// midnight.
fn landing_time(date: NaiveDate, minutes: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minutes))
}

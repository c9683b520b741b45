//! Field-level parsing shared by the tabular and text roster readers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::models::DutyKind;

/// Date layouts accepted in roster files.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Decimal places kept for hours derived from `H:MM` values.
const HOURS_SCALE: u32 = 4;

/// Longest duration a single roster entry may carry.
pub const MAX_DUTY_HOURS: u32 = 24;

/// Hours assumed for an airport duty whose times are not given.
pub const DEFAULT_AIRPORT_DUTY_HOURS: u32 = 6;

pub(crate) fn malformed(line: usize, message: impl Into<String>) -> EngineError {
    EngineError::MalformedInput {
        line,
        message: message.into(),
    }
}

/// Parses a roster date in `YYYY-MM-DD` or `DD/MM/YYYY` form.
pub fn parse_date(raw: &str, line: usize) -> EngineResult<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| malformed(line, format!("invalid date '{}'", raw)))
}

/// Parses a duty duration in hours.
///
/// Accepts `5.5`, `5,5`, `5.5h` and `5:30`. Negative values and values
/// above [`MAX_DUTY_HOURS`] are rejected.
///
/// # Example
///
/// ```
/// use pilot_pay::roster::parse_duration;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_duration("5:30", 1).unwrap(), Decimal::new(55, 1));
/// assert_eq!(parse_duration("5,5", 1).unwrap(), Decimal::new(55, 1));
/// ```
pub fn parse_duration(raw: &str, line: usize) -> EngineResult<Decimal> {
    let trimmed = raw.trim();
    let value = trimmed
        .strip_suffix(['h', 'H'])
        .unwrap_or(trimmed)
        .trim();
    let invalid = || malformed(line, format!("invalid duration '{}'", trimmed));

    let hours = match value.split_once(':') {
        Some((h, m)) => {
            let hours: u32 = h.trim().parse().map_err(|_| invalid())?;
            let minutes: u32 = m.trim().parse().map_err(|_| invalid())?;
            if minutes >= 60 {
                return Err(invalid());
            }
            let total = hours
                .checked_mul(60)
                .and_then(|m| m.checked_add(minutes))
                .ok_or_else(invalid)?;
            minutes_to_hours(total)
        }
        None => Decimal::from_str(&value.replace(',', ".")).map_err(|_| invalid())?,
    };

    if hours.is_sign_negative() && !hours.is_zero() {
        return Err(malformed(
            line,
            format!("negative duration '{}'", trimmed),
        ));
    }

    if hours > Decimal::from(MAX_DUTY_HOURS) {
        return Err(malformed(
            line,
            format!("duration '{}' exceeds {} hours", trimmed, MAX_DUTY_HOURS),
        ));
    }

    Ok(hours)
}

/// Converts whole minutes to hours.
pub(crate) fn minutes_to_hours(minutes: u32) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60)).round_dp(HOURS_SCALE)
}

/// Normalises an airport code; blank codes are malformed.
pub(crate) fn parse_code(raw: &str, column: &str, line: usize) -> EngineResult<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(malformed(line, format!("missing {} airport", column)));
    }
    Ok(code)
}

/// Splits a raw flight number into the stored number and the duty kind.
///
/// A leading `*` marks positioning and is stripped. Flight numbers starting
/// with `TAXI` are ground transfers regardless of the positioning flag.
pub fn classify_flight(raw: &str, positioning: bool) -> (String, DutyKind) {
    let raw = raw.trim();
    let (number, starred) = match raw.strip_prefix('*') {
        Some(rest) => (rest.trim(), true),
        None => (raw, false),
    };
    let number = number.to_ascii_uppercase();

    let kind = if number.starts_with("TAXI") {
        DutyKind::Taxi
    } else if positioning || starred {
        DutyKind::Positioning
    } else {
        DutyKind::Operating
    };

    (number, kind)
}

/// Maps a roster duty code to the kind of non-flight entry it denotes.
///
/// Returns `None` for anything that is not a known duty code, which the
/// callers treat as a flight number.
///
/// ```
/// use pilot_pay::models::DutyKind;
/// use pilot_pay::roster::classify_duty_code;
///
/// assert_eq!(classify_duty_code("adty"), Some(DutyKind::AirportDuty));
/// assert_eq!(classify_duty_code("EJU1234"), None);
/// ```
pub fn classify_duty_code(raw: &str) -> Option<DutyKind> {
    let kind = match raw.trim().to_ascii_uppercase().as_str() {
        "ADTY" => DutyKind::AirportDuty,
        "PSBL" | "PSBE" | "ESBY" | "CSBE" | "CSBL" | "LSBY" => DutyKind::Standby,
        "SIM" | "SIMI" | "M2D1" | "G/S" | "LTGI" => DutyKind::Training,
        "LVE" => DutyKind::Leave,
        "REST" => DutyKind::RestDay,
        "GDO" | "D/O" | "W/DO" | "WD/O" => DutyKind::DayOff,
        _ => return None,
    };
    Some(kind)
}

/// Returns true for positioning-column values that mean "yes".
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15", 1).unwrap(), expected);
        assert_eq!(parse_date(" 15/03/2024 ", 1).unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        match parse_date("March 15", 7) {
            Err(EngineError::MalformedInput { line, message }) => {
                assert_eq!(line, 7);
                assert!(message.contains("March 15"));
            }
            other => panic!("Expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_duration_variants() {
        assert_eq!(parse_duration("5.5", 1).unwrap(), dec("5.5"));
        assert_eq!(parse_duration("5,5", 1).unwrap(), dec("5.5"));
        assert_eq!(parse_duration("5.5h", 1).unwrap(), dec("5.5"));
        assert_eq!(parse_duration("5:30", 1).unwrap(), dec("5.5"));
        assert_eq!(parse_duration("1:20", 1).unwrap(), dec("1.3333"));
        assert_eq!(parse_duration("0", 1).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_negative() {
        match parse_duration("-2", 3) {
            Err(EngineError::MalformedInput { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("negative"));
            }
            other => panic!("Expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_duration_rejects_bad_minutes() {
        assert!(parse_duration("5:75", 1).is_err());
        assert!(parse_duration("abc", 1).is_err());
        assert!(parse_duration("", 1).is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflowing_hours() {
        for raw in ["99999999:00", "4294967295:59"] {
            match parse_duration(raw, 2) {
                Err(EngineError::MalformedInput { line, .. }) => assert_eq!(line, 2),
                other => panic!("Expected MalformedInput for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_parse_duration_bounded_to_one_day() {
        assert_eq!(parse_duration("24", 1).unwrap(), dec("24"));
        assert_eq!(parse_duration("24:00", 1).unwrap(), dec("24"));

        for raw in ["25", "24:01", "1000000000000000000000000000"] {
            match parse_duration(raw, 5) {
                Err(EngineError::MalformedInput { line, message }) => {
                    assert_eq!(line, 5);
                    assert!(message.contains("exceeds 24 hours"), "{}", message);
                }
                other => panic!("Expected MalformedInput for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_classify_duty_code() {
        assert_eq!(classify_duty_code("ADTY"), Some(DutyKind::AirportDuty));
        assert_eq!(classify_duty_code("psbl"), Some(DutyKind::Standby));
        assert_eq!(classify_duty_code("LSBY"), Some(DutyKind::Standby));
        assert_eq!(classify_duty_code("M2D1"), Some(DutyKind::Training));
        assert_eq!(classify_duty_code("G/S"), Some(DutyKind::Training));
        assert_eq!(classify_duty_code("LVE"), Some(DutyKind::Leave));
        assert_eq!(classify_duty_code("REST"), Some(DutyKind::RestDay));
        assert_eq!(classify_duty_code(" w/do "), Some(DutyKind::DayOff));
        assert_eq!(classify_duty_code("TAXI1"), None);
        assert_eq!(classify_duty_code("*EJU1234"), None);
    }

    #[test]
    fn test_classify_flight() {
        assert_eq!(
            classify_flight("EJU1234", false),
            ("EJU1234".to_string(), DutyKind::Operating)
        );
        assert_eq!(
            classify_flight("*EJU1234", false),
            ("EJU1234".to_string(), DutyKind::Positioning)
        );
        assert_eq!(
            classify_flight("EJU1234", true),
            ("EJU1234".to_string(), DutyKind::Positioning)
        );
        assert_eq!(
            classify_flight("taxi1", true),
            ("TAXI1".to_string(), DutyKind::Taxi)
        );
    }

    #[test]
    fn test_is_truthy() {
        for value in ["true", "YES", "y", "1", " x "] {
            assert!(is_truthy(value), "{} should be truthy", value);
        }
        for value in ["", "no", "0", "false"] {
            assert!(!is_truthy(value), "{} should be falsy", value);
        }
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(" jfk ", "departure", 1).unwrap(), "JFK");
        assert!(parse_code("  ", "arrival", 1).is_err());
    }
}

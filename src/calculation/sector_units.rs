//! Distance-banded sector units.
//!
//! Per-sector pay converts the great-circle distance of a duty into sector
//! units using the configured bands. A band covers distances strictly above
//! its lower bound up to and including its upper bound. Ground duties have
//! no distance and earn configured nominal units instead.

use rust_decimal::Decimal;

use crate::config::{NominalSectors, SectorBand};
use crate::models::{DutyKind, DutyRecord};

/// Distances below this many nautical miles earn no sector units.
pub const MIN_SECTOR_DISTANCE_NM: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Converts a great-circle distance in nautical miles to a rounded decimal.
///
/// Distances are kept to one decimal place so that band and rule boundaries
/// compare against the same value shown in exports.
pub fn distance_to_decimal(distance_nm: f64) -> Decimal {
    Decimal::from_f64_retain(distance_nm)
        .unwrap_or_default()
        .round_dp(1)
}

/// Returns the sector units for a distance.
///
/// Returns zero when the distance is below [`MIN_SECTOR_DISTANCE_NM`] or no
/// band covers it.
///
/// # Example
///
/// ```
/// use pilot_pay::calculation::sector_units;
/// use pilot_pay::config::SectorBand;
/// use rust_decimal::Decimal;
///
/// let bands = vec![
///     SectorBand { above_nm: Decimal::ZERO, up_to_nm: Some(Decimal::from(400)), sectors: Decimal::new(8, 1) },
///     SectorBand { above_nm: Decimal::from(400), up_to_nm: None, sectors: Decimal::new(12, 1) },
/// ];
/// assert_eq!(sector_units(Decimal::from(400), &bands), Decimal::new(8, 1));
/// assert_eq!(sector_units(Decimal::new(4001, 1), &bands), Decimal::new(12, 1));
/// ```
pub fn sector_units(distance_nm: Decimal, bands: &[SectorBand]) -> Decimal {
    if distance_nm < MIN_SECTOR_DISTANCE_NM {
        return Decimal::ZERO;
    }

    bands
        .iter()
        .find(|band| {
            distance_nm > band.above_nm && band.up_to_nm.is_none_or(|upper| distance_nm <= upper)
        })
        .map(|band| band.sectors)
        .unwrap_or(Decimal::ZERO)
}

/// Returns the nominal sector units of a ground duty.
///
/// Airport duties earn the short value up to the split length and the long
/// value past it; training earns a flat value. Other kinds earn nothing.
pub fn nominal_sectors(record: &DutyRecord, nominal: &NominalSectors) -> Decimal {
    match record.kind {
        DutyKind::AirportDuty if record.duration_hours <= nominal.airport_duty_split_hours => {
            nominal.airport_duty_short
        }
        DutyKind::AirportDuty => nominal.airport_duty_long,
        DutyKind::Training => nominal.training,
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bands() -> Vec<SectorBand> {
        let band = |above: &str, up_to: Option<&str>, sectors: &str| SectorBand {
            above_nm: dec(above),
            up_to_nm: up_to.map(dec),
            sectors: dec(sectors),
        };
        vec![
            band("0", Some("400"), "0.8"),
            band("400", Some("1000"), "1.2"),
            band("1000", Some("1500"), "1.5"),
            band("1500", None, "2.5"),
        ]
    }

    #[test]
    fn test_band_boundaries() {
        let bands = bands();
        assert_eq!(sector_units(dec("0.1"), &bands), dec("0.8"));
        assert_eq!(sector_units(dec("400"), &bands), dec("0.8"));
        assert_eq!(sector_units(dec("400.1"), &bands), dec("1.2"));
        assert_eq!(sector_units(dec("1000"), &bands), dec("1.2"));
        assert_eq!(sector_units(dec("1500"), &bands), dec("1.5"));
        assert_eq!(sector_units(dec("2144"), &bands), dec("2.5"));
    }

    #[test]
    fn test_negligible_distance_is_zero() {
        assert_eq!(sector_units(dec("0.05"), &bands()), Decimal::ZERO);
        assert_eq!(sector_units(Decimal::ZERO, &bands()), Decimal::ZERO);
    }

    #[test]
    fn test_no_bands_is_zero() {
        assert_eq!(sector_units(dec("500"), &[]), Decimal::ZERO);
    }

    #[test]
    fn test_distance_to_decimal_rounds() {
        assert_eq!(distance_to_decimal(2144.567), dec("2144.6"));
        assert_eq!(distance_to_decimal(0.0), Decimal::ZERO);
    }

    #[test]
    fn test_nominal_sectors() {
        let record = |kind: DutyKind, hours: &str| DutyRecord {
            row: 1,
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            flight_number: "ADTY".to_string(),
            departure: String::new(),
            arrival: String::new(),
            duration_hours: dec(hours),
            kind,
            landing_at: None,
        };
        let nominal = NominalSectors::default();

        assert_eq!(nominal_sectors(&record(DutyKind::AirportDuty, "4"), &nominal), dec("1"));
        assert_eq!(nominal_sectors(&record(DutyKind::AirportDuty, "4.5"), &nominal), dec("2"));
        assert_eq!(nominal_sectors(&record(DutyKind::Training, "0"), &nominal), dec("4"));
        assert_eq!(nominal_sectors(&record(DutyKind::Standby, "6"), &nominal), Decimal::ZERO);
    }
}

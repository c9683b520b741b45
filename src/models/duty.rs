//! Duty record model.
//!
//! A [`DutyRecord`] is one entry taken from a parsed roster: a flight
//! segment, a ground duty such as airport standby or simulator training, or
//! a calendar day such as leave or a day off.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DutyRef;

/// What a roster entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyKind {
    /// An operating sector flown as crew.
    Operating,
    /// A positioning (deadhead) sector flown as a passenger.
    Positioning,
    /// A ground taxi transfer between airports.
    Taxi,
    /// Airport standby duty (`ADTY`).
    AirportDuty,
    /// Simulator or ground training (`SIM`, `SIMI`, `M2D1`, `G/S`, `LTGI`).
    Training,
    /// Home or crewing standby (`PSBL`, `PSBE`, `ESBY`, `CSBE`, `CSBL`, `LSBY`).
    Standby,
    /// Annual leave (`LVE`).
    Leave,
    /// Rest day away from base (`REST`).
    RestDay,
    /// Day off (`GDO`, `D/O`, `W/DO`, `WD/O`).
    DayOff,
}

impl DutyKind {
    /// Returns the lowercase label used in exports and rule conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            DutyKind::Operating => "operating",
            DutyKind::Positioning => "positioning",
            DutyKind::Taxi => "taxi",
            DutyKind::AirportDuty => "airport_duty",
            DutyKind::Training => "training",
            DutyKind::Standby => "standby",
            DutyKind::Leave => "leave",
            DutyKind::RestDay => "rest_day",
            DutyKind::DayOff => "day_off",
        }
    }

    /// Returns true for movements between two airports.
    pub fn is_flight(&self) -> bool {
        matches!(
            self,
            DutyKind::Operating | DutyKind::Positioning | DutyKind::Taxi
        )
    }

    /// Returns true for entries that are priced by a salary rule.
    ///
    /// Standby, leave, rest days and days off only feed day-level
    /// allowances.
    pub fn is_priced(&self) -> bool {
        self.is_flight() || matches!(self, DutyKind::AirportDuty | DutyKind::Training)
    }
}

/// One entry of a parsed roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyRecord {
    /// 1-based data row (tabular rosters) or entry ordinal (text rosters).
    pub row: usize,
    /// The date the duty starts.
    pub date: NaiveDate,
    /// The flight number without any positioning marker, or the duty code
    /// for ground and calendar entries.
    pub flight_number: String,
    /// Departure airport code, upper-cased. Empty for ground duties.
    pub departure: String,
    /// Arrival airport code, upper-cased. Empty for ground duties.
    pub arrival: String,
    /// Duty duration in hours.
    pub duration_hours: Decimal,
    /// What the entry represents.
    pub kind: DutyKind,
    /// Local landing time, when the roster carries block times.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_at: Option<NaiveDateTime>,
}

impl DutyRecord {
    /// Returns the identifying fields carried into pay line items and exports.
    pub fn duty_ref(&self) -> DutyRef {
        DutyRef {
            row: self.row,
            date: self.date,
            flight_number: self.flight_number.clone(),
            departure: self.departure.clone(),
            arrival: self.arrival.clone(),
            kind: self.kind,
            landing_at: self.landing_at,
        }
    }
}

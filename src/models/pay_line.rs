//! Pay line items and per-record issues.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::DutyKind;

/// The identifying fields of the duty a line item or issue refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyRef {
    /// The roster row of the duty.
    pub row: usize,
    /// The date of the duty.
    pub date: NaiveDate,
    /// The flight number.
    pub flight_number: String,
    /// Departure airport code.
    pub departure: String,
    /// Arrival airport code.
    pub arrival: String,
    /// What the duty was.
    pub kind: DutyKind,
    /// Local landing time, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_at: Option<NaiveDateTime>,
}

/// How the amount of a line item was derived.
///
/// # Example
///
/// ```
/// use pilot_pay::models::PayBasis;
///
/// assert_eq!(PayBasis::PerSector.as_str(), "per_sector");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayBasis {
    /// Duty hours multiplied by an hourly rate.
    Hourly,
    /// A fixed amount per duty.
    Fixed,
    /// Distance-banded sector units multiplied by a sector value.
    PerSector,
}

impl PayBasis {
    /// Returns the snake_case label used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayBasis::Hourly => "hourly",
            PayBasis::Fixed => "fixed",
            PayBasis::PerSector => "per_sector",
        }
    }
}

/// The computed pay for one duty.
///
/// `amount` is rounded to cents and includes any overtime premium on
/// `overtime_units`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLineItem {
    /// The duty this line item was computed for.
    pub duty: DutyRef,
    /// The id of the salary rule applied.
    pub rule_id: String,
    /// The human-readable name of the salary rule applied.
    pub rule_name: String,
    /// How the amount was derived.
    pub basis: PayBasis,
    /// Duty hours.
    pub hours: Decimal,
    /// Great-circle distance between the airports in nautical miles.
    pub distance_nm: Decimal,
    /// Units paid: hours, sectors, or 1 for a fixed amount.
    pub units: Decimal,
    /// Amount per unit.
    pub rate: Decimal,
    /// Hours (hourly basis) or sectors (per-sector basis) paid at the
    /// overtime multiplier.
    pub overtime_units: Decimal,
    /// The total amount for this duty.
    pub amount: Decimal,
    /// Reference to the agreement clause behind the rule.
    pub clause_ref: String,
}

/// A per-record condition that prevented a duty from being priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayIssueKind {
    /// An airport code on the duty is not in the directory.
    UnresolvedAirport {
        /// The unresolved code.
        code: String,
    },
    /// No salary rule matched the duty.
    NoApplicableRule,
    /// The priced amount does not fit in the decimal range.
    AmountOverflow,
}

impl PayIssueKind {
    /// Returns the snake_case label used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayIssueKind::UnresolvedAirport { .. } => "unresolved_airport",
            PayIssueKind::NoApplicableRule => "no_applicable_rule",
            PayIssueKind::AmountOverflow => "amount_overflow",
        }
    }
}

/// A duty that could not be priced, reported alongside the priced items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayIssue {
    /// The roster row of the duty.
    pub row: usize,
    /// The date of the duty.
    pub date: NaiveDate,
    /// The flight number of the duty.
    pub flight_number: String,
    /// What went wrong.
    pub kind: PayIssueKind,
}

impl From<&PayIssue> for EngineError {
    fn from(issue: &PayIssue) -> Self {
        match &issue.kind {
            PayIssueKind::UnresolvedAirport { code } => {
                EngineError::UnresolvedAirport { code: code.clone() }
            }
            PayIssueKind::NoApplicableRule => EngineError::NoApplicableRule {
                row: issue.row,
                flight_number: issue.flight_number.clone(),
            },
            PayIssueKind::AmountOverflow => EngineError::AmountOverflow {
                row: issue.row,
                flight_number: issue.flight_number.clone(),
            },
        }
    }
}

//! Duty pay computation.
//!
//! Turns a duty and its selected rule into a [`PayLineItem`]. Operating
//! duties share an [`Overtime`] state so that hours or sectors past the
//! configured thresholds, counted across the roster in order, earn the
//! overtime multiplier.

use rust_decimal::Decimal;

use crate::config::{OvertimeConfig, RuleRate, SalaryRule};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DutyKind, PayBasis, PayLineItem};

use super::rounding::round_currency;
use super::rule_selection::DutyContext;

/// Running count of overtime-eligible units against one threshold.
///
/// # Example
///
/// ```
/// use pilot_pay::calculation::OvertimeTracker;
/// use rust_decimal::Decimal;
///
/// let mut tracker = OvertimeTracker::new(Some(Decimal::from(10)));
/// assert_eq!(tracker.split(Decimal::from(8)), (Decimal::from(8), Decimal::ZERO));
/// assert_eq!(tracker.split(Decimal::from(4)), (Decimal::from(2), Decimal::from(2)));
/// ```
#[derive(Debug, Clone)]
pub struct OvertimeTracker {
    threshold: Option<Decimal>,
    accumulated: Decimal,
}

impl OvertimeTracker {
    /// Creates a tracker; without a threshold no units are ever overtime.
    pub fn new(threshold: Option<Decimal>) -> Self {
        Self {
            threshold,
            accumulated: Decimal::ZERO,
        }
    }

    /// Records `units` and splits them into (ordinary, overtime).
    ///
    /// The overtime part is exactly `Decimal::ZERO` when nothing crosses the
    /// threshold.
    pub fn split(&mut self, units: Decimal) -> (Decimal, Decimal) {
        let before = self.accumulated;
        self.accumulated = self.accumulated.saturating_add(units);

        let Some(threshold) = self.threshold else {
            return (units, Decimal::ZERO);
        };

        let ordinary = (threshold - before).max(Decimal::ZERO).min(units);
        let extra = units - ordinary;
        if extra.is_zero() {
            (ordinary, Decimal::ZERO)
        } else {
            (ordinary, extra)
        }
    }

    /// Returns the units recorded so far.
    pub fn accumulated(&self) -> Decimal {
        self.accumulated
    }
}

/// Overtime state for a roster: one tracker for hours, one for sectors.
#[derive(Debug, Clone)]
pub struct Overtime {
    hours: OvertimeTracker,
    sectors: OvertimeTracker,
    multiplier: Decimal,
    clause_ref: String,
}

impl Overtime {
    /// Builds the trackers from configuration; without it nothing is overtime.
    pub fn new(config: Option<&OvertimeConfig>) -> Self {
        Self {
            hours: OvertimeTracker::new(config.and_then(|c| c.threshold_hours)),
            sectors: OvertimeTracker::new(config.and_then(|c| c.threshold_sectors)),
            multiplier: config.map(|c| c.multiplier).unwrap_or(Decimal::ONE),
            clause_ref: config.map(|c| c.clause_ref.clone()).unwrap_or_default(),
        }
    }

    /// Returns the overtime rate multiplier.
    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Returns the hours tracker.
    pub fn hours(&self) -> &OvertimeTracker {
        &self.hours
    }

    /// Returns the sectors tracker.
    pub fn sectors(&self) -> &OvertimeTracker {
        &self.sectors
    }
}

/// The priced duty together with its audit step.
#[derive(Debug, Clone)]
pub struct DutyPayResult {
    /// The line item for the duty.
    pub line_item: PayLineItem,
    /// The audit step recording the computation.
    pub audit_step: AuditStep,
}

/// Prices one duty under its selected rule.
///
/// * `hourly`: hours x rate, with hours past the hours threshold at
///   rate x multiplier.
/// * `fixed`: the rule amount.
/// * `per_sector`: sector units x sector value, with sectors past the
///   sectors threshold at value x multiplier.
///
/// Only operating duties under overtime-eligible rules count toward either
/// threshold.
///
/// # Errors
///
/// Returns `AmountOverflow` if the amount does not fit in a decimal.
pub fn calculate_duty_pay(
    ctx: &DutyContext<'_>,
    rule: &SalaryRule,
    sectors: Decimal,
    overtime: &mut Overtime,
    step_number: u32,
) -> EngineResult<DutyPayResult> {
    let record = ctx.record;
    let hours = record.duration_hours;
    let multiplier = overtime.multiplier;
    let operating = record.kind == DutyKind::Operating;

    let overflow = || EngineError::AmountOverflow {
        row: record.row,
        flight_number: record.flight_number.clone(),
    };
    // ordinary x rate + extra x rate x multiplier
    let priced = |ordinary: Decimal, extra: Decimal, rate: Decimal| -> EngineResult<Decimal> {
        let base = ordinary.checked_mul(rate).ok_or_else(overflow)?;
        let premium = extra
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(overflow)?;
        base.checked_add(premium).ok_or_else(overflow)
    };
    let with_overtime = |ordinary: Decimal, extra: Decimal, unit: &str, rate: Decimal| {
        if extra.is_zero() {
            format!("{}{} × {}", ordinary.normalize(), unit, rate.normalize())
        } else {
            format!(
                "{}{} × {} + {}{} overtime × {} × {}",
                ordinary.normalize(),
                unit,
                rate.normalize(),
                extra.normalize(),
                unit,
                rate.normalize(),
                multiplier.normalize()
            )
        }
    };

    let (basis, units, rate, overtime_units, amount, detail) = match &rule.rate {
        RuleRate::Hourly {
            rate,
            overtime_eligible,
        } => {
            let (ordinary, extra) = if *overtime_eligible && operating {
                overtime.hours.split(hours)
            } else {
                (hours, Decimal::ZERO)
            };
            let amount = priced(ordinary, extra, *rate)?;
            let detail = with_overtime(ordinary, extra, "h", *rate);
            (PayBasis::Hourly, hours, *rate, extra, amount, detail)
        }
        RuleRate::Fixed { amount } => (
            PayBasis::Fixed,
            Decimal::ONE,
            *amount,
            Decimal::ZERO,
            *amount,
            format!("fixed {}", amount.normalize()),
        ),
        RuleRate::PerSector {
            value,
            overtime_eligible,
        } => {
            let (ordinary, extra) = if *overtime_eligible && operating {
                overtime.sectors.split(sectors)
            } else {
                (sectors, Decimal::ZERO)
            };
            let amount = priced(ordinary, extra, *value)?;
            let units = with_overtime(ordinary, extra, " sectors", *value);
            let detail = if record.kind.is_flight() {
                format!("{} NM = {}", ctx.distance_nm.normalize(), units)
            } else {
                format!("nominal {}", units)
            };
            (PayBasis::PerSector, sectors, *value, extra, amount, detail)
        }
    };
    let amount = round_currency(amount);

    let mut output = serde_json::json!({
        "basis": basis.as_str(),
        "units": units.to_string(),
        "rate": rate.to_string(),
        "amount": amount.to_string()
    });
    if !overtime_units.is_zero() {
        output["overtime_units"] = serde_json::json!(overtime_units.to_string());
        output["overtime_clause_ref"] = serde_json::json!(overtime.clause_ref);
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        clause_ref: rule.clause_ref.clone(),
        input: serde_json::json!({
            "row": record.row,
            "flight_number": record.flight_number,
            "kind": record.kind.as_str(),
            "hours": hours.to_string(),
            "distance_nm": ctx.distance_nm.to_string(),
            "sectors": sectors.to_string()
        }),
        output,
        reasoning: format!("{} {}: {} = {}", record.date, record.flight_number, detail, amount),
    };

    let line_item = PayLineItem {
        duty: record.duty_ref(),
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        basis,
        hours,
        distance_nm: ctx.distance_nm,
        units,
        rate,
        overtime_units,
        amount,
        clause_ref: rule.clause_ref.clone(),
    };

    Ok(DutyPayResult {
        line_item,
        audit_step,
    })
}

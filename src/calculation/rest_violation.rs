//! Rest violation bonus.
//!
//! When the last flight of date `d` lands within `lead_minutes` of midnight
//! or later, and `d + 1` is a day off or leave, the crew member loses part
//! of the rest day. Landings up to `half_within_minutes` past midnight earn
//! half the configured amount; later landings earn the full amount.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::config::RestViolationConfig;
use crate::models::{AllowancePayment, AuditStep, DutyKind, DutyRef};

use super::rounding::round_currency;
use super::schedule::{by_date, has_kind_on, last_landings};

/// The allowance type recorded for rest violation bonuses.
pub const REST_VIOLATION_TYPE: &str = "rest_violation";

/// Calendar kinds whose rest a late landing cuts into.
const REST_KINDS: [DutyKind; 2] = [DutyKind::DayOff, DutyKind::Leave];

/// One late landing before a rest day.
#[derive(Debug, Clone, PartialEq)]
pub struct RestViolation {
    /// The date of the late flight.
    pub date: NaiveDate,
    /// Minutes into the rest day at landing; negative when landing before
    /// midnight.
    pub minutes_into_rest: i64,
    /// 0.5 or 1.
    pub units: Decimal,
}

/// The result of the rest violation calculation.
#[derive(Debug, Clone)]
pub struct RestViolationResult {
    /// The payment, if configured and at least one violation was found.
    pub allowance: Option<AllowancePayment>,
    /// The violations found.
    pub violations: Vec<RestViolation>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Finds late landings before a day off or leave.
pub fn find_rest_violations(
    schedule: &[DutyRef],
    config: &RestViolationConfig,
) -> Vec<RestViolation> {
    let days = by_date(schedule);

    last_landings(schedule)
        .into_iter()
        .filter_map(|(date, landing)| {
            let next = date.succ_opt()?;
            if !has_kind_on(&days, next, &REST_KINDS) {
                return None;
            }
            let minutes_into_rest = (landing - next.and_time(NaiveTime::MIN)).num_minutes();
            if minutes_into_rest <= -config.lead_minutes {
                return None;
            }
            let units = if minutes_into_rest <= config.half_within_minutes {
                Decimal::new(5, 1)
            } else {
                Decimal::ONE
            };
            Some(RestViolation {
                date,
                minutes_into_rest,
                units,
            })
        })
        .collect()
}

/// Calculates the rest violation bonus over a schedule.
pub fn calculate_rest_violations(
    schedule: &[DutyRef],
    config: Option<&RestViolationConfig>,
    step_number: u32,
) -> RestViolationResult {
    let Some(config) = config else {
        return RestViolationResult {
            allowance: None,
            violations: Vec::new(),
            audit_step: AuditStep {
                step_number,
                rule_id: REST_VIOLATION_TYPE.to_string(),
                rule_name: "Rest Violation Bonus".to_string(),
                clause_ref: String::new(),
                input: serde_json::json!({}),
                output: serde_json::json!({ "configured": false, "amount": "0.00" }),
                reasoning: "No rest violation bonus configured".to_string(),
            },
        };
    };

    let violations = find_rest_violations(schedule, config);
    let units: Decimal = violations.iter().map(|v| v.units).sum();
    let amount = round_currency(units * config.amount);

    let audit_step = AuditStep {
        step_number,
        rule_id: REST_VIOLATION_TYPE.to_string(),
        rule_name: "Rest Violation Bonus".to_string(),
        clause_ref: config.clause_ref.clone(),
        input: serde_json::json!({
            "rate": config.amount.to_string(),
            "lead_minutes": config.lead_minutes,
            "half_within_minutes": config.half_within_minutes
        }),
        output: serde_json::json!({
            "violations": violations
                .iter()
                .map(|v| serde_json::json!({
                    "date": v.date.to_string(),
                    "minutes_into_rest": v.minutes_into_rest,
                    "units": v.units.to_string()
                }))
                .collect::<Vec<_>>(),
            "amount": amount.to_string()
        }),
        reasoning: format!(
            "{} late landings before a rest day, {} units × {} = {}",
            violations.len(),
            units.normalize(),
            config.amount.normalize(),
            amount
        ),
    };

    let allowance = (!violations.is_empty()).then(|| AllowancePayment {
        allowance_type: REST_VIOLATION_TYPE.to_string(),
        description: format!("Rest violations ({})", violations.len()),
        units,
        rate: config.amount,
        amount,
        clause_ref: config.clause_ref.clone(),
    });

    RestViolationResult {
        allowance,
        violations,
        audit_step,
    }
}

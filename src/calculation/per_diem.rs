//! Per-diem allowance.
//!
//! One unit is paid for each distinct date carrying an operating or
//! positioning flight, a training duty or a rest day away from base. A
//! standby or airport duty date also earns a unit when the previous day's
//! last flight landed after midnight.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::config::PerDiemConfig;
use crate::models::{AllowancePayment, AuditStep, DutyKind, DutyRef};

use super::rounding::round_currency;
use super::schedule::{by_date, has_kind_on, last_landings};

/// The allowance type recorded for per-diem payments.
pub const PER_DIEM_TYPE: &str = "per_diem";

/// Duty kinds that make a date a working day.
const WORKING_KINDS: [DutyKind; 4] = [
    DutyKind::Operating,
    DutyKind::Positioning,
    DutyKind::Training,
    DutyKind::RestDay,
];

/// Duty kinds that earn a unit only after a landing past midnight.
const AFTER_MIDNIGHT_KINDS: [DutyKind; 2] = [DutyKind::Standby, DutyKind::AirportDuty];

/// The result of the per-diem calculation.
#[derive(Debug, Clone)]
pub struct PerDiemResult {
    /// The payment, if per-diem is configured and at least one day qualifies.
    pub allowance: Option<AllowancePayment>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates the per-diem allowance over a schedule.
pub fn calculate_per_diem(
    schedule: &[DutyRef],
    config: Option<&PerDiemConfig>,
    step_number: u32,
) -> PerDiemResult {
    let days = by_date(schedule);
    let working_days: BTreeSet<_> = schedule
        .iter()
        .filter(|duty| WORKING_KINDS.contains(&duty.kind))
        .map(|duty| duty.date)
        .collect();
    let after_midnight: BTreeSet<_> = last_landings(schedule)
        .into_iter()
        .filter(|(date, landing)| landing.date() > *date)
        .filter_map(|(date, _)| date.succ_opt())
        .filter(|next| !working_days.contains(next))
        .filter(|next| has_kind_on(&days, *next, &AFTER_MIDNIGHT_KINDS))
        .collect();

    let units = Decimal::from(working_days.len() + after_midnight.len());
    let dates: Vec<String> = working_days.iter().map(ToString::to_string).collect();
    let extra_dates: Vec<String> = after_midnight.iter().map(ToString::to_string).collect();

    let Some(config) = config else {
        return PerDiemResult {
            allowance: None,
            audit_step: AuditStep {
                step_number,
                rule_id: PER_DIEM_TYPE.to_string(),
                rule_name: "Per-Diem Allowance".to_string(),
                clause_ref: String::new(),
                input: serde_json::json!({
                    "working_days": dates,
                    "after_midnight_days": extra_dates
                }),
                output: serde_json::json!({ "configured": false, "amount": "0.00" }),
                reasoning: "No per-diem allowance configured".to_string(),
            },
        };
    };

    let amount = round_currency(units * config.amount);
    let reasoning = if after_midnight.is_empty() {
        format!(
            "{} working days × {} = {}",
            units,
            config.amount.normalize(),
            amount
        )
    } else {
        format!(
            "{} working days + {} standby days after a late landing × {} = {}",
            working_days.len(),
            after_midnight.len(),
            config.amount.normalize(),
            amount
        )
    };
    let audit_step = AuditStep {
        step_number,
        rule_id: PER_DIEM_TYPE.to_string(),
        rule_name: "Per-Diem Allowance".to_string(),
        clause_ref: config.clause_ref.clone(),
        input: serde_json::json!({
            "working_days": dates,
            "after_midnight_days": extra_dates,
            "rate": config.amount.to_string()
        }),
        output: serde_json::json!({
            "units": units.to_string(),
            "amount": amount.to_string()
        }),
        reasoning,
    };

    let allowance = (!units.is_zero()).then(|| AllowancePayment {
        allowance_type: PER_DIEM_TYPE.to_string(),
        description: format!("Per-diem for {} working days", units),
        units,
        rate: config.amount,
        amount,
        clause_ref: config.clause_ref.clone(),
    });

    PerDiemResult {
        allowance,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn duty(day: u32, kind: DutyKind) -> DutyRef {
        DutyRef {
            row: day as usize,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            flight_number: "1".to_string(),
            departure: "MXP".to_string(),
            arrival: "FCO".to_string(),
            kind,
            landing_at: None,
        }
    }

    fn landing(mut duty: DutyRef, day: u32, hour: u32, minute: u32) -> DutyRef {
        duty.landing_at = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0);
        duty
    }

    fn config() -> PerDiemConfig {
        PerDiemConfig {
            amount: dec("46.95"),
            clause_ref: "7.1".to_string(),
        }
    }

    #[test]
    fn test_counts_distinct_working_days() {
        let schedule = vec![
            duty(1, DutyKind::Operating),
            duty(1, DutyKind::Operating),
            duty(2, DutyKind::Positioning),
            duty(3, DutyKind::Taxi),
        ];
        let result = calculate_per_diem(&schedule, Some(&config()), 4);

        let allowance = result.allowance.unwrap();
        assert_eq!(allowance.units, dec("2"));
        assert_eq!(allowance.amount, dec("93.90"));
        assert_eq!(allowance.allowance_type, "per_diem");
        assert_eq!(result.audit_step.step_number, 4);
        assert!(!result.audit_step.reasoning.contains('$'));
    }

    #[test]
    fn test_rest_and_training_days_count() {
        let schedule = vec![
            duty(1, DutyKind::RestDay),
            duty(2, DutyKind::Training),
            duty(3, DutyKind::Leave),
            duty(4, DutyKind::DayOff),
            duty(5, DutyKind::Standby),
            duty(6, DutyKind::AirportDuty),
        ];
        let result = calculate_per_diem(&schedule, Some(&config()), 1);
        assert_eq!(result.allowance.unwrap().units, dec("2"));
    }

    #[test]
    fn test_standby_after_midnight_landing() {
        let schedule = vec![
            landing(duty(1, DutyKind::Operating), 2, 0, 40),
            duty(2, DutyKind::Standby),
            landing(duty(3, DutyKind::Operating), 3, 23, 10),
            duty(4, DutyKind::AirportDuty),
        ];
        let result = calculate_per_diem(&schedule, Some(&config()), 1);

        // Days 1 and 3 fly; day 2 follows a landing at 00:40.
        assert_eq!(result.allowance.unwrap().units, dec("3"));
        assert_eq!(
            result.audit_step.input["after_midnight_days"],
            serde_json::json!(["2024-03-02"])
        );
    }

    #[test]
    fn test_no_days_no_payment() {
        let result = calculate_per_diem(&[duty(1, DutyKind::Taxi)], Some(&config()), 1);
        assert!(result.allowance.is_none());
        assert_eq!(result.audit_step.output["amount"], "0.00");
    }

    #[test]
    fn test_unconfigured() {
        let result = calculate_per_diem(&[duty(1, DutyKind::Operating)], None, 1);
        assert!(result.allowance.is_none());
        assert_eq!(result.audit_step.output["configured"], false);
    }
}

//! Annual leave pay: one unit per distinct leave date.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::config::LeavePayConfig;
use crate::models::{AllowancePayment, AuditStep, DutyKind, DutyRef};

use super::rounding::round_currency;

/// The allowance type recorded for leave pay.
pub const LEAVE_PAY_TYPE: &str = "leave";

/// The result of the leave pay calculation.
#[derive(Debug, Clone)]
pub struct LeavePayResult {
    /// The payment, if configured and the schedule holds leave.
    pub allowance: Option<AllowancePayment>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates leave pay over a schedule.
pub fn calculate_leave_pay(
    schedule: &[DutyRef],
    config: Option<&LeavePayConfig>,
    step_number: u32,
) -> LeavePayResult {
    let leave_days: BTreeSet<_> = schedule
        .iter()
        .filter(|duty| duty.kind == DutyKind::Leave)
        .map(|duty| duty.date)
        .collect();
    let units = Decimal::from(leave_days.len());
    let dates: Vec<String> = leave_days.iter().map(ToString::to_string).collect();

    let (rate, clause_ref) = match config {
        Some(config) => (config.amount, config.clause_ref.clone()),
        None => (Decimal::ZERO, String::new()),
    };
    let amount = round_currency(units * rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: LEAVE_PAY_TYPE.to_string(),
        rule_name: "Annual Leave Pay".to_string(),
        clause_ref: clause_ref.clone(),
        input: serde_json::json!({
            "leave_days": dates,
            "rate": rate.to_string()
        }),
        output: serde_json::json!({
            "units": units.to_string(),
            "amount": amount.to_string()
        }),
        reasoning: match config {
            Some(_) => format!("{} leave days × {} = {}", units, rate.normalize(), amount),
            None => "No leave pay configured".to_string(),
        },
    };

    let allowance = (config.is_some() && !leave_days.is_empty()).then(|| AllowancePayment {
        allowance_type: LEAVE_PAY_TYPE.to_string(),
        description: format!("Annual leave ({} days)", units),
        units,
        rate,
        amount,
        clause_ref,
    });

    LeavePayResult {
        allowance,
        audit_step,
    }
}

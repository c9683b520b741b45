//! Calculation result models for the pilot pay engine.
//!
//! This module contains the [`CalculationResult`] type and its associated structures
//! that capture all outputs from a pay calculation, including pay line items,
//! per-record issues, allowances, totals, and audit traces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DutyRef, PayIssue, PayLineItem};

/// Represents an allowance payment.
///
/// Allowances are paid on top of duty pay: per-diem per working day,
/// night stops away from base, leave pay, rest violations and fixed monthly
/// components.
///
/// # Example
///
/// ```
/// use pilot_pay::models::AllowancePayment;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let allowance = AllowancePayment {
///     allowance_type: "per_diem".to_string(),
///     description: "Daily allowance".to_string(),
///     units: Decimal::from_str("3").unwrap(),
///     rate: Decimal::from_str("46.95").unwrap(),
///     amount: Decimal::from_str("140.85").unwrap(),
///     clause_ref: "7.1".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowancePayment {
    /// The type of allowance (e.g., "per_diem", "night_stop", "fixed").
    #[serde(rename = "type")]
    pub allowance_type: String,
    /// A description of the allowance.
    pub description: String,
    /// The number of units (e.g., days, night stops).
    pub units: Decimal,
    /// The rate per unit.
    pub rate: Decimal,
    /// The total amount for this allowance.
    pub amount: Decimal,
    /// Reference to the agreement clause that justifies this allowance.
    pub clause_ref: String,
}

/// An estimate of take-home pay after contributions and income tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetEstimate {
    /// Social contributions withheld from gross pay.
    pub contributions: Decimal,
    /// Gross pay less contributions.
    pub taxable_income: Decimal,
    /// Progressive income tax on the taxable income.
    pub income_tax: Decimal,
    /// Taxable income less income tax.
    pub net_pay: Decimal,
}

/// Aggregated totals for a pay calculation.
///
/// # Example
///
/// ```
/// use pilot_pay::models::PayTotals;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let totals = PayTotals {
///     duty_pay: Decimal::from_str("275.00").unwrap(),
///     allowances_total: Decimal::from_str("46.95").unwrap(),
///     gross_pay: Decimal::from_str("321.95").unwrap(),
///     duty_hours: Decimal::from_str("5.5").unwrap(),
///     overtime_hours: Decimal::ZERO,
///     overtime_sectors: Decimal::ZERO,
///     net_estimate: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTotals {
    /// Sum of all pay line item amounts.
    pub duty_pay: Decimal,
    /// Total value of all allowances.
    pub allowances_total: Decimal,
    /// The total gross pay (duty pay plus allowances).
    pub gross_pay: Decimal,
    /// Total hours across priced duties.
    pub duty_hours: Decimal,
    /// Total hours paid at the overtime multiplier.
    pub overtime_hours: Decimal,
    /// Total sectors paid at the overtime multiplier.
    #[serde(default)]
    pub overtime_sectors: Decimal,
    /// Net pay estimate, present when deductions are configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_estimate: Option<NetEstimate>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the agreement clause for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings mirror the per-record issues so the audit trace reads on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a pay calculation.
///
/// Priced duties appear in `line_items`; duties that could not be priced
/// appear in `issues`. Standby, leave, rest and off days appear in
/// `calendar`. A roster never aborts because of a single bad row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The name of the pay scheme used.
    pub scheme: String,
    /// One line item per priced duty, in roster order.
    pub line_items: Vec<PayLineItem>,
    /// Duties that could not be priced, in roster order.
    pub issues: Vec<PayIssue>,
    /// Unpriced calendar entries, in roster order.
    #[serde(default)]
    pub calendar: Vec<DutyRef>,
    /// Allowance payments included in the calculation.
    pub allowances: Vec<AllowancePayment>,
    /// Aggregated totals for the calculation.
    pub totals: PayTotals,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// Returns true if every duty in the roster was priced.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

//! Net pay estimate.
//!
//! Contributions are withheld from gross pay at a flat rate; the remainder
//! is taxed progressively across the configured brackets.

use rust_decimal::Decimal;

use crate::config::{DeductionsConfig, TaxBracket};
use crate::models::{AuditStep, NetEstimate};

use super::rounding::round_currency;

/// The result of estimating net pay.
#[derive(Debug, Clone)]
pub struct NetEstimateResult {
    /// The estimate.
    pub estimate: NetEstimate,
    /// The audit step recording the estimate.
    pub audit_step: AuditStep,
}

/// Computes progressive income tax on `taxable`.
///
/// Each bracket taxes the part of the income between the previous bracket's
/// upper bound and its own. Brackets must be ascending with an unbounded top.
///
/// # Example
///
/// ```
/// use pilot_pay::calculation::progressive_tax;
/// use pilot_pay::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket { up_to: Some(Decimal::from(1000)), rate: Decimal::new(10, 2) },
///     TaxBracket { up_to: None, rate: Decimal::new(20, 2) },
/// ];
/// assert_eq!(progressive_tax(Decimal::from(1500), &brackets), Decimal::from(200));
/// ```
pub fn progressive_tax(taxable: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        if taxable <= lower {
            break;
        }
        let upper = bracket.up_to.map_or(taxable, |limit| limit.min(taxable));
        tax += (upper - lower) * bracket.rate;
        lower = upper;
    }

    round_currency(tax)
}

/// Estimates take-home pay from gross pay.
pub fn estimate_net(
    gross_pay: Decimal,
    deductions: &DeductionsConfig,
    step_number: u32,
) -> NetEstimateResult {
    let contributions = round_currency(gross_pay * deductions.contribution_rate);
    let taxable_income = gross_pay - contributions;
    let income_tax = progressive_tax(taxable_income, &deductions.tax_brackets);
    let net_pay = taxable_income - income_tax;

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_estimate".to_string(),
        rule_name: "Net Pay Estimate".to_string(),
        clause_ref: String::new(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "contribution_rate": deductions.contribution_rate.to_string(),
            "tax_brackets": deductions.tax_brackets.len()
        }),
        output: serde_json::json!({
            "contributions": contributions.to_string(),
            "taxable_income": taxable_income.to_string(),
            "income_tax": income_tax.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "{} gross - {} contributions - {} tax = {} net",
            gross_pay, contributions, income_tax, net_pay
        ),
    };

    NetEstimateResult {
        estimate: NetEstimate {
            contributions,
            taxable_income,
            income_tax,
            net_pay,
        },
        audit_step,
    }
}

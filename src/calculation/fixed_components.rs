//! Fixed pay components such as base salary.

use rust_decimal::Decimal;

use crate::config::FixedComponent;
use crate::models::{AllowancePayment, AuditStep};

use super::rounding::round_currency;

/// The result of adding the fixed components.
#[derive(Debug, Clone)]
pub struct FixedComponentsResult {
    /// One payment per configured component, in declaration order.
    pub allowances: Vec<AllowancePayment>,
    /// The audit step recording the components.
    pub audit_step: AuditStep,
}

/// Adds each fixed component once.
pub fn calculate_fixed_components(
    components: &[FixedComponent],
    step_number: u32,
) -> FixedComponentsResult {
    let allowances: Vec<AllowancePayment> = components
        .iter()
        .map(|component| AllowancePayment {
            allowance_type: component.id.clone(),
            description: component.description.clone(),
            units: Decimal::ONE,
            rate: component.amount,
            amount: round_currency(component.amount),
            clause_ref: component.clause_ref.clone(),
        })
        .collect();
    let total: Decimal = allowances.iter().map(|a| a.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "fixed_components".to_string(),
        rule_name: "Fixed Pay Components".to_string(),
        clause_ref: String::new(),
        input: serde_json::json!({
            "components": components.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
        }),
        output: serde_json::json!({ "total": total.to_string() }),
        reasoning: if components.is_empty() {
            "No fixed components configured".to_string()
        } else {
            format!("{} fixed components totalling {}", components.len(), total)
        },
    };

    FixedComponentsResult {
        allowances,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_components_are_paid_once() {
        let components = vec![
            FixedComponent {
                id: "base_salary".to_string(),
                description: "Base salary".to_string(),
                amount: dec("1520.16"),
                clause_ref: "4.1".to_string(),
            },
            FixedComponent {
                id: "flight_allowance".to_string(),
                description: "Flight allowance".to_string(),
                amount: dec("3795.11"),
                clause_ref: "4.2".to_string(),
            },
        ];

        let result = calculate_fixed_components(&components, 2);
        assert_eq!(result.allowances.len(), 2);
        assert_eq!(result.allowances[0].allowance_type, "base_salary");
        assert_eq!(result.allowances[1].units, Decimal::ONE);
        assert_eq!(result.audit_step.output["total"], "5315.27");
    }

    #[test]
    fn test_no_components() {
        let result = calculate_fixed_components(&[], 1);
        assert!(result.allowances.is_empty());
        assert_eq!(result.audit_step.output["total"], "0");
    }
}

//! Salary rule selection.
//!
//! Every rule whose condition holds for a duty is a candidate. The candidate
//! with the highest priority wins; among equal priorities the rule declared
//! first wins.

use rust_decimal::Decimal;

use crate::config::{RuleCondition, SalaryRule};
use crate::models::{AirportRecord, AuditStep, DutyRecord};

/// A duty with its resolved airports and distance.
///
/// Ground duties have no airports and a zero distance.
#[derive(Debug, Clone, Copy)]
pub struct DutyContext<'a> {
    /// The roster record.
    pub record: &'a DutyRecord,
    /// The resolved departure airport.
    pub departure: Option<&'a AirportRecord>,
    /// The resolved arrival airport.
    pub arrival: Option<&'a AirportRecord>,
    /// Great-circle distance in nautical miles, rounded to one decimal.
    pub distance_nm: Decimal,
}

impl DutyContext<'_> {
    /// Returns `"<flight> <dep>-<arr>"`, or just the duty code for ground
    /// duties.
    pub fn label(&self) -> String {
        let record = self.record;
        if record.departure.is_empty() && record.arrival.is_empty() {
            record.flight_number.clone()
        } else {
            format!(
                "{} {}-{}",
                record.flight_number, record.departure, record.arrival
            )
        }
    }
}

/// The result of selecting a rule for one duty.
#[derive(Debug, Clone)]
pub struct RuleSelection<'r> {
    /// The winning rule, if any rule matched.
    pub rule: Option<&'r SalaryRule>,
    /// The audit step recording the candidates and the winner.
    pub audit_step: AuditStep,
}

fn contains_code(codes: &[String], code: &str) -> bool {
    codes.iter().any(|c| c.eq_ignore_ascii_case(code))
}

fn within(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

/// Returns true if every predicate present in `condition` holds for the duty.
pub fn rule_matches(condition: &RuleCondition, ctx: &DutyContext<'_>) -> bool {
    let record = ctx.record;
    let ends: Vec<&AirportRecord> = [ctx.departure, ctx.arrival].into_iter().flatten().collect();

    if !condition.departure.is_empty() && !contains_code(&condition.departure, &record.departure) {
        return false;
    }
    if !condition.arrival.is_empty() && !contains_code(&condition.arrival, &record.arrival) {
        return false;
    }
    if !condition.airports.is_empty()
        && !contains_code(&condition.airports, &record.departure)
        && !contains_code(&condition.airports, &record.arrival)
    {
        return false;
    }
    if let Some(region) = &condition.region {
        if !ends.iter().any(|airport| airport.in_region(region)) {
            return false;
        }
    }
    if let Some(country) = &condition.country {
        if !ends.iter().any(|airport| airport.in_country(country)) {
            return false;
        }
    }
    if condition.kind.is_some_and(|kind| kind != record.kind) {
        return false;
    }
    if let Some(prefix) = &condition.flight_prefix {
        let number = record.flight_number.to_ascii_uppercase();
        if !number.starts_with(&prefix.to_ascii_uppercase()) {
            return false;
        }
    }

    within(record.duration_hours, condition.min_hours, condition.max_hours)
        && within(
            ctx.distance_nm,
            condition.min_distance_nm,
            condition.max_distance_nm,
        )
}

/// Selects the applicable rule for a duty.
///
/// Rules are scanned in declaration order and a later candidate only
/// replaces the current winner on strictly higher priority.
pub fn select_rule<'r>(
    rules: &'r [SalaryRule],
    ctx: &DutyContext<'_>,
    step_number: u32,
) -> RuleSelection<'r> {
    let candidates: Vec<&SalaryRule> = rules
        .iter()
        .filter(|rule| rule_matches(&rule.condition, ctx))
        .collect();

    let rule = candidates.iter().copied().fold(None, |best: Option<&SalaryRule>, rule| {
        match best {
            Some(current) if current.priority >= rule.priority => Some(current),
            _ => Some(rule),
        }
    });

    let record = ctx.record;
    let label = ctx.label();
    let candidate_ids: Vec<&str> = candidates.iter().map(|rule| rule.id.as_str()).collect();
    let reasoning = match rule {
        Some(rule) if candidates.len() > 1 => format!(
            "{}: {} rules match; '{}' wins with priority {}",
            label,
            candidates.len(),
            rule.id,
            rule.priority
        ),
        Some(rule) => format!("{}: only '{}' matches", label, rule.id),
        None => format!("{}: no salary rule matches", label),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rule_selection".to_string(),
        rule_name: "Salary Rule Selection".to_string(),
        clause_ref: rule.map(|r| r.clause_ref.clone()).unwrap_or_default(),
        input: serde_json::json!({
            "row": record.row,
            "flight_number": record.flight_number,
            "departure": record.departure,
            "arrival": record.arrival,
            "kind": record.kind.as_str(),
            "hours": record.duration_hours.to_string(),
            "distance_nm": ctx.distance_nm.to_string()
        }),
        output: serde_json::json!({
            "candidates": candidate_ids,
            "selected": rule.map(|r| r.id.as_str())
        }),
        reasoning,
    };

    RuleSelection { rule, audit_step }
}

//! Roster pay calculation.
//!
//! [`compute_pay`] walks the roster in order, resolving airports, selecting
//! rules and pricing each duty, then adds the day-level allowances, totals
//! and the optional net estimate. Duties that cannot be priced become
//! [`PayIssue`]s and warnings; they never abort the calculation.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SalaryConfig;
use crate::directory::AirportDirectory;
use crate::error::EngineError;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, DutyRecord, DutyRef, PayBasis,
    PayIssue, PayIssueKind, PayLineItem, PayTotals,
};

use super::duty_pay::{Overtime, calculate_duty_pay};
use super::fixed_components::calculate_fixed_components;
use super::leave_pay::calculate_leave_pay;
use super::net_estimate::estimate_net;
use super::night_stop::calculate_night_stops;
use super::per_diem::calculate_per_diem;
use super::rest_violation::calculate_rest_violations;
use super::rule_selection::{DutyContext, select_rule};
use super::schedule::build_schedule;
use super::sector_units::{distance_to_decimal, nominal_sectors, sector_units};

/// The engine version recorded on every result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn issue_warning(issue: &PayIssue) -> AuditWarning {
    let (code, message) = match &issue.kind {
        PayIssueKind::UnresolvedAirport { code } => (
            "UNRESOLVED_AIRPORT",
            format!(
                "Row {} ({} on {}): airport '{}' not found in directory",
                issue.row, issue.flight_number, issue.date, code
            ),
        ),
        PayIssueKind::NoApplicableRule => (
            "NO_APPLICABLE_RULE",
            format!(
                "Row {} ({} on {}): no salary rule applies",
                issue.row, issue.flight_number, issue.date
            ),
        ),
        PayIssueKind::AmountOverflow => (
            "AMOUNT_OVERFLOW",
            format!(
                "Row {} ({} on {}): amount exceeds the representable range",
                issue.row, issue.flight_number, issue.date
            ),
        ),
    };
    AuditWarning {
        code: code.to_string(),
        message,
        severity: "high".to_string(),
    }
}

fn issue(record: &DutyRecord, kind: PayIssueKind) -> PayIssue {
    PayIssue {
        row: record.row,
        date: record.date,
        flight_number: record.flight_number.clone(),
        kind,
    }
}

/// Calculates pay for a roster.
///
/// Every priced record (flights, airport duties and training) yields exactly
/// one line item or at least one issue: each unresolved airport code
/// produces its own issue, a resolved duty with no matching rule produces a
/// `NoApplicableRule` issue, and an amount past the decimal range produces an
/// `AmountOverflow` issue. Standby, leave, rest days and days off are kept
/// on the result's calendar for the day-level allowances. Identical inputs
/// produce identical line items, issues and totals.
///
/// # Example
///
/// ```no_run
/// use pilot_pay::calculation::compute_pay;
/// use pilot_pay::config::ConfigLoader;
/// use pilot_pay::directory::AirportDirectory;
/// use pilot_pay::roster::{RosterFormat, RosterParser};
///
/// let config = ConfigLoader::load("./config/pilot")?.into_config();
/// let directory = AirportDirectory::load("./data/airports.csv")?;
/// let records = RosterParser::parse(
///     b"date,flight,departure,arrival,duration\n2024-01-01,101,JFK,LAX,5.5\n",
///     RosterFormat::Csv,
/// )?;
///
/// let result = compute_pay(&records, &config, &directory);
/// println!("Gross pay: {}", result.totals.gross_pay);
/// # Ok::<(), pilot_pay::error::EngineError>(())
/// ```
pub fn compute_pay(
    records: &[DutyRecord],
    config: &SalaryConfig,
    directory: &AirportDirectory,
) -> CalculationResult {
    let start_time = Instant::now();
    let mut line_items: Vec<PayLineItem> = Vec::with_capacity(records.len());
    let mut calendar: Vec<DutyRef> = Vec::new();
    let mut issues: Vec<PayIssue> = Vec::new();
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;
    let mut overtime = Overtime::new(config.overtime());
    let mut duty_pay = Decimal::ZERO;

    for record in records {
        if !record.kind.is_priced() {
            calendar.push(record.duty_ref());
            continue;
        }

        let (ctx, sectors) = if record.kind.is_flight() {
            let departure = directory.lookup(&record.departure);
            let arrival = directory.lookup(&record.arrival);

            let (departure, arrival) = match (departure, arrival) {
                (Ok(departure), Ok(arrival)) => (departure, arrival),
                (departure, arrival) => {
                    for code in [departure.err(), arrival.err()]
                        .into_iter()
                        .flatten()
                        .filter_map(|err| match err {
                            EngineError::UnresolvedAirport { code } => Some(code),
                            _ => None,
                        })
                    {
                        warn!(row = record.row, code = %code, "Unresolved airport");
                        issues.push(issue(record, PayIssueKind::UnresolvedAirport { code }));
                    }
                    continue;
                }
            };

            let distance_nm = distance_to_decimal(directory.distance_nm(departure, arrival));
            let ctx = DutyContext {
                record,
                departure: Some(departure),
                arrival: Some(arrival),
                distance_nm,
            };
            (ctx, sector_units(distance_nm, config.sector_bands()))
        } else {
            let ctx = DutyContext {
                record,
                departure: None,
                arrival: None,
                distance_nm: Decimal::ZERO,
            };
            (ctx, nominal_sectors(record, config.nominal_sectors()))
        };

        let selection = select_rule(config.rules(), &ctx, step_number);
        steps.push(selection.audit_step);
        step_number += 1;

        let Some(rule) = selection.rule else {
            warn!(row = record.row, flight = %record.flight_number, "No applicable salary rule");
            issues.push(issue(record, PayIssueKind::NoApplicableRule));
            continue;
        };

        let priced = match calculate_duty_pay(&ctx, rule, sectors, &mut overtime, step_number) {
            Ok(priced) => priced,
            Err(error) => {
                warn!(row = record.row, %error, "Duty amount overflow");
                issues.push(issue(record, PayIssueKind::AmountOverflow));
                continue;
            }
        };
        let Some(total) = duty_pay.checked_add(priced.line_item.amount) else {
            warn!(row = record.row, "Duty pay total overflow");
            issues.push(issue(record, PayIssueKind::AmountOverflow));
            continue;
        };
        duty_pay = total;

        debug!(
            row = record.row,
            rule = %rule.id,
            amount = %priced.line_item.amount,
            "Duty priced"
        );
        steps.push(priced.audit_step);
        step_number += 1;
        line_items.push(priced.line_item);
    }

    let allowances_config = config.allowances();
    let home_base = config.scheme().home_base.as_deref();
    let schedule = build_schedule(&line_items, &calendar);
    let mut allowances = Vec::new();

    let per_diem = calculate_per_diem(&schedule, allowances_config.per_diem.as_ref(), step_number);
    steps.push(per_diem.audit_step);
    step_number += 1;
    allowances.extend(per_diem.allowance);

    let night_stops = calculate_night_stops(
        &schedule,
        allowances_config.night_stop.as_ref(),
        home_base,
        step_number,
    );
    steps.push(night_stops.audit_step);
    step_number += 1;
    allowances.extend(night_stops.allowance);

    let leave = calculate_leave_pay(&schedule, allowances_config.leave.as_ref(), step_number);
    steps.push(leave.audit_step);
    step_number += 1;
    allowances.extend(leave.allowance);

    let rest = calculate_rest_violations(
        &schedule,
        allowances_config.rest_violation.as_ref(),
        step_number,
    );
    steps.push(rest.audit_step);
    step_number += 1;
    allowances.extend(rest.allowance);

    let fixed = calculate_fixed_components(&allowances_config.fixed, step_number);
    steps.push(fixed.audit_step);
    step_number += 1;
    allowances.extend(fixed.allowances);

    let allowances_total: Decimal = allowances.iter().map(|a| a.amount).sum();
    let gross_pay = duty_pay.saturating_add(allowances_total);

    let net_estimate = config.deductions().map(|deductions| {
        let result = estimate_net(gross_pay, deductions, step_number);
        steps.push(result.audit_step);
        result.estimate
    });

    let overtime_on = |basis: PayBasis| -> Decimal {
        line_items
            .iter()
            .filter(|item| item.basis == basis)
            .map(|item| item.overtime_units)
            .sum()
    };
    let totals = PayTotals {
        duty_pay,
        allowances_total,
        gross_pay,
        duty_hours: line_items.iter().map(|item| item.hours).sum(),
        overtime_hours: overtime_on(PayBasis::Hourly),
        overtime_sectors: overtime_on(PayBasis::PerSector),
        net_estimate,
    };

    let warnings = issues.iter().map(issue_warning).collect();
    let duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        records = records.len(),
        line_items = line_items.len(),
        calendar = calendar.len(),
        issues = issues.len(),
        gross_pay = %totals.gross_pay,
        duration_us,
        "Pay calculation completed"
    );

    CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        scheme: config.scheme().name.clone(),
        line_items,
        issues,
        calendar,
        allowances,
        totals,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    }
}

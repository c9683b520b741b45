//! Night stop allowance.
//!
//! A night stop is paid for date `d` when the next calendar day also has
//! priced flights, the last arrival on `d` is away from home base, and the
//! first departure on `d + 1` leaves from that same airport. Ground duties
//! and calendar entries play no part.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::NightStopConfig;
use crate::models::{AllowancePayment, AuditStep, DutyRef};

use super::rounding::round_currency;

/// The allowance type recorded for night stop payments.
pub const NIGHT_STOP_TYPE: &str = "night_stop";

/// The result of the night stop calculation.
#[derive(Debug, Clone)]
pub struct NightStopResult {
    /// The payment, if configured and at least one night stop was found.
    pub allowance: Option<AllowancePayment>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Returns the dates on which the crew stayed overnight away from base.
///
/// Without a home base no night stop can be identified.
pub fn find_night_stops(schedule: &[DutyRef], home_base: Option<&str>) -> Vec<NaiveDate> {
    let Some(home_base) = home_base else {
        return Vec::new();
    };

    let mut days: BTreeMap<NaiveDate, Vec<&DutyRef>> = BTreeMap::new();
    for duty in schedule.iter().filter(|duty| duty.kind.is_flight()) {
        days.entry(duty.date).or_default().push(duty);
    }

    days.iter()
        .filter_map(|(date, duties)| {
            let next = days.get(&date.succ_opt()?)?;
            let last_arrival = &duties.last()?.arrival;
            let first_departure = &next.first()?.departure;

            let away = !last_arrival.eq_ignore_ascii_case(home_base);
            (away && last_arrival == first_departure).then_some(*date)
        })
        .collect()
}

/// Calculates the night stop allowance over a schedule.
pub fn calculate_night_stops(
    schedule: &[DutyRef],
    config: Option<&NightStopConfig>,
    home_base: Option<&str>,
    step_number: u32,
) -> NightStopResult {
    let nights = find_night_stops(schedule, home_base);
    let dates: Vec<String> = nights.iter().map(ToString::to_string).collect();
    let units = Decimal::from(nights.len());

    let (rate, clause_ref) = match config {
        Some(config) => (config.amount, config.clause_ref.clone()),
        None => (Decimal::ZERO, String::new()),
    };
    let amount = round_currency(units * rate);

    let reasoning = match (config, home_base) {
        (None, _) => "No night stop allowance configured".to_string(),
        (Some(_), None) => "No home base configured; night stops cannot be identified".to_string(),
        (Some(_), Some(base)) => format!(
            "{} nights away from {} × {} = {}",
            units,
            base,
            rate.normalize(),
            amount
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: NIGHT_STOP_TYPE.to_string(),
        rule_name: "Night Stop Allowance".to_string(),
        clause_ref: clause_ref.clone(),
        input: serde_json::json!({
            "home_base": home_base,
            "rate": rate.to_string()
        }),
        output: serde_json::json!({
            "night_stops": dates,
            "amount": amount.to_string()
        }),
        reasoning,
    };

    let allowance = (config.is_some() && !nights.is_empty()).then(|| AllowancePayment {
        allowance_type: NIGHT_STOP_TYPE.to_string(),
        description: format!("Night stops away from base ({})", units),
        units,
        rate,
        amount,
        clause_ref,
    });

    NightStopResult {
        allowance,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DutyKind;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn leg(day: u32, departure: &str, arrival: &str) -> DutyRef {
        DutyRef {
            row: 1,
            date: date(day),
            flight_number: "1".to_string(),
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            kind: DutyKind::Operating,
            landing_at: None,
        }
    }

    fn ground(day: u32, kind: DutyKind) -> DutyRef {
        DutyRef {
            row: 1,
            date: date(day),
            flight_number: "ADTY".to_string(),
            departure: String::new(),
            arrival: String::new(),
            kind,
            landing_at: None,
        }
    }

    fn config() -> NightStopConfig {
        NightStopConfig {
            amount: dec("42.96"),
            clause_ref: "7.3".to_string(),
        }
    }

    #[test]
    fn test_overnight_away_from_base() {
        let items = vec![
            leg(1, "MXP", "FCO"),
            leg(1, "FCO", "NAP"),
            leg(2, "NAP", "MXP"),
        ];
        assert_eq!(find_night_stops(&items, Some("MXP")), vec![date(1)]);
    }

    #[test]
    fn test_return_to_base_is_not_a_night_stop() {
        let items = vec![leg(1, "MXP", "FCO"), leg(1, "FCO", "MXP"), leg(2, "MXP", "CDG")];
        assert!(find_night_stops(&items, Some("MXP")).is_empty());
    }

    #[test]
    fn test_gap_day_breaks_the_chain() {
        let items = vec![leg(1, "MXP", "FCO"), leg(3, "FCO", "MXP")];
        assert!(find_night_stops(&items, Some("MXP")).is_empty());
    }

    #[test]
    fn test_next_day_from_elsewhere_is_not_counted() {
        let items = vec![leg(1, "MXP", "FCO"), leg(2, "NAP", "MXP")];
        assert!(find_night_stops(&items, Some("MXP")).is_empty());
    }

    #[test]
    fn test_ground_duties_are_ignored() {
        let items = vec![
            leg(1, "MXP", "FCO"),
            ground(1, DutyKind::Training),
            ground(2, DutyKind::AirportDuty),
            leg(2, "FCO", "MXP"),
        ];
        assert_eq!(find_night_stops(&items, Some("MXP")), vec![date(1)]);

        let standby_next_day = vec![leg(1, "MXP", "FCO"), ground(2, DutyKind::AirportDuty)];
        assert!(find_night_stops(&standby_next_day, Some("MXP")).is_empty());
    }

    #[test]
    fn test_without_home_base() {
        let items = vec![leg(1, "MXP", "FCO"), leg(2, "FCO", "MXP")];
        assert!(find_night_stops(&items, None).is_empty());

        let result = calculate_night_stops(&items, Some(&config()), None, 1);
        assert!(result.allowance.is_none());
        assert!(result.audit_step.reasoning.contains("No home base"));
    }

    #[test]
    fn test_payment() {
        let items = vec![
            leg(1, "MXP", "FCO"),
            leg(2, "FCO", "LGW"),
            leg(3, "LGW", "MXP"),
        ];
        let result = calculate_night_stops(&items, Some(&config()), Some("MXP"), 9);

        let allowance = result.allowance.unwrap();
        assert_eq!(allowance.units, dec("2"));
        assert_eq!(allowance.amount, dec("85.92"));
        assert_eq!(allowance.clause_ref, "7.3");
        assert_eq!(result.audit_step.step_number, 9);
        assert_eq!(
            result.audit_step.reasoning,
            "2 nights away from MXP × 42.96 = 85.92"
        );
    }
}

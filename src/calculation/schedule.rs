//! Day-level views over a priced roster.
//!
//! Allowances look at whole days rather than single duties. They work on
//! the schedule: the priced duties plus the calendar entries, in roster
//! order.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{CalculationResult, DutyKind, DutyRef, PayLineItem};

/// Merges priced duties and calendar entries into roster order.
pub fn build_schedule(line_items: &[PayLineItem], calendar: &[DutyRef]) -> Vec<DutyRef> {
    let mut schedule: Vec<DutyRef> = line_items
        .iter()
        .map(|item| item.duty.clone())
        .chain(calendar.iter().cloned())
        .collect();
    schedule.sort_by_key(|duty| duty.row);
    schedule
}

/// Returns the schedule of a finished calculation.
pub fn result_schedule(result: &CalculationResult) -> Vec<DutyRef> {
    build_schedule(&result.line_items, &result.calendar)
}

/// Groups schedule entries by date, keeping roster order within a day.
pub fn by_date(schedule: &[DutyRef]) -> BTreeMap<NaiveDate, Vec<&DutyRef>> {
    let mut days: BTreeMap<NaiveDate, Vec<&DutyRef>> = BTreeMap::new();
    for duty in schedule {
        days.entry(duty.date).or_default().push(duty);
    }
    days
}

/// Landing time of the last flight of each date, where the roster gives one.
pub fn last_landings(schedule: &[DutyRef]) -> BTreeMap<NaiveDate, NaiveDateTime> {
    let mut last: BTreeMap<NaiveDate, Option<NaiveDateTime>> = BTreeMap::new();
    for duty in schedule.iter().filter(|duty| duty.kind.is_flight()) {
        last.insert(duty.date, duty.landing_at);
    }
    last.into_iter()
        .filter_map(|(date, landing)| Some((date, landing?)))
        .collect()
}

/// Returns true if any entry on `date` is one of `kinds`.
pub fn has_kind_on(
    days: &BTreeMap<NaiveDate, Vec<&DutyRef>>,
    date: NaiveDate,
    kinds: &[DutyKind],
) -> bool {
    days.get(&date)
        .is_some_and(|duties| duties.iter().any(|duty| kinds.contains(&duty.kind)))
}

//! Salary calculation for pilot rosters.
//!
//! This module contains the calculation functions for pricing a roster:
//! sector units from great-circle distance or nominal ground-duty values,
//! prioritised rule selection, hourly/fixed/per-sector duty pay with
//! cumulative overtime, the day-level allowances (per-diem, night stops,
//! leave pay and rest violations), fixed components and the net pay
//! estimate. [`compute_pay`] ties them together.

mod calculator;
mod duty_pay;
mod fixed_components;
mod leave_pay;
mod net_estimate;
mod night_stop;
mod per_diem;
mod rest_violation;
mod rounding;
mod rule_selection;
mod schedule;
mod sector_units;

pub use calculator::{ENGINE_VERSION, compute_pay};
pub use duty_pay::{DutyPayResult, Overtime, OvertimeTracker, calculate_duty_pay};
pub use fixed_components::{FixedComponentsResult, calculate_fixed_components};
pub use leave_pay::{LEAVE_PAY_TYPE, LeavePayResult, calculate_leave_pay};
pub use net_estimate::{NetEstimateResult, estimate_net, progressive_tax};
pub use night_stop::{NIGHT_STOP_TYPE, NightStopResult, calculate_night_stops, find_night_stops};
pub use per_diem::{PER_DIEM_TYPE, PerDiemResult, calculate_per_diem};
pub use rest_violation::{
    REST_VIOLATION_TYPE, RestViolation, RestViolationResult, calculate_rest_violations,
    find_rest_violations,
};
pub use rounding::{CURRENCY_DP, round_currency};
pub use rule_selection::{DutyContext, RuleSelection, rule_matches, select_rule};
pub use schedule::{build_schedule, by_date, result_schedule};
pub use sector_units::{
    MIN_SECTOR_DISTANCE_NM, distance_to_decimal, nominal_sectors, sector_units,
};

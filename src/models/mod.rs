//! Core data models for the pilot pay engine.
//!
//! This module contains all the domain models used throughout the engine.

mod airport;
mod calculation_result;
mod duty;
mod pay_line;

pub use airport::AirportRecord;
pub use calculation_result::{
    AllowancePayment, AuditStep, AuditTrace, AuditWarning, CalculationResult, NetEstimate,
    PayTotals,
};
pub use duty::{DutyKind, DutyRecord};
pub use pay_line::{DutyRef, PayBasis, PayIssue, PayIssueKind, PayLineItem};

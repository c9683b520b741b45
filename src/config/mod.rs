//! Configuration loading and management for the pilot pay engine.
//!
//! This module provides functionality to load salary configurations from YAML files,
//! including scheme metadata, prioritised salary rules, sector bands, allowances,
//! and deductions.
//!
//! # Example
//!
//! ```no_run
//! use pilot_pay::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/pilot").unwrap();
//! println!("Loaded scheme: {}", config.scheme().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowancesConfig, DeductionsConfig, FixedComponent, LeavePayConfig, NightStopConfig,
    NominalSectors, OvertimeConfig, PerDiemConfig, RestViolationConfig, RuleCondition, RuleRate,
    RulesConfig, SalaryConfig, SalaryRule, SchemeMetadata, SectorBand, TaxBracket,
};

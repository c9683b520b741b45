//! Configuration types for pilot pay calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};
use crate::models::DutyKind;

/// Metadata about the pay scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeMetadata {
    /// A short identifier for the scheme (e.g., "FO-2024").
    pub code: String,
    /// The human-readable name of the scheme.
    pub name: String,
    /// The version or effective date of the scheme.
    pub version: String,
    /// The ISO currency code amounts are expressed in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// The crew base airport code, used to detect night stops.
    #[serde(default)]
    pub home_base: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// The condition under which a salary rule applies.
///
/// Every predicate is optional; a rule applies when all present predicates
/// hold. Code lists match when the airport is any of the listed codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleCondition {
    /// Departure airport codes.
    #[serde(default)]
    pub departure: Vec<String>,
    /// Arrival airport codes.
    #[serde(default)]
    pub arrival: Vec<String>,
    /// Airport codes matched against either end of the duty.
    #[serde(default)]
    pub airports: Vec<String>,
    /// Region matched against either end of the duty.
    #[serde(default)]
    pub region: Option<String>,
    /// Country matched against either end of the duty.
    #[serde(default)]
    pub country: Option<String>,
    /// How the duty was flown.
    #[serde(default)]
    pub kind: Option<DutyKind>,
    /// Flight number prefix (case-insensitive).
    #[serde(default)]
    pub flight_prefix: Option<String>,
    /// Minimum duty hours (inclusive).
    #[serde(default)]
    pub min_hours: Option<Decimal>,
    /// Maximum duty hours (inclusive).
    #[serde(default)]
    pub max_hours: Option<Decimal>,
    /// Minimum great-circle distance (inclusive).
    #[serde(default)]
    pub min_distance_nm: Option<Decimal>,
    /// Maximum great-circle distance (inclusive).
    #[serde(default)]
    pub max_distance_nm: Option<Decimal>,
}

/// How a matching rule prices a duty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleRate {
    /// Duty hours times an hourly rate.
    Hourly {
        /// The hourly rate.
        rate: Decimal,
        /// Whether hours past the overtime threshold earn the multiplier.
        #[serde(default = "default_true")]
        overtime_eligible: bool,
    },
    /// A fixed amount per duty.
    Fixed {
        /// The amount paid per duty.
        amount: Decimal,
    },
    /// Distance-banded sector units times a sector value.
    PerSector {
        /// The value of one sector unit.
        value: Decimal,
        /// Whether sectors past the overtime threshold earn the multiplier.
        #[serde(default = "default_true")]
        overtime_eligible: bool,
    },
}

fn default_true() -> bool {
    true
}

/// A prioritised condition-to-rate mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryRule {
    /// Unique identifier of the rule.
    pub id: String,
    /// Human-readable name of the rule.
    pub name: String,
    /// Higher priority wins when several rules match.
    #[serde(default)]
    pub priority: i32,
    /// When the rule applies. An empty condition matches every duty.
    #[serde(default)]
    pub condition: RuleCondition,
    /// How the rule prices a duty.
    pub rate: RuleRate,
    /// Reference to the agreement clause defining the rule.
    #[serde(default)]
    pub clause_ref: String,
}

/// Maps a great-circle distance to sector units.
///
/// A band covers distances strictly above `above_nm` up to and including
/// `up_to_nm`; a missing `up_to_nm` is unbounded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectorBand {
    /// Exclusive lower bound in nautical miles.
    pub above_nm: Decimal,
    /// Inclusive upper bound in nautical miles.
    #[serde(default)]
    pub up_to_nm: Option<Decimal>,
    /// Sector units for a duty in this band.
    pub sectors: Decimal,
}

/// Overtime past cumulative operating thresholds.
///
/// Hourly rules count hours against `threshold_hours`; per-sector rules
/// count sector units against `threshold_sectors`. A missing threshold
/// disables overtime for that basis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OvertimeConfig {
    /// Operating hours paid at the ordinary rate before overtime applies.
    #[serde(default)]
    pub threshold_hours: Option<Decimal>,
    /// Operating sectors paid at the ordinary value before overtime applies.
    #[serde(default)]
    pub threshold_sectors: Option<Decimal>,
    /// Multiplier applied to the rate for overtime hours or sectors.
    pub multiplier: Decimal,
    /// Reference to the agreement clause for overtime.
    #[serde(default)]
    pub clause_ref: String,
}

/// Nominal sector units for ground duties that have no distance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NominalSectors {
    /// Airport duties up to this many hours earn `airport_duty_short`.
    #[serde(default = "default_airport_duty_split_hours")]
    pub airport_duty_split_hours: Decimal,
    /// Sectors for a short airport duty.
    #[serde(default = "default_airport_duty_short")]
    pub airport_duty_short: Decimal,
    /// Sectors for a long airport duty.
    #[serde(default = "default_airport_duty_long")]
    pub airport_duty_long: Decimal,
    /// Sectors for a training duty.
    #[serde(default = "default_training_sectors")]
    pub training: Decimal,
}

fn default_airport_duty_split_hours() -> Decimal {
    Decimal::from(4)
}

fn default_airport_duty_short() -> Decimal {
    Decimal::ONE
}

fn default_airport_duty_long() -> Decimal {
    Decimal::from(2)
}

fn default_training_sectors() -> Decimal {
    Decimal::from(4)
}

impl Default for NominalSectors {
    fn default() -> Self {
        Self {
            airport_duty_split_hours: default_airport_duty_split_hours(),
            airport_duty_short: default_airport_duty_short(),
            airport_duty_long: default_airport_duty_long(),
            training: default_training_sectors(),
        }
    }
}

/// Rules configuration file structure (rules.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Distance bands for per-sector rules.
    #[serde(default)]
    pub sector_bands: Vec<SectorBand>,
    /// Sector units for airport and training duties.
    #[serde(default)]
    pub nominal_sectors: NominalSectors,
    /// Optional overtime on hourly rules.
    #[serde(default)]
    pub overtime: Option<OvertimeConfig>,
    /// Salary rules in declaration order.
    pub rules: Vec<SalaryRule>,
}

/// A daily allowance paid per working day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerDiemConfig {
    /// Amount per working day.
    pub amount: Decimal,
    /// Reference to the agreement clause.
    #[serde(default)]
    pub clause_ref: String,
}

/// An allowance for each night spent away from base between duty days.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NightStopConfig {
    /// Amount per night stop.
    pub amount: Decimal,
    /// Reference to the agreement clause.
    #[serde(default)]
    pub clause_ref: String,
}

/// Pay for each day of annual leave.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeavePayConfig {
    /// Amount per leave day.
    pub amount: Decimal,
    /// Reference to the agreement clause.
    #[serde(default)]
    pub clause_ref: String,
}

/// A bonus for landing so late that the following day off starts short.
///
/// A violation is a landing after `lead_minutes` before midnight when the
/// next day is a day off or leave. Landings up to `half_within_minutes`
/// past midnight earn half the amount; later landings earn the full amount.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestViolationConfig {
    /// Amount for a full violation.
    pub amount: Decimal,
    /// Minutes before midnight from which a landing counts.
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,
    /// Minutes past midnight up to which half the amount is paid.
    #[serde(default = "default_half_within_minutes")]
    pub half_within_minutes: i64,
    /// Reference to the agreement clause.
    #[serde(default)]
    pub clause_ref: String,
}

fn default_lead_minutes() -> i64 {
    29
}

fn default_half_within_minutes() -> i64 {
    90
}

/// A fixed amount paid once per calculation, such as base salary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixedComponent {
    /// Identifier used as the allowance type.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Reference to the agreement clause.
    #[serde(default)]
    pub clause_ref: String,
}

/// Allowances configuration file structure (allowances.yaml).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowancesConfig {
    /// Daily allowance.
    #[serde(default)]
    pub per_diem: Option<PerDiemConfig>,
    /// Night stop allowance.
    #[serde(default)]
    pub night_stop: Option<NightStopConfig>,
    /// Annual leave pay.
    #[serde(default)]
    pub leave: Option<LeavePayConfig>,
    /// Rest violation bonus.
    #[serde(default)]
    pub rest_violation: Option<RestViolationConfig>,
    /// Fixed components.
    #[serde(default)]
    pub fixed: Vec<FixedComponent>,
}

/// One band of a progressive income tax schedule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxBracket {
    /// Upper bound of the band; `None` for the top band.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Tax rate applied to income inside the band.
    pub rate: Decimal,
}

/// Deductions configuration file structure (deductions.yaml).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeductionsConfig {
    /// Social contribution rate applied to gross pay.
    pub contribution_rate: Decimal,
    /// Progressive tax bands in ascending order.
    pub tax_brackets: Vec<TaxBracket>,
}

/// The complete salary configuration loaded from YAML files.
///
/// Immutable once built; share it behind an `Arc` across requests.
#[derive(Debug, Clone)]
pub struct SalaryConfig {
    metadata: SchemeMetadata,
    rules: Vec<SalaryRule>,
    sector_bands: Vec<SectorBand>,
    nominal_sectors: NominalSectors,
    overtime: Option<OvertimeConfig>,
    allowances: AllowancesConfig,
    deductions: Option<DeductionsConfig>,
}

impl SalaryConfig {
    /// Creates a new SalaryConfig from its component parts.
    ///
    /// Sector bands are sorted by lower bound; rules keep declaration order,
    /// which breaks ties between rules of equal priority.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if rule ids repeat, there are no rules, a rate
    /// is negative, sector bands overlap, or tax brackets are not ascending
    /// with a single unbounded top band.
    pub fn new(
        metadata: SchemeMetadata,
        rules: Vec<SalaryRule>,
        sector_bands: Vec<SectorBand>,
        overtime: Option<OvertimeConfig>,
        allowances: AllowancesConfig,
        deductions: Option<DeductionsConfig>,
    ) -> EngineResult<Self> {
        let mut sorted_bands = sector_bands;
        sorted_bands.sort_by(|a, b| a.above_nm.cmp(&b.above_nm));

        validate_rules(&rules)?;
        validate_bands(&sorted_bands)?;
        if let Some(overtime) = &overtime {
            let negative = [overtime.threshold_hours, overtime.threshold_sectors]
                .into_iter()
                .flatten()
                .any(|threshold| threshold < Decimal::ZERO);
            if negative || overtime.multiplier < Decimal::ONE {
                return Err(invalid(
                    "overtime thresholds must be non-negative and multiplier at least 1",
                ));
            }
        }
        if let Some(deductions) = &deductions {
            validate_deductions(deductions)?;
        }

        Ok(Self {
            metadata,
            rules,
            sector_bands: sorted_bands,
            nominal_sectors: NominalSectors::default(),
            overtime,
            allowances,
            deductions,
        })
    }

    /// Returns the scheme metadata.
    pub fn scheme(&self) -> &SchemeMetadata {
        &self.metadata
    }

    /// Returns all rules in declaration order.
    pub fn rules(&self) -> &[SalaryRule] {
        &self.rules
    }

    /// Returns the sector bands sorted by lower bound.
    pub fn sector_bands(&self) -> &[SectorBand] {
        &self.sector_bands
    }

    /// Replaces the nominal sectors for airport and training duties.
    pub fn with_nominal_sectors(mut self, nominal_sectors: NominalSectors) -> Self {
        self.nominal_sectors = nominal_sectors;
        self
    }

    /// Returns the nominal sectors for airport and training duties.
    pub fn nominal_sectors(&self) -> &NominalSectors {
        &self.nominal_sectors
    }

    /// Returns the overtime configuration, if any.
    pub fn overtime(&self) -> Option<&OvertimeConfig> {
        self.overtime.as_ref()
    }

    /// Returns the allowances configuration.
    pub fn allowances(&self) -> &AllowancesConfig {
        &self.allowances
    }

    /// Returns the deductions configuration, if any.
    pub fn deductions(&self) -> Option<&DeductionsConfig> {
        self.deductions.as_ref()
    }
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}

fn validate_rules(rules: &[SalaryRule]) -> EngineResult<()> {
    if rules.is_empty() {
        return Err(invalid("at least one salary rule is required"));
    }

    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(invalid(format!("duplicate rule id '{}'", rule.id)));
        }

        let negative = match &rule.rate {
            RuleRate::Hourly { rate, .. } => *rate < Decimal::ZERO,
            RuleRate::Fixed { amount } => *amount < Decimal::ZERO,
            RuleRate::PerSector { value, .. } => *value < Decimal::ZERO,
        };
        if negative {
            return Err(invalid(format!("rule '{}' has a negative rate", rule.id)));
        }
    }

    Ok(())
}

fn validate_bands(bands: &[SectorBand]) -> EngineResult<()> {
    for pair in bands.windows(2) {
        match pair[0].up_to_nm {
            Some(upper) if upper <= pair[1].above_nm => {}
            _ => {
                return Err(invalid(format!(
                    "sector bands above {} and above {} overlap",
                    pair[0].above_nm, pair[1].above_nm
                )));
            }
        }
    }

    for band in bands {
        if band.up_to_nm.is_some_and(|upper| upper <= band.above_nm) {
            return Err(invalid(format!(
                "sector band above {} has an upper bound not above its lower bound",
                band.above_nm
            )));
        }
    }

    Ok(())
}

fn validate_deductions(deductions: &DeductionsConfig) -> EngineResult<()> {
    if deductions.contribution_rate < Decimal::ZERO || deductions.contribution_rate >= Decimal::ONE
    {
        return Err(invalid("contribution_rate must be in [0, 1)"));
    }

    let Some((top, lower)) = deductions.tax_brackets.split_last() else {
        return Err(invalid("at least one tax bracket is required"));
    };
    if top.up_to.is_some() {
        return Err(invalid("the last tax bracket must be unbounded"));
    }

    let mut previous = Decimal::ZERO;
    for bracket in lower {
        match bracket.up_to {
            Some(limit) if limit > previous => previous = limit,
            _ => return Err(invalid("tax brackets must have ascending upper bounds")),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn metadata() -> SchemeMetadata {
        SchemeMetadata {
            code: "TEST".to_string(),
            name: "Test scheme".to_string(),
            version: "2024-01-01".to_string(),
            currency: "USD".to_string(),
            home_base: None,
        }
    }

    fn hourly_rule(id: &str) -> SalaryRule {
        SalaryRule {
            id: id.to_string(),
            name: id.to_string(),
            priority: 0,
            condition: RuleCondition::default(),
            rate: RuleRate::Hourly {
                rate: dec("50"),
                overtime_eligible: true,
            },
            clause_ref: String::new(),
        }
    }

    fn band(above: &str, up_to: Option<&str>, sectors: &str) -> SectorBand {
        SectorBand {
            above_nm: dec(above),
            up_to_nm: up_to.map(dec),
            sectors: dec(sectors),
        }
    }

    fn build(
        rules: Vec<SalaryRule>,
        bands: Vec<SectorBand>,
        deductions: Option<DeductionsConfig>,
    ) -> EngineResult<SalaryConfig> {
        SalaryConfig::new(
            metadata(),
            rules,
            bands,
            None,
            AllowancesConfig::default(),
            deductions,
        )
    }

    #[test]
    fn test_bands_are_sorted() {
        let config = build(
            vec![hourly_rule("a")],
            vec![band("400", None, "1.2"), band("0", Some("400"), "0.8")],
            None,
        )
        .unwrap();

        assert_eq!(config.sector_bands()[0].above_nm, dec("0"));
        assert_eq!(config.sector_bands()[1].above_nm, dec("400"));
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let result = build(vec![hourly_rule("a"), hourly_rule("a")], vec![], None);
        match result {
            Err(EngineError::InvalidConfig { message }) => {
                assert!(message.contains("duplicate rule id 'a'"))
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_rules_rejected() {
        assert!(matches!(
            build(vec![], vec![], None),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut rule = hourly_rule("a");
        rule.rate = RuleRate::Fixed { amount: dec("-1") };
        assert!(matches!(
            build(vec![rule], vec![], None),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let result = build(
            vec![hourly_rule("a")],
            vec![band("0", Some("500"), "0.8"), band("400", None, "1.2")],
            None,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_unbounded_band_before_another_rejected() {
        let result = build(
            vec![hourly_rule("a")],
            vec![band("0", None, "0.8"), band("400", None, "1.2")],
            None,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_tax_brackets_must_end_unbounded() {
        let deductions = DeductionsConfig {
            contribution_rate: dec("0.1"),
            tax_brackets: vec![TaxBracket {
                up_to: Some(dec("1000")),
                rate: dec("0.2"),
            }],
        };
        assert!(matches!(
            build(vec![hourly_rule("a")], vec![], Some(deductions)),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_tax_brackets_must_ascend() {
        let deductions = DeductionsConfig {
            contribution_rate: dec("0.1"),
            tax_brackets: vec![
                TaxBracket {
                    up_to: Some(dec("2000")),
                    rate: dec("0.2"),
                },
                TaxBracket {
                    up_to: Some(dec("1000")),
                    rate: dec("0.3"),
                },
                TaxBracket {
                    up_to: None,
                    rate: dec("0.4"),
                },
            ],
        };
        assert!(matches!(
            build(vec![hourly_rule("a")], vec![], Some(deductions)),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rule_rate_deserialization() {
        let yaml = r#"
id: us_hourly
name: US hourly
priority: 20
condition:
  region: US
  kind: operating
rate:
  kind: hourly
  rate: "50.00"
"#;
        let rule: SalaryRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.priority, 20);
        assert_eq!(rule.condition.region.as_deref(), Some("US"));
        assert_eq!(rule.condition.kind, Some(DutyKind::Operating));
        assert_eq!(
            rule.rate,
            RuleRate::Hourly {
                rate: dec("50.00"),
                overtime_eligible: true
            }
        );
    }

    #[test]
    fn test_per_sector_rate_deserialization() {
        let rate: RuleRate = serde_yaml::from_str("kind: per_sector\nvalue: 21.48\n").unwrap();
        assert_eq!(
            rate,
            RuleRate::PerSector {
                value: dec("21.48"),
                overtime_eligible: true
            }
        );
    }

    #[test]
    fn test_overtime_thresholds_are_optional() {
        let overtime: OvertimeConfig =
            serde_yaml::from_str("threshold_sectors: \"35\"\nmultiplier: \"2\"\n").unwrap();
        assert_eq!(overtime.threshold_sectors, Some(dec("35")));
        assert!(overtime.threshold_hours.is_none());
    }

    #[test]
    fn test_negative_sector_threshold_rejected() {
        let overtime = OvertimeConfig {
            threshold_sectors: Some(dec("-1")),
            multiplier: dec("2"),
            ..Default::default()
        };
        let result = SalaryConfig::new(
            metadata(),
            vec![hourly_rule("a")],
            vec![],
            Some(overtime),
            AllowancesConfig::default(),
            None,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_nominal_sector_defaults() {
        let nominal: NominalSectors = serde_yaml::from_str("training: \"3\"\n").unwrap();
        assert_eq!(nominal.training, dec("3"));
        assert_eq!(nominal.airport_duty_split_hours, dec("4"));
        assert_eq!(nominal.airport_duty_long, dec("2"));
    }

    #[test]
    fn test_rest_violation_defaults() {
        let config: RestViolationConfig = serde_yaml::from_str("amount: \"375\"\n").unwrap();
        assert_eq!(config.lead_minutes, 29);
        assert_eq!(config.half_within_minutes, 90);
    }
}

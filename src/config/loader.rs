//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading salary
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{
    AllowancesConfig, DeductionsConfig, RulesConfig, SalaryConfig, SalaryRule, SchemeMetadata,
};

/// Loads and provides access to salary configuration.
///
/// # Directory Structure
///
/// ```text
/// config/pilot/
/// ├── scheme.yaml      # Scheme metadata and home base
/// ├── rules.yaml       # Sector bands, overtime and salary rules
/// ├── allowances.yaml  # Per-diem, night stop and fixed components (optional)
/// └── deductions.yaml  # Contribution rate and tax brackets (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use pilot_pay::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/pilot").unwrap();
/// println!("Loaded scheme: {}", loader.scheme().name);
/// for rule in loader.config().rules() {
///     println!("{} (priority {})", rule.id, rule.priority);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SalaryConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/pilot")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `scheme.yaml` or `rules.yaml` is missing
    /// - Any file contains invalid YAML
    /// - The combined configuration fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<SchemeMetadata>(&path.join("scheme.yaml"))?;
        let rules = Self::load_yaml::<RulesConfig>(&path.join("rules.yaml"))?;
        let allowances = Self::load_optional_yaml::<AllowancesConfig>(&path.join("allowances.yaml"))?
            .unwrap_or_default();
        let deductions = Self::load_optional_yaml::<DeductionsConfig>(&path.join("deductions.yaml"))?;

        let config = SalaryConfig::new(
            metadata,
            rules.rules,
            rules.sector_bands,
            rules.overtime,
            allowances,
            deductions,
        )?
        .with_nominal_sectors(rules.nominal_sectors);

        info!(
            scheme = %config.scheme().code,
            rules = config.rules().len(),
            sector_bands = config.sector_bands().len(),
            deductions = config.deductions().is_some(),
            "Salary configuration loaded"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: SalaryConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads a YAML file that may be absent.
    fn load_optional_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
        if !path.exists() {
            debug!(path = %path.display(), "Optional configuration file absent");
            return Ok(None);
        }
        Self::load_yaml(path).map(Some)
    }

    /// Returns the underlying salary configuration.
    pub fn config(&self) -> &SalaryConfig {
        &self.config
    }

    /// Consumes the loader and returns the salary configuration.
    pub fn into_config(self) -> SalaryConfig {
        self.config
    }

    /// Returns the scheme metadata.
    pub fn scheme(&self) -> &SchemeMetadata {
        self.config.scheme()
    }

    /// Gets a rule by its id.
    ///
    /// Returns `InvalidConfig` if no rule has the id.
    pub fn get_rule(&self, id: &str) -> EngineResult<&SalaryRule> {
        self.config
            .rules()
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| EngineError::InvalidConfig {
                message: format!("no rule with id '{}'", id),
            })
    }
}

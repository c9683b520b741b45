//! Application state for the pilot pay API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::SalaryConfig;
use crate::directory::AirportDirectory;

/// Shared application state.
///
/// Holds the reference data every request reads: the salary configuration
/// and the airport directory. Both are immutable and shared without locks.
#[derive(Clone)]
pub struct AppState {
    /// The loaded salary configuration.
    config: Arc<SalaryConfig>,
    /// The loaded airport directory.
    directory: Arc<AirportDirectory>,
}

impl AppState {
    /// Creates a new application state from loaded reference data.
    pub fn new(config: SalaryConfig, directory: AirportDirectory) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
        }
    }

    /// Returns the salary configuration.
    pub fn config(&self) -> &SalaryConfig {
        &self.config
    }

    /// Returns the airport directory.
    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }
}

//! Airport reference record.

use serde::{Deserialize, Serialize};

/// Static metadata for one airport in the reference table.
///
/// Records are created when the [`AirportDirectory`](crate::directory::AirportDirectory)
/// is loaded and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    /// The IATA code, upper-cased. Unique within a directory.
    pub code: String,
    /// The airport name, empty when the table does not provide one.
    #[serde(default)]
    pub name: String,
    /// The ISO country code.
    #[serde(default)]
    pub country: String,
    /// A free-form region label used by salary rules (e.g. "EU", "UK").
    #[serde(default)]
    pub region: String,
    /// The IANA time zone name.
    #[serde(default)]
    pub timezone: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl AirportRecord {
    /// Returns true if the airport is in the given region (case-insensitive).
    pub fn in_region(&self, region: &str) -> bool {
        !self.region.is_empty() && self.region.eq_ignore_ascii_case(region)
    }

    /// Returns true if the airport is in the given country (case-insensitive).
    pub fn in_country(&self, country: &str) -> bool {
        !self.country.is_empty() && self.country.eq_ignore_ascii_case(country)
    }
}

//! Airport reference directory.
//!
//! The directory maps airport codes to [`AirportRecord`]s loaded once from a
//! delimited table. The loader accepts the layouts crews actually keep:
//! `;`, `,` or tab separated, `code`/`iata_code`/`IATA` key columns, and
//! decimal commas in coordinates.

mod distance;

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::AirportRecord;

pub use distance::{EARTH_RADIUS_NM, great_circle_nm};

/// Delimiters tried in order when reading an airport table.
const DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

/// Read-only lookup from airport code to metadata.
///
/// # Example
///
/// ```no_run
/// use pilot_pay::directory::AirportDirectory;
///
/// let directory = AirportDirectory::load("./data/airports.csv")?;
/// let jfk = directory.lookup("JFK")?;
/// let lax = directory.lookup("LAX")?;
/// println!("{:.0} NM", directory.distance_nm(jfk, lax));
/// # Ok::<(), pilot_pay::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: HashMap<String, AirportRecord>,
}

/// Column positions resolved from a header row.
struct Columns {
    code: usize,
    latitude: usize,
    longitude: usize,
    name: Option<usize>,
    country: Option<usize>,
    region: Option<usize>,
    timezone: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::ByteRecord) -> Option<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_ascii_lowercase())
            .collect();
        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

        Some(Self {
            code: find(&["code", "iata", "iata_code"])?,
            latitude: find(&["latitude", "lat"])?,
            longitude: find(&["longitude", "long", "lon", "lng"])?,
            name: find(&["name", "airport", "airport_name"]),
            country: find(&["country", "country_code", "iso_country"]),
            region: find(&["region"]),
            timezone: find(&["timezone", "time_zone", "tz"]),
        })
    }
}

impl AirportDirectory {
    /// Loads the directory from a delimited file.
    ///
    /// # Errors
    ///
    /// Returns `AirportDataError` if the file cannot be read, no delimiter
    /// yields the required code/latitude/longitude columns, or a coordinate
    /// is not a number.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let bytes = fs::read(path).map_err(|e| EngineError::AirportDataError {
            path: source.clone(),
            message: e.to_string(),
        })?;

        let directory = Self::from_bytes(&bytes, &source)?;
        info!(path = %source, airports = directory.len(), "Airport directory loaded");
        Ok(directory)
    }

    /// Reads the whole table from `reader` and parses it.
    ///
    /// The delimiter is sniffed by re-reading the table, so the input is
    /// buffered first.
    pub fn from_reader<R: Read>(mut reader: R, source: &str) -> EngineResult<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| EngineError::AirportDataError {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        Self::from_bytes(&bytes, source)
    }

    /// Parses the directory from in-memory table bytes.
    ///
    /// `source` labels the data in error messages.
    pub fn from_bytes(bytes: &[u8], source: &str) -> EngineResult<Self> {
        for delimiter in DELIMITERS {
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_reader(bytes);

            let headers = match reader.byte_headers() {
                Ok(headers) => headers.clone(),
                Err(_) => continue,
            };
            let Some(columns) = Columns::resolve(&headers) else {
                continue;
            };

            debug!(
                source,
                delimiter = %char::from(delimiter).escape_default(),
                "Airport table header recognised"
            );
            return Self::read_rows(&mut reader, &columns, source);
        }

        Err(EngineError::AirportDataError {
            path: source.to_string(),
            message: "no code/latitude/longitude header found".to_string(),
        })
    }

    fn read_rows(
        reader: &mut csv::Reader<&[u8]>,
        columns: &Columns,
        source: &str,
    ) -> EngineResult<Self> {
        let mut airports = HashMap::new();

        for result in reader.byte_records() {
            let record = result.map_err(|e| EngineError::AirportDataError {
                path: source.to_string(),
                message: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |idx: usize| {
                record
                    .get(idx)
                    .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
                    .unwrap_or_default()
            };
            let optional = |idx: Option<usize>| idx.map(field).unwrap_or_default();

            let code = field(columns.code).to_ascii_uppercase();
            if code.is_empty() {
                continue;
            }

            let coordinate = |idx: usize, label: &str| -> EngineResult<f64> {
                let raw = field(idx);
                raw.replace(',', ".")
                    .parse::<f64>()
                    .map_err(|_| EngineError::AirportDataError {
                        path: source.to_string(),
                        message: format!("line {}: invalid {} '{}' for {}", line, label, raw, code),
                    })
            };

            let airport = AirportRecord {
                latitude: coordinate(columns.latitude, "latitude")?,
                longitude: coordinate(columns.longitude, "longitude")?,
                name: optional(columns.name),
                country: optional(columns.country),
                region: optional(columns.region),
                timezone: optional(columns.timezone),
                code: code.clone(),
            };

            if airports.insert(code.clone(), airport).is_some() {
                debug!(code = %code, line, "Duplicate airport code; later row wins");
            }
        }

        Ok(Self { airports })
    }

    /// Builds a directory from records, keyed by upper-cased code.
    pub fn from_records(records: impl IntoIterator<Item = AirportRecord>) -> Self {
        let airports = records
            .into_iter()
            .map(|mut record| {
                record.code = record.code.trim().to_ascii_uppercase();
                (record.code.clone(), record)
            })
            .collect();
        Self { airports }
    }

    /// Looks up an airport by code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedAirport` if the code is not in the directory.
    pub fn lookup(&self, code: &str) -> EngineResult<&AirportRecord> {
        let key = code.trim().to_ascii_uppercase();
        self.airports
            .get(&key)
            .ok_or(EngineError::UnresolvedAirport { code: key })
    }

    /// Returns the great-circle distance between two airports in nautical miles.
    pub fn distance_nm(&self, from: &AirportRecord, to: &AirportRecord) -> f64 {
        great_circle_nm(from, to)
    }

    /// Returns the number of airports.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Returns true if the directory holds no airports.
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Returns all airport codes in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.airports.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

//! Export of computed pay.
//!
//! [`export`] writes bare line items; [`export_result`] writes the whole
//! calculation as a report of titled sections (summary, daily breakdown,
//! line items and issues). Both come as CSV, an XLSX workbook or a
//! fixed-width text table, use the same column order for line items, and
//! are byte-identical for identical input.

mod csv;
mod report;
mod spreadsheet;
mod text;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::PayLineItem;

pub use self::csv::{sections_to_csv, to_csv};
pub use self::report::{ISSUES_HEADER, export_result, report_sections};
pub use self::spreadsheet::{sections_to_spreadsheet, to_spreadsheet};
pub use self::text::{sections_to_text, to_text};

/// Column headers shared by every export format.
pub const COLUMNS: [&str; 13] = [
    "date",
    "flight",
    "departure",
    "arrival",
    "kind",
    "hours",
    "distance_nm",
    "rule",
    "basis",
    "units",
    "rate",
    "overtime_units",
    "amount",
];

/// One cell of an exported table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Written as a string.
    Text(String),
    /// Written as a number; right-aligned in text tables.
    Number(Decimal),
}

impl Cell {
    /// Returns the cell as it appears in CSV and text output.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => value.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

/// A titled table of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Lowercase section name, written as `[name]` in CSV and text.
    pub name: &'static str,
    /// Worksheet name in XLSX.
    pub sheet: &'static str,
    /// Column headers.
    pub headers: Vec<&'static str>,
    /// Table rows.
    pub rows: Vec<Vec<Cell>>,
}

/// The output format of an export.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Excel workbook.
    Xlsx,
    /// Fixed-width plain text table.
    Text,
}

impl ExportFormat {
    /// Returns the lowercase format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Text => "text",
        }
    }

    /// Returns the MIME type of the artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    /// Returns the file extension of the artifact.
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(EngineError::ExportFailure {
                format: other.to_string(),
                message: "unknown export format".to_string(),
            }),
        }
    }
}

/// Writes line items in the requested format.
///
/// # Example
///
/// ```
/// use pilot_pay::export::{ExportFormat, export};
///
/// let bytes = export(&[], ExportFormat::Csv)?;
/// assert!(bytes.starts_with(b"date,flight,departure"));
/// # Ok::<(), pilot_pay::error::EngineError>(())
/// ```
pub fn export(items: &[PayLineItem], format: ExportFormat) -> EngineResult<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(items)?,
        ExportFormat::Xlsx => to_spreadsheet(items)?,
        ExportFormat::Text => to_text(items)?,
    };

    info!(format = %format, rows = items.len(), bytes = bytes.len(), "Export written");
    Ok(bytes)
}

/// Renders one line item as cells in [`COLUMNS`] order.
pub(crate) fn row_cells(item: &PayLineItem) -> Vec<Cell> {
    vec![
        item.duty.date.to_string().into(),
        item.duty.flight_number.as_str().into(),
        item.duty.departure.as_str().into(),
        item.duty.arrival.as_str().into(),
        item.duty.kind.as_str().into(),
        item.hours.into(),
        item.distance_nm.into(),
        item.rule_id.as_str().into(),
        item.basis.as_str().into(),
        item.units.into(),
        item.rate.into(),
        item.overtime_units.into(),
        item.amount.into(),
    ]
}

pub(crate) fn failure(format: ExportFormat, error: impl fmt::Display) -> EngineError {
    EngineError::ExportFailure {
        format: format.as_str().to_string(),
        message: error.to_string(),
    }
}

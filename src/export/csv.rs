//! CSV export.

use crate::error::EngineResult;
use crate::models::PayLineItem;

use super::{COLUMNS, Cell, ExportFormat, Section, failure, row_cells};

fn rendered(cells: &[Cell]) -> Vec<String> {
    cells.iter().map(Cell::render).collect()
}

/// Writes line items as CSV with a header row.
///
/// An empty slice produces the header row only.
pub fn to_csv(items: &[PayLineItem]) -> EngineResult<Vec<u8>> {
    let fail = |e| failure(ExportFormat::Csv, e);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(COLUMNS).map_err(fail)?;
    for item in items {
        writer.write_record(rendered(&row_cells(item))).map_err(fail)?;
    }

    writer
        .into_inner()
        .map_err(|e| failure(ExportFormat::Csv, e))
}

/// Writes report sections into one CSV document.
///
/// Each section starts with a single-field `[name]` record, followed by its
/// header and rows. Sections have different widths, so records are not
/// padded to a common length.
pub fn sections_to_csv(sections: &[Section]) -> EngineResult<Vec<u8>> {
    let fail = |e| failure(ExportFormat::Csv, e);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for section in sections {
        writer
            .write_record([format!("[{}]", section.name)])
            .map_err(fail)?;
        writer.write_record(&section.headers).map_err(fail)?;
        for row in &section.rows {
            writer.write_record(rendered(row)).map_err(fail)?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| failure(ExportFormat::Csv, e))
}

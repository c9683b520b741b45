//! XLSX export.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, FormatBorder, Workbook};

use crate::error::{EngineError, EngineResult};
use crate::models::PayLineItem;

use super::{COLUMNS, Cell, ExportFormat, Section, failure, row_cells};

const SHEET_NAME: &str = "Pay";

fn fail(error: impl std::fmt::Display) -> EngineError {
    failure(ExportFormat::Xlsx, error)
}

fn number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Creates a workbook whose creation time is pinned, so identical input
/// yields an identical file.
fn pinned_workbook() -> EngineResult<Workbook> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1).map_err(fail)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    Ok(workbook)
}

/// Adds one sheet with a bold frozen header row.
fn add_sheet(
    workbook: &mut Workbook,
    sheet: &str,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> EngineResult<()> {
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let text_format = Format::new().set_border(FormatBorder::Thin);
    let number_format = Format::new()
        .set_num_format("0.00")
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(fail)?;

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(fail)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(fail)?;

    for (idx, cells) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, cell) in cells.iter().enumerate().take(headers.len()) {
            widths[col] = widths[col].max(cell.render().len());
            match cell {
                Cell::Number(value) => {
                    worksheet
                        .write_number_with_format(row, col as u16, number(*value), &number_format)
                        .map_err(fail)?;
                }
                Cell::Text(text) => {
                    worksheet
                        .write_string_with_format(row, col as u16, text, &text_format)
                        .map_err(fail)?;
                }
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width as f64 + 2.0)
            .map_err(fail)?;
    }
    Ok(())
}

/// Writes line items as a single-sheet XLSX workbook.
///
/// An empty slice produces a sheet with the header row only.
pub fn to_spreadsheet(items: &[PayLineItem]) -> EngineResult<Vec<u8>> {
    let rows: Vec<Vec<Cell>> = items.iter().map(row_cells).collect();
    let mut workbook = pinned_workbook()?;
    add_sheet(&mut workbook, SHEET_NAME, &COLUMNS, &rows)?;
    workbook.save_to_buffer().map_err(fail)
}

/// Writes report sections as a workbook with one sheet per section.
pub fn sections_to_spreadsheet(sections: &[Section]) -> EngineResult<Vec<u8>> {
    let mut workbook = pinned_workbook()?;
    for section in sections {
        add_sheet(&mut workbook, section.sheet, &section.headers, &section.rows)?;
    }
    workbook.save_to_buffer().map_err(fail)
}

//! Fixed-width text export.

use std::fmt::{self, Write};

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::PayLineItem;

use super::{COLUMNS, Cell, ExportFormat, Section, failure, row_cells};

/// A table laid out for fixed-width output.
///
/// Columns holding numbers are right-aligned, header included.
struct Table<'a> {
    headers: &'a [&'a str],
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
    right: Vec<bool>,
}

impl<'a> Table<'a> {
    fn new(headers: &'a [&'a str], cells: &[Vec<Cell>]) -> Self {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        let mut right = vec![false; headers.len()];
        let mut rows = Vec::with_capacity(cells.len());

        for row in cells {
            let mut rendered = Vec::with_capacity(row.len());
            for (col, cell) in row.iter().enumerate().take(headers.len()) {
                let text = cell.render();
                widths[col] = widths[col].max(text.chars().count());
                right[col] |= matches!(cell, Cell::Number(_));
                rendered.push(text);
            }
            rows.push(rendered);
        }

        Self {
            headers,
            rows,
            widths,
            right,
        }
    }

    fn rule(&self) -> String {
        let gaps = 2 * self.widths.len().saturating_sub(1);
        "-".repeat(self.widths.iter().sum::<usize>() + gaps)
    }

    fn write_row<S: AsRef<str>>(&self, out: &mut String, cells: &[S]) -> fmt::Result {
        let mut line = String::new();
        for (col, (cell, &width)) in cells.iter().zip(&self.widths).enumerate() {
            if col > 0 {
                line.push_str("  ");
            }
            if self.right[col] {
                write!(line, "{:>width$}", cell.as_ref(), width = width)?;
            } else {
                write!(line, "{:<width$}", cell.as_ref(), width = width)?;
            }
        }
        writeln!(out, "{}", line.trim_end())
    }

    /// Writes the header, a rule and the rows.
    fn write(&self, out: &mut String) -> fmt::Result {
        self.write_row(out, self.headers)?;
        writeln!(out, "{}", self.rule())?;
        for row in &self.rows {
            self.write_row(out, row)?;
        }
        Ok(())
    }
}

fn render_items(items: &[PayLineItem]) -> Result<String, fmt::Error> {
    let cells: Vec<Vec<Cell>> = items.iter().map(row_cells).collect();
    let table = Table::new(&COLUMNS, &cells);
    let total: Decimal = items.iter().map(|item| item.amount).sum();

    let mut out = String::new();
    table.write(&mut out)?;
    writeln!(out, "{}", table.rule())?;
    writeln!(out, "{} line items, total {:.2}", items.len(), total)?;
    Ok(out)
}

/// Writes line items as a fixed-width table followed by a total line.
///
/// An empty slice produces the header and a zero total.
pub fn to_text(items: &[PayLineItem]) -> EngineResult<Vec<u8>> {
    render_items(items)
        .map(String::into_bytes)
        .map_err(|e| failure(ExportFormat::Text, e))
}

fn render_sections(sections: &[Section]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(out, "[{}]", section.name)?;
        Table::new(&section.headers, &section.rows).write(&mut out)?;
    }
    Ok(out)
}

/// Writes report sections as consecutive fixed-width tables.
pub fn sections_to_text(sections: &[Section]) -> EngineResult<Vec<u8>> {
    render_sections(sections)
        .map(String::into_bytes)
        .map_err(|e| failure(ExportFormat::Text, e))
}

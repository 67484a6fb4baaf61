//! Spreadsheet loading and fixed-width rendering.
//!
//! Spreadsheets bypass the vision model entirely: the first worksheet (or the
//! CSV file) is read as a row/column table and rendered as aligned plain
//! text, header row first. Numeric cells are right-aligned and text cells
//! left-aligned so columns stay readable for the text-generation model.

use crate::error::InvoiceError;
use crate::pipeline::format::SpreadsheetKind;
use calamine::{open_workbook_auto, Reader};
use std::path::Path;
use tracing::debug;

/// A rectangular table; row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Load `path` and render it as fixed-width text.
///
/// Runs on the blocking pool; both readers do synchronous file I/O.
pub async fn spreadsheet_text(path: &Path, kind: SpreadsheetKind) -> Result<String, InvoiceError> {
    let path = path.to_path_buf();
    let table = tokio::task::spawn_blocking(move || load_table(&path, kind))
        .await
        .map_err(|e| InvoiceError::Internal(format!("Spreadsheet task panicked: {e}")))??;

    debug!(
        "Loaded spreadsheet: {} rows × {} columns",
        table.rows.len(),
        table.column_count()
    );
    Ok(render_fixed_width(&table))
}

/// Read the table from disk, dropping fully blank rows.
pub fn load_table(path: &Path, kind: SpreadsheetKind) -> Result<Table, InvoiceError> {
    let rows = match kind {
        SpreadsheetKind::Workbook => load_workbook(path)?,
        SpreadsheetKind::Csv => load_csv(path)?,
    };

    Ok(Table {
        rows: rows
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .collect(),
    })
}

fn load_workbook(path: &Path) -> Result<Vec<Vec<String>>, InvoiceError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| InvoiceError::Spreadsheet {
        detail: e.to_string(),
    })?;

    let names = workbook.sheet_names().to_owned();
    let first = names.first().ok_or_else(|| InvoiceError::Spreadsheet {
        detail: "workbook has no sheets".into(),
    })?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| InvoiceError::Spreadsheet {
            detail: e.to_string(),
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

fn load_csv(path: &Path) -> Result<Vec<Vec<String>>, InvoiceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| InvoiceError::Spreadsheet {
            detail: e.to_string(),
        })?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(|s| s.trim().to_string()).collect())
                .map_err(|e| InvoiceError::Spreadsheet {
                    detail: e.to_string(),
                })
        })
        .collect()
}

/// Render `table` with every column padded to its widest cell.
///
/// Columns are separated by a single space; trailing padding is trimmed.
pub fn render_fixed_width(table: &Table) -> String {
    let columns = table.column_count();
    let mut widths = vec![0usize; columns];
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    // Header cells align with the data beneath them.
                    let right = if row_idx == 0 {
                        column_is_numeric(table, i)
                    } else {
                        is_numeric(cell)
                    };
                    if right {
                        format!("{:>width$}", cell, width = widths[i])
                    } else {
                        format!("{:<width$}", cell, width = widths[i])
                    }
                })
                .collect();
            cells.join(" ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.replace(',', "").parse::<f64>().is_ok()
}

fn column_is_numeric(table: &Table, col: usize) -> bool {
    let mut data = table
        .rows
        .iter()
        .skip(1)
        .filter_map(|r| r.get(col))
        .filter(|c| !c.is_empty())
        .peekable();
    data.peek().is_some() && data.all(|c| is_numeric(c))
}

/// Spreadsheet codec
///
/// Thin wrapper over the spreadsheet crates: reads the first worksheet of an
/// xlsx/xls/ods file into a header + rows table, and writes a table back out
/// as a single-sheet xlsx workbook.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;

use crate::error::{CatalogError, Result};

/// One spreadsheet cell, reduced to the types the catalog cares about
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell contents as text; whole numbers have no fractional part ("123")
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(v) => Cell::Number(*v),
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Bool(v) => Cell::Text(v.to_string()),
            Data::DateTime(v) => Cell::Number(v.as_f64()),
            Data::DateTimeIso(v) => Cell::Text(v.clone()),
            Data::DurationIso(v) => Cell::Text(v.clone()),
            Data::Error(v) => Cell::Text(format!("{:?}", v)),
        }
    }
}

/// A header row plus data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of a column; names are case-sensitive
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, col)`; short rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

/// Read the first worksheet; the first row names the columns.
///
/// Fully blank rows are skipped.
pub fn read_table(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CatalogError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| Cell::from(c).as_text().trim().to_string()).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(Cell::from).collect::<Vec<Cell>>())
        .filter(|r| r.iter().any(|c| !c.is_blank()))
        .collect();

    tracing::debug!("📄 Read sheet: {} columns, {} rows", columns.len(), rows.len());

    Ok(Table { columns, rows })
}

/// Write `table` as a single-sheet xlsx workbook and return its bytes
pub fn write_table(sheet_name: &str, table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name.as_str())?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col as u16, s.as_str())?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col as u16, *n)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

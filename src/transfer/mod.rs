/// Import/export adapters
///
/// This module handles:
/// - Reading and writing spreadsheet workbooks (sheet.rs)
/// - Mapping products and orders to and from rows (rows.rs)
/// - The JSON catalog document (document.rs)

pub mod document;
pub mod rows;
pub mod sheet;

use chrono::NaiveDate;

/// Fixed name of the product spreadsheet export
pub const PRODUCTS_FILENAME: &str = "products.xlsx";

/// `order_summary_2024-05-01.xlsx`
pub fn order_filename(date: NaiveDate) -> String {
    format!("order_summary_{}.xlsx", date.format("%Y-%m-%d"))
}

/// `catalog_2024-05-01.json`
pub fn document_filename(date: NaiveDate) -> String {
    format!("catalog_{}.json", date.format("%Y-%m-%d"))
}

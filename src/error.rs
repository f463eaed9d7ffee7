/// Error types for the catalog editor
///
/// Every fallible operation in the crate returns `Result<T>`. Pricing never
/// fails: numeric edge cases are reported as non-finite values instead.

use std::fmt;
use thiserror::Error;

/// A single cell that could not be parsed during an import
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// 1-based data row (the header row is not counted)
    pub row: usize,
    /// Column name as it appears in the sheet
    pub column: String,
    /// Raw cell text
    pub value: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': '{}' is not a number", self.row, self.column, self.value)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read spreadsheet: {0}")]
    SheetRead(#[from] calamine::Error),

    #[error("failed to write spreadsheet: {0}")]
    SheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("spreadsheet has no worksheets")]
    EmptyWorkbook,

    #[error("spreadsheet has none of the expected product columns")]
    MissingColumns,

    #[error("{} invalid cell(s), first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Validation(Vec<FieldError>),

    #[error("not a base64 image data URL")]
    InvalidDataUrl,

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

//! Spreadsheet interchange: xlsx export, xlsx/xls import and the blank template.

mod columns;
mod dates;
mod export;
mod import;

pub use columns::{field_for_header, Column, EXPORT_COLUMNS, INPUT_COLUMN_COUNT};
pub use dates::{normalize_date, serial_to_date};
pub use export::{export_filename, export_invoices, template_workbook};
pub use import::{
    import_invoices, is_supported_import, read_import_file, ImportWarning, ImportedRow,
    ImportedSheet, WarningKind,
};

use service_core::error::AppError;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const TEMPLATE_FILENAME: &str = "campaign-invoices-template.xlsx";
pub const DEFAULT_EXPORT_BASENAME: &str = "campaign-invoices";

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("No data to export")]
    NoData,

    #[error("File must contain a header row and at least one data row")]
    InsufficientRows,

    #[error("Workbook has no worksheets")]
    NoSheet,

    #[error("Unsupported file type '{0}': expected .xlsx or .xls")]
    UnsupportedFile(String),

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

impl From<SpreadsheetError> for AppError {
    fn from(err: SpreadsheetError) -> Self {
        match err {
            SpreadsheetError::Write(_) => AppError::InternalError(anyhow::Error::new(err)),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}

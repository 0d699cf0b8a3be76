//! Write pipeline shared by the HTTP handlers and the dashboard.
//!
//! Every create and update passes required-field validation and recomputes the
//! tax-inclusive amounts, whether it comes from the edit form or a spreadsheet.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use service_core::error::AppError;
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

use super::metrics::record_import_rows;
use super::spreadsheet::{import_invoices, ImportWarning, SpreadsheetError};
use super::store::{InvoiceStore, StoreError};
use super::tax::apply_tax;
use crate::models::{missing_field_labels, Invoice, InvoiceWrite};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Please fill in required fields: {}", missing_field_labels(.0).join(", "))]
    Validation(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("No data rows found in the file")]
    NoRowsFound,

    #[error("No valid records found: every row needs Company, Campaign Name and Customer Invoice #")]
    NoValidRecords,
}

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Validation(errors) => AppError::ValidationError(errors),
            WriteError::Store(e) => e.into(),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Spreadsheet(e) => e.into(),
            other => AppError::BadRequest(anyhow::Error::new(other)),
        }
    }
}

/// Validate a payload and bring its derived amounts up to date.
pub fn prepare_write(mut write: InvoiceWrite) -> Result<InvoiceWrite, ValidationErrors> {
    write.validate()?;
    apply_tax(&mut write);
    write.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    Ok(write)
}

#[instrument(skip(store, write))]
pub async fn create_invoice(
    store: &dyn InvoiceStore,
    write: InvoiceWrite,
) -> Result<Invoice, WriteError> {
    let write = prepare_write(write).map_err(WriteError::Validation)?;
    Ok(store.create(&write).await?)
}

#[instrument(skip(store, write))]
pub async fn update_invoice(
    store: &dyn InvoiceStore,
    id: &str,
    write: InvoiceWrite,
) -> Result<Invoice, WriteError> {
    let write = prepare_write(write).map_err(WriteError::Validation)?;
    Ok(store.update(id, &write).await?)
}

/// A row that reached the store and was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row_number: usize,
    pub reason: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    /// Rows without company, campaign name or customer invoice number.
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn message(&self) -> String {
        if self.failed > 0 {
            format!(
                "Imported {} records successfully. {} failed.",
                self.imported, self.failed
            )
        } else {
            format!("Imported {} records successfully.", self.imported)
        }
    }
}

/// Parse a workbook and create one invoice per usable row, in sheet order.
///
/// Rows are written one at a time and nothing is rolled back: a failing row
/// is counted and the rest continue.
#[instrument(skip(store, bytes), fields(size = bytes.len()))]
pub async fn import_bytes(
    store: &dyn InvoiceStore,
    bytes: &[u8],
) -> Result<ImportReport, ImportError> {
    let sheet = import_invoices(bytes)?;
    if sheet.rows.is_empty() {
        return Err(ImportError::NoRowsFound);
    }

    let mut report = ImportReport {
        warnings: sheet.warnings().cloned().collect(),
        ..Default::default()
    };
    let (usable, incomplete): (Vec<_>, Vec<_>) = sheet
        .rows
        .into_iter()
        .partition(|row| row.invoice.has_identity());
    report.skipped = incomplete.len();
    if usable.is_empty() {
        record_import_rows("skipped", report.skipped);
        return Err(ImportError::NoValidRecords);
    }

    for row in usable {
        let write = InvoiceWrite::from(&row.invoice);
        match create_invoice(store, write).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!(row = row.row_number, error = %e, "Import row failed");
                report.failed += 1;
                report.failures.push(RowFailure {
                    row_number: row.row_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    record_import_rows("imported", report.imported);
    record_import_rows("failed", report.failed);
    record_import_rows("skipped", report.skipped);
    info!(
        imported = report.imported,
        failed = report.failed,
        skipped = report.skipped,
        warnings = report.warnings.len(),
        "Import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryInvoiceStore;
    use rust_decimal_macros::dec;

    fn complete() -> InvoiceWrite {
        InvoiceWrite {
            company: "Acme".to_string(),
            campaign_name: "Spring".to_string(),
            date_from: "2024-03-01".to_string(),
            date_to: "2024-03-31".to_string(),
            customer_invoice_number: "INV-1".to_string(),
            customer_amount_without_tax: dec!(1000),
            customer_amount_with_tax: dec!(5),
            ..Default::default()
        }
    }

    #[test]
    fn prepare_recomputes_tax_and_stamps_update() {
        let prepared = prepare_write(complete()).unwrap();
        assert_eq!(prepared.customer_amount_with_tax, dec!(1180));
        assert!(prepared.updated_at.is_some());
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_with_labels() {
        let store = MemoryInvoiceStore::new();
        let write = InvoiceWrite {
            company: "Acme".to_string(),
            ..Default::default()
        };
        let err = create_invoice(&store, write).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in required fields: Campaign Name, Customer Invoice Number, From Date, To Date"
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_of_unknown_row_is_a_store_error() {
        let store = MemoryInvoiceStore::new();
        let err = update_invoice(&store, "nope", complete()).await.unwrap_err();
        assert!(matches!(err, WriteError::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn report_message_mentions_failures_only_when_present() {
        let mut report = ImportReport {
            imported: 3,
            ..Default::default()
        };
        assert_eq!(report.message(), "Imported 3 records successfully.");
        report.failed = 1;
        assert_eq!(report.message(), "Imported 3 records successfully. 1 failed.");
    }
}

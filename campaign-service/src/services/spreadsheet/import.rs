//! Workbook import: first sheet to partial invoices, with per-cell warnings.

use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use super::columns::field_for_header;
use super::dates::{normalize_date, serial_to_date};
use super::SpreadsheetError;
use crate::models::{FieldKind, InvoiceField, PartialInvoice, PaymentStatus};
use crate::services::tax::fill_missing_tax;

/// A decoded worksheet cell, independent of the workbook format.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Numeric column held text with no leading number; stored as 0.
    NotANumber,
    /// Status column held something other than Pending/Partial/Clear; left unset.
    UnknownStatus,
    /// Date column held text in no known layout; stored verbatim.
    UnparsedDate,
}

/// A value that was accepted with a fallback rather than as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    pub row_number: usize,
    pub column: String,
    pub value: String,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedRow {
    /// 1-based worksheet row, counting the header as row 1.
    pub row_number: usize,
    pub invoice: PartialInvoice,
    pub warnings: Vec<ImportWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportedSheet {
    pub rows: Vec<ImportedRow>,
}

impl ImportedSheet {
    pub fn warnings(&self) -> impl Iterator<Item = &ImportWarning> {
        self.rows.iter().flat_map(|row| row.warnings.iter())
    }
}

pub fn is_supported_import(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"))
}

/// Parse an uploaded workbook. Only the first worksheet is read.
#[instrument(skip(bytes), fields(size = bytes.len()))]
pub fn import_invoices(bytes: &[u8]) -> Result<ImportedSheet, SpreadsheetError> {
    let rows = decode_first_sheet(bytes)?;
    let sheet = map_rows(rows)?;
    debug!(rows = sheet.rows.len(), "Parsed import workbook");
    Ok(sheet)
}

/// Read a workbook from disk and parse it.
pub async fn read_import_file(path: impl AsRef<Path>) -> Result<ImportedSheet, SpreadsheetError> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    if !is_supported_import(&name) {
        return Err(SpreadsheetError::UnsupportedFile(name.into_owned()));
    }
    let bytes = tokio::fs::read(path).await?;
    import_invoices(&bytes)
}

pub(crate) fn decode_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheet)??;
    Ok(range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect())
}

pub(crate) fn map_rows(rows: Vec<Vec<Cell>>) -> Result<ImportedSheet, SpreadsheetError> {
    if rows.len() < 2 {
        return Err(SpreadsheetError::InsufficientRows);
    }
    let mut rows = rows.into_iter();
    let headers: Vec<(String, Option<InvoiceField>)> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(|cell| {
            let text = cell.display();
            let field = field_for_header(&text);
            (text, field)
        })
        .collect();

    let imported = rows
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.is_empty()))
        .map(|(index, row)| map_row(index + 2, &headers, &row))
        .collect();

    Ok(ImportedSheet { rows: imported })
}

fn map_row(
    row_number: usize,
    headers: &[(String, Option<InvoiceField>)],
    row: &[Cell],
) -> ImportedRow {
    let mut invoice = PartialInvoice::default();
    let mut warnings = Vec::new();

    for ((header, field), cell) in headers.iter().zip(row) {
        let Some(field) = field else { continue };
        if cell.is_empty() {
            continue;
        }
        let mut warn = |kind| {
            warnings.push(ImportWarning {
                row_number,
                column: header.trim().to_string(),
                value: cell.display(),
                kind,
            })
        };

        match field.kind() {
            FieldKind::Number => {
                let amount = parse_amount(cell).unwrap_or_else(|| {
                    warn(WarningKind::NotANumber);
                    Decimal::ZERO
                });
                set_amount(&mut invoice, *field, amount);
            }
            FieldKind::Status => match PaymentStatus::parse(&cell.display()) {
                Some(status) => set_status(&mut invoice, *field, status),
                None => warn(WarningKind::UnknownStatus),
            },
            FieldKind::Date => {
                let parsed = match cell {
                    Cell::Number(serial) => serial_to_date(*serial),
                    other => normalize_date(&other.display()),
                };
                let date = parsed.unwrap_or_else(|| {
                    warn(WarningKind::UnparsedDate);
                    cell.display()
                });
                set_text(&mut invoice, *field, date);
            }
            FieldKind::Text | FieldKind::Timestamp => {
                set_text(&mut invoice, *field, cell.display())
            }
        }
    }

    fill_missing_tax(&mut invoice);
    ImportedRow {
        row_number,
        invoice,
        warnings,
    }
}

fn parse_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(*n)),
        Cell::Text(text) => leading_number(text),
        Cell::Bool(_) | Cell::Empty => None,
    }
}

/// The longest numeric prefix of `text`, after leading whitespace.
/// `"1500 INR"` yields 1500; `"INR 1500"` yields nothing.
fn leading_number(text: &str) -> Option<Decimal> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut digits = 0;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    let prefix = text[..end].trim_start_matches('+').trim_end_matches('.');
    Decimal::from_str(prefix).ok()
}

fn set_amount(invoice: &mut PartialInvoice, field: InvoiceField, amount: Decimal) {
    let slot = match field {
        InvoiceField::CustomerAmountWithoutTax => &mut invoice.customer_amount_without_tax,
        InvoiceField::CustomerAmountWithTax => &mut invoice.customer_amount_with_tax,
        InvoiceField::CustomerReceivedAmountWithoutTax => {
            &mut invoice.customer_received_amount_without_tax
        }
        InvoiceField::CustomerReceivedAmountWithTax => {
            &mut invoice.customer_received_amount_with_tax
        }
        InvoiceField::VendorAmountWithoutTax => &mut invoice.vendor_amount_without_tax,
        InvoiceField::VendorAmountWithTax => &mut invoice.vendor_amount_with_tax,
        InvoiceField::VendorPaidAmountWithoutTax => &mut invoice.vendor_paid_amount_without_tax,
        InvoiceField::VendorPaidAmountWithTax => &mut invoice.vendor_paid_amount_with_tax,
        _ => return,
    };
    *slot = Some(amount);
}

fn set_status(invoice: &mut PartialInvoice, field: InvoiceField, status: PaymentStatus) {
    match field {
        InvoiceField::CustomerPaymentStatus => invoice.customer_payment_status = Some(status),
        InvoiceField::VendorPaymentStatus => invoice.vendor_payment_status = Some(status),
        _ => {}
    }
}

fn set_text(invoice: &mut PartialInvoice, field: InvoiceField, value: String) {
    let slot = match field {
        InvoiceField::Company => &mut invoice.company,
        InvoiceField::CampaignName => &mut invoice.campaign_name,
        InvoiceField::DateFrom => &mut invoice.date_from,
        InvoiceField::DateTo => &mut invoice.date_to,
        InvoiceField::CustomerInvoiceNumber => &mut invoice.customer_invoice_number,
        InvoiceField::CustomerPaymentDate => &mut invoice.customer_payment_date,
        InvoiceField::CustomerRemarks => &mut invoice.customer_remarks,
        InvoiceField::VendorName => &mut invoice.vendor_name,
        InvoiceField::VendorInvoiceNumber => &mut invoice.vendor_invoice_number,
        InvoiceField::VendorPaymentDate => &mut invoice.vendor_payment_date,
        InvoiceField::VendorRemarks => &mut invoice.vendor_remarks,
        _ => return,
    };
    *slot = Some(value);
}

//! Workbook export: invoice sheets, the blank template and dated filenames.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::debug;

use super::columns::{Column, EXPORT_COLUMNS, INPUT_COLUMN_COUNT};
use super::SpreadsheetError;
use crate::models::{FieldValue, Invoice, PaymentStatus};

const EXPORT_SHEET: &str = "Campaign Invoices";
const TEMPLATE_SHEET: &str = "Template";
const MIN_COLUMN_WIDTH: usize = 15;

/// Write `records` to a single-sheet xlsx workbook, one row per invoice in
/// input order.
pub fn export_invoices(records: &[Invoice]) -> Result<Vec<u8>, SpreadsheetError> {
    if records.is_empty() {
        return Err(SpreadsheetError::NoData);
    }
    let bytes = write_workbook(EXPORT_SHEET, &EXPORT_COLUMNS, records)?;
    debug!(rows = records.len(), size = bytes.len(), "Exported invoices");
    Ok(bytes)
}

/// Blank import template: the input columns plus one illustrative row.
pub fn template_workbook() -> Result<Vec<u8>, SpreadsheetError> {
    let example = example_invoice();
    Ok(write_workbook(
        TEMPLATE_SHEET,
        &EXPORT_COLUMNS[..INPUT_COLUMN_COUNT],
        std::slice::from_ref(&example),
    )?)
}

/// `<base>-<YYYY-MM-DD>.xlsx`
pub fn export_filename(base: &str, date: NaiveDate) -> String {
    format!("{}-{}.xlsx", base, date.format("%Y-%m-%d"))
}

fn write_workbook(
    sheet_name: &str,
    columns: &[Column],
    records: &[Invoice],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string(0, col, column.header)?;
        let width = column.header.len().max(MIN_COLUMN_WIDTH);
        worksheet.set_column_width(col, width as f64)?;
    }

    for (index, invoice) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            if let Some(value) = invoice.field_value(column.field) {
                write_cell(worksheet, row, col as u16, &value)?;
            }
        }
    }

    workbook.save_to_buffer()
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &FieldValue<'_>,
) -> Result<(), XlsxError> {
    match value {
        FieldValue::Number(n) => {
            worksheet.write_number(row, col, n.to_f64().unwrap_or_default())?;
        }
        FieldValue::Text("") => {}
        FieldValue::Text(s) => {
            worksheet.write_string(row, col, *s)?;
        }
        FieldValue::Status(status) => {
            worksheet.write_string(row, col, status.as_str())?;
        }
    }
    Ok(())
}

fn example_invoice() -> Invoice {
    let mut invoice = Invoice::draft(None);
    invoice.company = "Example Company".to_string();
    invoice.campaign_name = "Example Campaign".to_string();
    invoice.date_from = "2024-01-01".to_string();
    invoice.date_to = "2024-01-31".to_string();
    invoice.customer_invoice_number = "INV-001".to_string();
    invoice.customer_amount_without_tax = Decimal::from(10_000);
    invoice.customer_amount_with_tax = Decimal::from(11_800);
    invoice.customer_received_amount_without_tax = Decimal::from(10_000);
    invoice.customer_received_amount_with_tax = Decimal::from(11_800);
    invoice.customer_payment_status = PaymentStatus::Clear;
    invoice.customer_payment_date = Some("2024-01-15".to_string());
    invoice.customer_remarks = "Payment received via HDFC".to_string();
    invoice.vendor_name = "Example Vendor".to_string();
    invoice.vendor_invoice_number = "V-001".to_string();
    invoice.vendor_amount_without_tax = Decimal::from(7_000);
    invoice.vendor_amount_with_tax = Decimal::from(8_260);
    invoice.vendor_paid_amount_without_tax = Decimal::from(7_000);
    invoice.vendor_paid_amount_with_tax = Decimal::from(8_260);
    invoice.vendor_payment_status = PaymentStatus::Clear;
    invoice.vendor_payment_date = Some("2024-01-10".to_string());
    invoice.vendor_remarks = "Payment made via bank transfer".to_string();
    invoice
}

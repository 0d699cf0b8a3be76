//! Spreadsheet column layout: export order, importable columns and header aliases.

use crate::models::InvoiceField;

/// One spreadsheet column: its header text and the invoice field behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: InvoiceField,
}

const fn col(header: &'static str, field: InvoiceField) -> Column {
    Column { header, field }
}

/// Export layout, in order. The first [`INPUT_COLUMN_COUNT`] columns are the
/// user-supplied ones that the template carries and import reads back.
pub const EXPORT_COLUMNS: [Column; 25] = [
    col("Company", InvoiceField::Company),
    col("Campaign Name", InvoiceField::CampaignName),
    col("Date From", InvoiceField::DateFrom),
    col("Date To", InvoiceField::DateTo),
    col("Customer Invoice #", InvoiceField::CustomerInvoiceNumber),
    col("Customer Amount (W/T)", InvoiceField::CustomerAmountWithoutTax),
    col("Customer Amount (With Tax)", InvoiceField::CustomerAmountWithTax),
    col("Customer Received (W/T)", InvoiceField::CustomerReceivedAmountWithoutTax),
    col("Customer Received (With Tax)", InvoiceField::CustomerReceivedAmountWithTax),
    col("Customer Payment Status", InvoiceField::CustomerPaymentStatus),
    col("Customer Payment Date", InvoiceField::CustomerPaymentDate),
    col("Customer Remarks", InvoiceField::CustomerRemarks),
    col("Vendor Name", InvoiceField::VendorName),
    col("Vendor Invoice #", InvoiceField::VendorInvoiceNumber),
    col("Vendor Amount (W/T)", InvoiceField::VendorAmountWithoutTax),
    col("Vendor Amount (With Tax)", InvoiceField::VendorAmountWithTax),
    col("Vendor Paid (W/T)", InvoiceField::VendorPaidAmountWithoutTax),
    col("Vendor Paid (With Tax)", InvoiceField::VendorPaidAmountWithTax),
    col("Vendor Payment Status", InvoiceField::VendorPaymentStatus),
    col("Vendor Payment Date", InvoiceField::VendorPaymentDate),
    col("Vendor Remarks", InvoiceField::VendorRemarks),
    col("Profit", InvoiceField::Profit),
    col("Margin (%)", InvoiceField::Margin),
    col("Created At", InvoiceField::CreatedAt),
    col("Updated At", InvoiceField::UpdatedAt),
];

pub const INPUT_COLUMN_COUNT: usize = 21;

/// Alternate header spellings accepted on import.
const ALIASES: [(&str, InvoiceField); 6] = [
    ("customer invoice number", InvoiceField::CustomerInvoiceNumber),
    ("customer amount without tax", InvoiceField::CustomerAmountWithoutTax),
    ("customer received without tax", InvoiceField::CustomerReceivedAmountWithoutTax),
    ("vendor invoice number", InvoiceField::VendorInvoiceNumber),
    ("vendor amount without tax", InvoiceField::VendorAmountWithoutTax),
    ("vendor paid without tax", InvoiceField::VendorPaidAmountWithoutTax),
];

/// The importable field for a header cell, matched case-insensitively after
/// trimming. Derived columns and timestamps are never imported.
pub fn field_for_header(header: &str) -> Option<InvoiceField> {
    let wanted = header.trim().to_lowercase();
    EXPORT_COLUMNS[..INPUT_COLUMN_COUNT]
        .iter()
        .map(|c| (c.header, c.field))
        .chain(ALIASES)
        .find(|(name, _)| name.to_lowercase() == wanted)
        .map(|(_, field)| field)
}

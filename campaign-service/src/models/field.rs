//! Field descriptors for campaign invoices.
//!
//! Every column carries an explicit [`FieldKind`], so sorting and editing
//! dispatch on the declared type instead of guessing from the column name.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{Invoice, PaymentStatus};

/// Value type of an invoice column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Calendar date stored as `YYYY-MM-DD` text.
    Date,
    /// Point in time stored as RFC 3339 text.
    Timestamp,
    Status,
}

/// Every column of [`Invoice`], keyed by its snake_case column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceField {
    Id,
    Company,
    CampaignName,
    DateFrom,
    DateTo,
    CustomerInvoiceNumber,
    CustomerAmountWithoutTax,
    CustomerAmountWithTax,
    CustomerReceivedAmountWithoutTax,
    CustomerReceivedAmountWithTax,
    CustomerPaymentStatus,
    CustomerPaymentDate,
    CustomerRemarks,
    VendorName,
    VendorInvoiceNumber,
    VendorAmountWithoutTax,
    VendorAmountWithTax,
    VendorPaidAmountWithoutTax,
    VendorPaidAmountWithTax,
    VendorPaymentStatus,
    VendorPaymentDate,
    VendorRemarks,
    Profit,
    Margin,
    CreatedAt,
    UpdatedAt,
}

impl InvoiceField {
    pub const ALL: [InvoiceField; 26] = [
        InvoiceField::Id,
        InvoiceField::Company,
        InvoiceField::CampaignName,
        InvoiceField::DateFrom,
        InvoiceField::DateTo,
        InvoiceField::CustomerInvoiceNumber,
        InvoiceField::CustomerAmountWithoutTax,
        InvoiceField::CustomerAmountWithTax,
        InvoiceField::CustomerReceivedAmountWithoutTax,
        InvoiceField::CustomerReceivedAmountWithTax,
        InvoiceField::CustomerPaymentStatus,
        InvoiceField::CustomerPaymentDate,
        InvoiceField::CustomerRemarks,
        InvoiceField::VendorName,
        InvoiceField::VendorInvoiceNumber,
        InvoiceField::VendorAmountWithoutTax,
        InvoiceField::VendorAmountWithTax,
        InvoiceField::VendorPaidAmountWithoutTax,
        InvoiceField::VendorPaidAmountWithTax,
        InvoiceField::VendorPaymentStatus,
        InvoiceField::VendorPaymentDate,
        InvoiceField::VendorRemarks,
        InvoiceField::Profit,
        InvoiceField::Margin,
        InvoiceField::CreatedAt,
        InvoiceField::UpdatedAt,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            InvoiceField::Id => "id",
            InvoiceField::Company => "company",
            InvoiceField::CampaignName => "campaign_name",
            InvoiceField::DateFrom => "date_from",
            InvoiceField::DateTo => "date_to",
            InvoiceField::CustomerInvoiceNumber => "customer_invoice_number",
            InvoiceField::CustomerAmountWithoutTax => "customer_amount_without_tax",
            InvoiceField::CustomerAmountWithTax => "customer_amount_with_tax",
            InvoiceField::CustomerReceivedAmountWithoutTax => {
                "customer_received_amount_without_tax"
            }
            InvoiceField::CustomerReceivedAmountWithTax => "customer_received_amount_with_tax",
            InvoiceField::CustomerPaymentStatus => "customer_payment_status",
            InvoiceField::CustomerPaymentDate => "customer_payment_date",
            InvoiceField::CustomerRemarks => "customer_remarks",
            InvoiceField::VendorName => "vendor_name",
            InvoiceField::VendorInvoiceNumber => "vendor_invoice_number",
            InvoiceField::VendorAmountWithoutTax => "vendor_amount_without_tax",
            InvoiceField::VendorAmountWithTax => "vendor_amount_with_tax",
            InvoiceField::VendorPaidAmountWithoutTax => "vendor_paid_amount_without_tax",
            InvoiceField::VendorPaidAmountWithTax => "vendor_paid_amount_with_tax",
            InvoiceField::VendorPaymentStatus => "vendor_payment_status",
            InvoiceField::VendorPaymentDate => "vendor_payment_date",
            InvoiceField::VendorRemarks => "vendor_remarks",
            InvoiceField::Profit => "profit",
            InvoiceField::Margin => "margin",
            InvoiceField::CreatedAt => "created_at",
            InvoiceField::UpdatedAt => "updated_at",
        }
    }

    pub fn kind(&self) -> FieldKind {
        use InvoiceField::*;
        match self {
            Id | Company | CampaignName | CustomerInvoiceNumber | CustomerRemarks | VendorName
            | VendorInvoiceNumber | VendorRemarks => FieldKind::Text,
            CustomerAmountWithoutTax
            | CustomerAmountWithTax
            | CustomerReceivedAmountWithoutTax
            | CustomerReceivedAmountWithTax
            | VendorAmountWithoutTax
            | VendorAmountWithTax
            | VendorPaidAmountWithoutTax
            | VendorPaidAmountWithTax
            | Profit
            | Margin => FieldKind::Number,
            DateFrom | DateTo | CustomerPaymentDate | VendorPaymentDate => FieldKind::Date,
            CreatedAt | UpdatedAt => FieldKind::Timestamp,
            CustomerPaymentStatus | VendorPaymentStatus => FieldKind::Status,
        }
    }

    /// Whether a user may set this field directly. Identity, derived values,
    /// timestamps and the tax-inclusive amounts are computed elsewhere.
    pub fn is_editable(&self) -> bool {
        use InvoiceField::*;
        !matches!(
            self,
            Id | Profit
                | Margin
                | CreatedAt
                | UpdatedAt
                | CustomerAmountWithTax
                | CustomerReceivedAmountWithTax
                | VendorAmountWithTax
                | VendorPaidAmountWithTax
        )
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invoice field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for InvoiceField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A borrowed, typed view of one cell of an invoice.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(Decimal),
    Status(PaymentStatus),
}

impl FieldValue<'_> {
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.normalize().to_string()),
            FieldValue::Status(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

/// Rejected edit of a single field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Field {0} is not editable")]
    ReadOnly(InvoiceField),
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: InvoiceField, value: String },
}

impl Invoice {
    /// The value of `field`, or `None` when the column is unset.
    pub fn field_value(&self, field: InvoiceField) -> Option<FieldValue<'_>> {
        use InvoiceField::*;
        let value = match field {
            Id => FieldValue::Text(&self.id),
            Company => FieldValue::Text(&self.company),
            CampaignName => FieldValue::Text(&self.campaign_name),
            DateFrom => FieldValue::Text(&self.date_from),
            DateTo => FieldValue::Text(&self.date_to),
            CustomerInvoiceNumber => FieldValue::Text(&self.customer_invoice_number),
            CustomerAmountWithoutTax => FieldValue::Number(self.customer_amount_without_tax),
            CustomerAmountWithTax => FieldValue::Number(self.customer_amount_with_tax),
            CustomerReceivedAmountWithoutTax => {
                FieldValue::Number(self.customer_received_amount_without_tax)
            }
            CustomerReceivedAmountWithTax => {
                FieldValue::Number(self.customer_received_amount_with_tax)
            }
            CustomerPaymentStatus => FieldValue::Status(self.customer_payment_status),
            CustomerPaymentDate => return self.customer_payment_date.as_deref().map(FieldValue::Text),
            CustomerRemarks => FieldValue::Text(&self.customer_remarks),
            VendorName => FieldValue::Text(&self.vendor_name),
            VendorInvoiceNumber => FieldValue::Text(&self.vendor_invoice_number),
            VendorAmountWithoutTax => FieldValue::Number(self.vendor_amount_without_tax),
            VendorAmountWithTax => FieldValue::Number(self.vendor_amount_with_tax),
            VendorPaidAmountWithoutTax => FieldValue::Number(self.vendor_paid_amount_without_tax),
            VendorPaidAmountWithTax => FieldValue::Number(self.vendor_paid_amount_with_tax),
            VendorPaymentStatus => FieldValue::Status(self.vendor_payment_status),
            VendorPaymentDate => return self.vendor_payment_date.as_deref().map(FieldValue::Text),
            VendorRemarks => FieldValue::Text(&self.vendor_remarks),
            Profit => return self.profit.map(FieldValue::Number),
            Margin => return self.margin.map(FieldValue::Number),
            CreatedAt => return self.created_at.as_deref().map(FieldValue::Text),
            UpdatedAt => return self.updated_at.as_deref().map(FieldValue::Text),
        };
        Some(value)
    }

    /// Set an editable field from user input. Numbers must parse as decimals,
    /// statuses as Pending/Partial/Clear; a blank payment date clears it.
    pub fn set_field(&mut self, field: InvoiceField, raw: &str) -> Result<(), FieldError> {
        use InvoiceField::*;
        if !field.is_editable() {
            return Err(FieldError::ReadOnly(field));
        }
        let invalid = || FieldError::InvalidValue {
            field,
            value: raw.to_string(),
        };
        let number = || -> Result<Decimal, FieldError> {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Decimal::ZERO);
            }
            Decimal::from_str(trimmed).map_err(|_| invalid())
        };
        let optional_date = || Some(raw.trim().to_string()).filter(|d| !d.is_empty());

        match field {
            Company => self.company = raw.to_string(),
            CampaignName => self.campaign_name = raw.to_string(),
            DateFrom => self.date_from = raw.trim().to_string(),
            DateTo => self.date_to = raw.trim().to_string(),
            CustomerInvoiceNumber => self.customer_invoice_number = raw.to_string(),
            CustomerAmountWithoutTax => self.customer_amount_without_tax = number()?,
            CustomerReceivedAmountWithoutTax => {
                self.customer_received_amount_without_tax = number()?
            }
            CustomerPaymentStatus => {
                self.customer_payment_status = PaymentStatus::parse(raw).ok_or_else(invalid)?
            }
            CustomerPaymentDate => self.customer_payment_date = optional_date(),
            CustomerRemarks => self.customer_remarks = raw.to_string(),
            VendorName => self.vendor_name = raw.to_string(),
            VendorInvoiceNumber => self.vendor_invoice_number = raw.to_string(),
            VendorAmountWithoutTax => self.vendor_amount_without_tax = number()?,
            VendorPaidAmountWithoutTax => self.vendor_paid_amount_without_tax = number()?,
            VendorPaymentStatus => {
                self.vendor_payment_status = PaymentStatus::parse(raw).ok_or_else(invalid)?
            }
            VendorPaymentDate => self.vendor_payment_date = optional_date(),
            VendorRemarks => self.vendor_remarks = raw.to_string(),
            Id | Profit | Margin | CreatedAt | UpdatedAt | CustomerAmountWithTax
            | CustomerReceivedAmountWithTax | VendorAmountWithTax | VendorPaidAmountWithTax => {
                return Err(FieldError::ReadOnly(field))
            }
        }
        Ok(())
    }
}

//! Campaign invoice model for campaign-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

/// Identifier carried by a draft that has not been persisted yet.
pub const PLACEHOLDER_ID: &str = "temp-new";

/// Fields that must be non-empty before an invoice is created or updated,
/// with their user-facing labels, in form order.
pub const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("company", "Company"),
    ("campaign_name", "Campaign Name"),
    ("customer_invoice_number", "Customer Invoice Number"),
    ("date_from", "From Date"),
    ("date_to", "To Date"),
];

/// Settlement state of one side of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Clear,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Clear => "Clear",
        }
    }

    /// Accepts `pending`, `partial` or `clear` in any case. Anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "clear" => Some(PaymentStatus::Clear),
            _ => None,
        }
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A campaign invoice row as stored by the data API.
///
/// `profit`, `margin` and the timestamps are owned by the persistence layer and
/// are absent on drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub company: String,
    #[serde(default, deserialize_with = "nullable")]
    pub campaign_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date_from: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date_to: String,

    #[serde(default, deserialize_with = "nullable")]
    pub customer_invoice_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_amount_without_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_amount_with_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_received_amount_without_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_received_amount_with_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_payment_status: PaymentStatus,
    #[serde(default)]
    pub customer_payment_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_remarks: String,

    #[serde(default, deserialize_with = "nullable")]
    pub vendor_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_invoice_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_amount_without_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_amount_with_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_paid_amount_without_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_paid_amount_with_tax: Decimal,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_payment_status: PaymentStatus,
    #[serde(default)]
    pub vendor_payment_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_remarks: String,

    #[serde(default)]
    pub profit: Option<Decimal>,
    #[serde(default)]
    pub margin: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Company, campaign and date range copied into a new invoice added to an
/// existing campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSeed {
    pub company: String,
    pub campaign_name: String,
    pub date_from: String,
    pub date_to: String,
}

impl Invoice {
    /// A new unsaved invoice: empty text, zero amounts, both sides Pending.
    pub fn draft(seed: Option<&CampaignSeed>) -> Self {
        let seed = seed.cloned().unwrap_or_default();
        Self {
            id: PLACEHOLDER_ID.to_string(),
            company: seed.company,
            campaign_name: seed.campaign_name,
            date_from: seed.date_from,
            date_to: seed.date_to,
            customer_invoice_number: String::new(),
            customer_amount_without_tax: Decimal::ZERO,
            customer_amount_with_tax: Decimal::ZERO,
            customer_received_amount_without_tax: Decimal::ZERO,
            customer_received_amount_with_tax: Decimal::ZERO,
            customer_payment_status: PaymentStatus::Pending,
            customer_payment_date: None,
            customer_remarks: String::new(),
            vendor_name: String::new(),
            vendor_invoice_number: String::new(),
            vendor_amount_without_tax: Decimal::ZERO,
            vendor_amount_with_tax: Decimal::ZERO,
            vendor_paid_amount_without_tax: Decimal::ZERO,
            vendor_paid_amount_with_tax: Decimal::ZERO,
            vendor_payment_status: PaymentStatus::Pending,
            vendor_payment_date: None,
            vendor_remarks: String::new(),
            profit: None,
            margin: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != PLACEHOLDER_ID
    }

    pub fn campaign_seed(&self) -> CampaignSeed {
        CampaignSeed {
            company: self.company.clone(),
            campaign_name: self.campaign_name.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
        }
    }
}

/// Payload for create and update calls.
///
/// Carries only client-writable columns: there is no `id`, `profit`, `margin`
/// or `created_at`, so derived values can never be sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InvoiceWrite {
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[validate(length(min = 1, message = "Campaign Name is required"))]
    pub campaign_name: String,
    #[validate(length(min = 1, message = "From Date is required"))]
    pub date_from: String,
    #[validate(length(min = 1, message = "To Date is required"))]
    pub date_to: String,

    #[validate(length(min = 1, message = "Customer Invoice Number is required"))]
    pub customer_invoice_number: String,
    pub customer_amount_without_tax: Decimal,
    pub customer_amount_with_tax: Decimal,
    pub customer_received_amount_without_tax: Decimal,
    pub customer_received_amount_with_tax: Decimal,
    pub customer_payment_status: PaymentStatus,
    pub customer_payment_date: Option<String>,
    pub customer_remarks: String,

    pub vendor_name: String,
    pub vendor_invoice_number: String,
    pub vendor_amount_without_tax: Decimal,
    pub vendor_amount_with_tax: Decimal,
    pub vendor_paid_amount_without_tax: Decimal,
    pub vendor_paid_amount_with_tax: Decimal,
    pub vendor_payment_status: PaymentStatus,
    pub vendor_payment_date: Option<String>,
    pub vendor_remarks: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Empty date text means "no date"; the data API rejects `""` for date columns.
fn blank_to_none(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl From<&Invoice> for InvoiceWrite {
    fn from(invoice: &Invoice) -> Self {
        Self {
            company: invoice.company.clone(),
            campaign_name: invoice.campaign_name.clone(),
            date_from: invoice.date_from.clone(),
            date_to: invoice.date_to.clone(),
            customer_invoice_number: invoice.customer_invoice_number.clone(),
            customer_amount_without_tax: invoice.customer_amount_without_tax,
            customer_amount_with_tax: invoice.customer_amount_with_tax,
            customer_received_amount_without_tax: invoice.customer_received_amount_without_tax,
            customer_received_amount_with_tax: invoice.customer_received_amount_with_tax,
            customer_payment_status: invoice.customer_payment_status,
            customer_payment_date: blank_to_none(&invoice.customer_payment_date),
            customer_remarks: invoice.customer_remarks.clone(),
            vendor_name: invoice.vendor_name.clone(),
            vendor_invoice_number: invoice.vendor_invoice_number.clone(),
            vendor_amount_without_tax: invoice.vendor_amount_without_tax,
            vendor_amount_with_tax: invoice.vendor_amount_with_tax,
            vendor_paid_amount_without_tax: invoice.vendor_paid_amount_without_tax,
            vendor_paid_amount_with_tax: invoice.vendor_paid_amount_with_tax,
            vendor_payment_status: invoice.vendor_payment_status,
            vendor_payment_date: blank_to_none(&invoice.vendor_payment_date),
            vendor_remarks: invoice.vendor_remarks.clone(),
            updated_at: None,
        }
    }
}

impl From<&PartialInvoice> for InvoiceWrite {
    fn from(partial: &PartialInvoice) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            company: text(&partial.company),
            campaign_name: text(&partial.campaign_name),
            date_from: text(&partial.date_from),
            date_to: text(&partial.date_to),
            customer_invoice_number: text(&partial.customer_invoice_number),
            customer_amount_without_tax: partial.customer_amount_without_tax.unwrap_or_default(),
            customer_amount_with_tax: partial.customer_amount_with_tax.unwrap_or_default(),
            customer_received_amount_without_tax: partial
                .customer_received_amount_without_tax
                .unwrap_or_default(),
            customer_received_amount_with_tax: partial
                .customer_received_amount_with_tax
                .unwrap_or_default(),
            customer_payment_status: partial.customer_payment_status.unwrap_or_default(),
            customer_payment_date: blank_to_none(&partial.customer_payment_date),
            customer_remarks: text(&partial.customer_remarks),
            vendor_name: text(&partial.vendor_name),
            vendor_invoice_number: text(&partial.vendor_invoice_number),
            vendor_amount_without_tax: partial.vendor_amount_without_tax.unwrap_or_default(),
            vendor_amount_with_tax: partial.vendor_amount_with_tax.unwrap_or_default(),
            vendor_paid_amount_without_tax: partial
                .vendor_paid_amount_without_tax
                .unwrap_or_default(),
            vendor_paid_amount_with_tax: partial.vendor_paid_amount_with_tax.unwrap_or_default(),
            vendor_payment_status: partial.vendor_payment_status.unwrap_or_default(),
            vendor_payment_date: blank_to_none(&partial.vendor_payment_date),
            vendor_remarks: text(&partial.vendor_remarks),
            updated_at: None,
        }
    }
}

/// Labels of the required fields named in `errors`, in form order.
pub fn missing_field_labels(errors: &ValidationErrors) -> Vec<&'static str> {
    let failed = errors.field_errors();
    REQUIRED_FIELDS
        .iter()
        .filter(|(key, _)| failed.contains_key(*key))
        .map(|(_, label)| *label)
        .collect()
}

/// An invoice read from one spreadsheet row. Columns that were missing,
/// empty or unparseable are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialInvoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_amount_without_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_amount_with_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_received_amount_without_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_received_amount_with_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_payment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_amount_without_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_amount_with_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_paid_amount_without_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_paid_amount_with_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_payment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_remarks: Option<String>,
}

impl PartialInvoice {
    pub fn is_empty(&self) -> bool {
        *self == PartialInvoice::default()
    }

    /// Company, campaign name and customer invoice number are all present.
    /// Rows without them are skipped by bulk import.
    pub fn has_identity(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.company)
            && filled(&self.campaign_name)
            && filled(&self.customer_invoice_number)
    }
}

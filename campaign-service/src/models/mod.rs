//! Domain models for campaign-service.

mod field;
mod invoice;

pub use field::{FieldError, FieldKind, FieldValue, InvoiceField, UnknownField};
pub use invoice::{
    missing_field_labels, CampaignSeed, Invoice, InvoiceWrite, PartialInvoice, PaymentStatus,
    PLACEHOLDER_ID, REQUIRED_FIELDS,
};

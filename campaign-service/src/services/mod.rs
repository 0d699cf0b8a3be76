pub mod grouping;
pub mod invoices;
pub mod metrics;
pub mod sorting;
pub mod spreadsheet;
pub mod store;
pub mod summary;
pub mod tax;

pub use grouping::{group_by_campaign, CampaignGroup, CampaignKey, Totals};
pub use invoices::{
    create_invoice, import_bytes, prepare_write, update_invoice, ImportError, ImportReport,
    RowFailure, WriteError,
};
pub use metrics::{get_metrics, init_metrics};
pub use sorting::{sort_invoices, SortDirection, SortSpec};
pub use store::{InvoiceStore, MemoryInvoiceStore, RestInvoiceStore, StoreError};
pub use summary::{PaymentSummary, Settlement};

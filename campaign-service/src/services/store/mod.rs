//! Persistence for campaign invoices.
//!
//! The service owns no database. Invoices live behind a hosted REST data API
//! ([`RestInvoiceStore`]); [`MemoryInvoiceStore`] stands in for it in tests and
//! local runs.

mod memory;
mod rest;

pub use memory::MemoryInvoiceStore;
pub use rest::RestInvoiceStore;

use async_trait::async_trait;
use serde::Deserialize;
use service_core::error::AppError;

use crate::models::{Invoice, InvoiceWrite};

/// Error body returned by the data API, surfaced verbatim to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{message} (status {status}{})", code_suffix(.code))]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(", code {code}"))
        .unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invoice store is not configured: missing {}", .missing.join(", "))]
    NotConfigured { missing: Vec<&'static str> },

    #[error("Request to invoice store failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invoice store rejected the request: {0}")]
    Api(ApiError),

    #[error("Invoice {0} not found")]
    NotFound(String),

    #[error("Unexpected response from invoice store: {0}")]
    Decode(String),
}

/// Remote collection of campaign invoices.
///
/// `create` and `update` return the stored row, including the identifier,
/// timestamps, profit and margin assigned by the store.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// All invoices, newest first.
    async fn list(&self) -> Result<Vec<Invoice>, StoreError>;

    async fn create(&self, invoice: &InvoiceWrite) -> Result<Invoice, StoreError>;

    async fn update(&self, id: &str, invoice: &InvoiceWrite) -> Result<Invoice, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotConfigured { missing } => AppError::ConfigError {
                message: "Invoice store is not configured".to_string(),
                remediation: format!(
                    "Set {} in the environment or .env file and restart the service",
                    missing.join(" and ")
                ),
            },
            StoreError::Api(api) => {
                let details = match (&api.details, &api.hint) {
                    (Some(details), Some(hint)) => Some(format!("{details} Hint: {hint}")),
                    (Some(details), None) => Some(details.clone()),
                    (None, Some(hint)) => Some(format!("Hint: {hint}")),
                    (None, None) => None,
                };
                AppError::BadGateway {
                    message: api.message,
                    details,
                }
            }
            StoreError::NotFound(id) => {
                AppError::NotFound(anyhow::anyhow!("Invoice {id} not found"))
            }
            other @ (StoreError::Request(_) | StoreError::Decode(_)) => AppError::BadGateway {
                message: other.to_string(),
                details: None,
            },
        }
    }
}

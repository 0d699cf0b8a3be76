//! Client for the hosted REST data API.
//!
//! Rows are addressed as `<url>/rest/v1/<table>` with PostgREST-style query
//! filters (`id=eq.<id>`, `order=created_at.desc`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{ApiError, InvoiceStore, StoreError};
use crate::config::StoreConfig;
use crate::models::{Invoice, InvoiceWrite};
use crate::services::metrics::STORE_REQUEST_DURATION;

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone)]
pub struct RestInvoiceStore {
    client: Client,
    config: StoreConfig,
}

impl RestInvoiceStore {
    pub fn new(config: StoreConfig) -> Self {
        let missing = config.missing();
        if missing.is_empty() {
            info!(url = %config.url, table = %config.table, "Invoice store configured");
        } else {
            warn!(
                missing = ?missing,
                remediation = "Set CAMPAIGN_STORE_URL and CAMPAIGN_STORE_KEY, or CAMPAIGN_STORE_BACKEND=memory for local use",
                "Invoice store is not configured; data operations will fail until these are set"
            );
        }
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    /// Attach credentials, refusing to build a request without them.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        let missing = self.config.missing();
        let key = match &self.config.key {
            Some(key) if missing.is_empty() => key.expose_secret(),
            _ => return Err(StoreError::NotConfigured { missing }),
        };
        Ok(request
            .header("apikey", key)
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let request = self.authorized(request)?;
        let timer = STORE_REQUEST_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let response = request.send().await;
        timer.observe_duration();

        let response = response?;
        let status = response.status();
        debug!(operation, status = %status, "Invoice store response");
        if !status.is_success() {
            return Err(StoreError::Api(api_error(response).await));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

async fn api_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let mut error = serde_json::from_str::<ApiError>(&body).unwrap_or_default();
    if error.message.is_empty() {
        error.message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            body
        };
    }
    error.status = status.as_u16();
    error
}

fn single_row(rows: Vec<Invoice>, id: &str) -> Result<Invoice, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

#[async_trait]
impl InvoiceStore for RestInvoiceStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send("list", request).await
    }

    #[instrument(skip(self, invoice), fields(company = %invoice.company, campaign = %invoice.campaign_name))]
    async fn create(&self, invoice: &InvoiceWrite) -> Result<Invoice, StoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[invoice]);
        let rows: Vec<Invoice> = self.send("create", request).await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("create returned no rows".to_string()))?;
        info!(id = %created.id, "Invoice created");
        Ok(created)
    }

    #[instrument(skip(self, invoice))]
    async fn update(&self, id: &str, invoice: &InvoiceWrite) -> Result<Invoice, StoreError> {
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(invoice);
        let rows: Vec<Invoice> = self.send("update", request).await?;
        let updated = single_row(rows, id)?;
        info!(id = %updated.id, "Invoice updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_REPRESENTATION);
        let rows: Vec<Invoice> = self.send("delete", request).await?;
        single_row(rows, id)?;
        info!(id, "Invoice deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;

    fn unconfigured() -> RestInvoiceStore {
        RestInvoiceStore::new(StoreConfig {
            backend: StoreBackend::Rest,
            url: String::new(),
            key: None,
            table: "campaign_invoices".to_string(),
        })
    }

    #[tokio::test]
    async fn every_call_checks_configuration() {
        let store = unconfigured();
        assert!(!store.is_configured());

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured { ref missing } if missing.len() == 2));

        let err = store.delete("abc").await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured { .. }));
    }

    #[test]
    fn table_url_joins_base_and_table() {
        let store = RestInvoiceStore::new(StoreConfig {
            backend: StoreBackend::Rest,
            url: "https://db.example.com".to_string(),
            key: Some(secrecy::Secret::new("k".to_string())),
            table: "campaign_invoices".to_string(),
        });
        assert_eq!(
            store.table_url(),
            "https://db.example.com/rest/v1/campaign_invoices"
        );
    }
}

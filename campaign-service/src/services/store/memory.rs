//! In-process invoice store that assigns ids, timestamps, profit and margin.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InvoiceStore, StoreError};
use crate::models::{Invoice, InvoiceWrite};
use crate::services::tax;

/// In-process invoice table.
///
/// Assigns ids and timestamps and computes profit and margin the way the
/// hosted table does. Rows are kept newest first.
#[derive(Clone, Default)]
pub struct MemoryInvoiceStore {
    rows: Arc<RwLock<Vec<Invoice>>>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows, in list order.
    pub fn with_rows(rows: Vec<Invoice>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn materialize(id: String, created_at: String, write: &InvoiceWrite) -> Invoice {
    let profit = tax::profit(
        write.customer_received_amount_without_tax,
        write.vendor_paid_amount_without_tax,
    );
    let margin = tax::margin(profit, write.customer_received_amount_without_tax);
    Invoice {
        id,
        company: write.company.clone(),
        campaign_name: write.campaign_name.clone(),
        date_from: write.date_from.clone(),
        date_to: write.date_to.clone(),
        customer_invoice_number: write.customer_invoice_number.clone(),
        customer_amount_without_tax: write.customer_amount_without_tax,
        customer_amount_with_tax: write.customer_amount_with_tax,
        customer_received_amount_without_tax: write.customer_received_amount_without_tax,
        customer_received_amount_with_tax: write.customer_received_amount_with_tax,
        customer_payment_status: write.customer_payment_status,
        customer_payment_date: write.customer_payment_date.clone(),
        customer_remarks: write.customer_remarks.clone(),
        vendor_name: write.vendor_name.clone(),
        vendor_invoice_number: write.vendor_invoice_number.clone(),
        vendor_amount_without_tax: write.vendor_amount_without_tax,
        vendor_amount_with_tax: write.vendor_amount_with_tax,
        vendor_paid_amount_without_tax: write.vendor_paid_amount_without_tax,
        vendor_paid_amount_with_tax: write.vendor_paid_amount_with_tax,
        vendor_payment_status: write.vendor_payment_status,
        vendor_payment_date: write.vendor_payment_date.clone(),
        vendor_remarks: write.vendor_remarks.clone(),
        profit: Some(profit.round_dp(2)),
        margin: Some(margin.round_dp(2)),
        updated_at: Some(write.updated_at.clone().unwrap_or_else(|| created_at.clone())),
        created_at: Some(created_at),
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(self.rows.read().await.clone())
    }

    async fn create(&self, invoice: &InvoiceWrite) -> Result<Invoice, StoreError> {
        let created = materialize(Uuid::new_v4().to_string(), now(), invoice);
        self.rows.write().await.insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, invoice: &InvoiceWrite) -> Result<Invoice, StoreError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let created_at = row.created_at.clone().unwrap_or_else(now);
        let mut updated = materialize(row.id.clone(), created_at, invoice);
        if invoice.updated_at.is_none() {
            updated.updated_at = Some(now());
        }
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn write(number: &str) -> InvoiceWrite {
        InvoiceWrite {
            company: "Acme".to_string(),
            campaign_name: "Spring".to_string(),
            date_from: "2024-03-01".to_string(),
            date_to: "2024-03-31".to_string(),
            customer_invoice_number: number.to_string(),
            customer_received_amount_without_tax: dec!(3000),
            vendor_paid_amount_without_tax: dec!(1600),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_derived_values() {
        let store = MemoryInvoiceStore::new();
        let created = store.create(&write("INV-1")).await.unwrap();

        assert!(created.is_persisted());
        assert!(created.created_at.is_some());
        assert_eq!(created.profit, Some(dec!(1400)));
        assert_eq!(created.margin, Some(dec!(46.67)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryInvoiceStore::new();
        store.create(&write("INV-1")).await.unwrap();
        store.create(&write("INV-2")).await.unwrap();

        let numbers: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.customer_invoice_number)
            .collect();
        assert_eq!(numbers, vec!["INV-2", "INV-1"]);
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let store = MemoryInvoiceStore::new();
        let created = store.create(&write("INV-1")).await.unwrap();

        let mut change = write("INV-1b");
        change.customer_received_amount_without_tax = Decimal::ZERO;
        let updated = store.update(&created.id, &change).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.customer_invoice_number, "INV-1b");
        assert_eq!(updated.margin, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = MemoryInvoiceStore::new();
        assert!(matches!(
            store.update("missing", &write("x")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = MemoryInvoiceStore::new();
        let created = store.create(&write("INV-1")).await.unwrap();
        store.delete(&created.id).await.unwrap();
        assert!(store.is_empty().await);
    }
}

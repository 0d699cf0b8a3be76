//! Dashboard session state.
//!
//! Operations never mutate a state in place: each borrows the current snapshot
//! and returns the next one, or an error with the current snapshot untouched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::info;

use super::view::{CampaignView, DashboardView};
use crate::models::{CampaignSeed, FieldError, Invoice, InvoiceField, InvoiceWrite, PLACEHOLDER_ID};
use crate::services::spreadsheet::{export_invoices, SpreadsheetError};
use crate::services::{
    create_invoice, group_by_campaign, import_bytes, sort_invoices, update_invoice, CampaignKey,
    ImportError, ImportReport, InvoiceStore, PaymentSummary, SortSpec, StoreError, Totals,
    WriteError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Adding,
    Editing,
}

/// The single invoice open in the edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditSession {
    pub mode: EditMode,
    pub buffer: Invoice,
}

/// One field change from the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldEdit {
    pub field: InvoiceField,
    pub value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Finish or cancel the current edit first")]
    EditInProgress,

    #[error("No invoice is being edited")]
    NotEditing,

    #[error("Invoice {0} is not on the dashboard")]
    UnknownInvoice(String),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::EditInProgress | DashboardError::NotEditing => {
                AppError::Conflict(anyhow::Error::new(err))
            }
            DashboardError::UnknownInvoice(_) => AppError::NotFound(anyhow::Error::new(err)),
            DashboardError::Field(_) => AppError::BadRequest(anyhow::Error::new(err)),
            DashboardError::Write(e) => e.into(),
            DashboardError::Store(e) => e.into(),
            DashboardError::Import(e) => e.into(),
            DashboardError::Spreadsheet(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// Newest first, as listed by the store. While adding, the draft sits at
    /// the front under the placeholder id.
    pub invoices: Vec<Invoice>,
    pub editing: Option<EditSession>,
    pub sort: SortSpec,
    pub expanded: BTreeSet<CampaignKey>,
    pub loaded: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn ensure_idle(&self) -> Result<(), DashboardError> {
        if self.is_editing() {
            Err(DashboardError::EditInProgress)
        } else {
            Ok(())
        }
    }

    fn session(&self) -> Result<&EditSession, DashboardError> {
        self.editing.as_ref().ok_or(DashboardError::NotEditing)
    }

    /// Replace the collection with a fresh listing, keeping an open draft.
    fn with_listing(&self, mut invoices: Vec<Invoice>) -> Self {
        if let Some(session) = &self.editing {
            match session.mode {
                EditMode::Adding => invoices.insert(0, session.buffer.clone()),
                EditMode::Editing => {}
            }
        }
        let editing = self.editing.clone().filter(|session| match session.mode {
            EditMode::Adding => true,
            EditMode::Editing => invoices.iter().any(|i| i.id == session.buffer.id),
        });
        Self {
            invoices,
            editing,
            loaded: true,
            ..self.clone()
        }
    }

    pub async fn refresh(&self, store: &dyn InvoiceStore) -> Result<Self, DashboardError> {
        let invoices = store.list().await?;
        Ok(self.with_listing(invoices))
    }

    /// Open a new draft at the top of the list, optionally pre-filled from an
    /// existing campaign.
    pub fn begin_add(&self, seed: Option<&CampaignSeed>) -> Result<Self, DashboardError> {
        self.ensure_idle()?;
        let draft = Invoice::draft(seed);
        let mut next = self.clone();
        if seed.is_some() {
            next.expanded.insert(CampaignKey::of(&draft));
        }
        next.invoices.insert(0, draft.clone());
        next.editing = Some(EditSession {
            mode: EditMode::Adding,
            buffer: draft,
        });
        Ok(next)
    }

    pub fn begin_edit(&self, id: &str) -> Result<Self, DashboardError> {
        self.ensure_idle()?;
        let invoice = self
            .invoices
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| DashboardError::UnknownInvoice(id.to_string()))?;
        Ok(Self {
            editing: Some(EditSession {
                mode: EditMode::Editing,
                buffer: invoice.clone(),
            }),
            ..self.clone()
        })
    }

    pub fn edit(&self, change: &FieldEdit) -> Result<Self, DashboardError> {
        let session = self.session()?;
        let mut buffer = session.buffer.clone();
        buffer.set_field(change.field, &change.value)?;

        let mut next = self.clone();
        if session.mode == EditMode::Adding {
            if let Some(row) = next.invoices.iter_mut().find(|i| !i.is_persisted()) {
                *row = buffer.clone();
            }
        }
        next.editing = Some(EditSession {
            mode: session.mode,
            buffer,
        });
        Ok(next)
    }

    /// Drop the open edit; a draft row disappears with it.
    pub fn cancel(&self) -> Self {
        let mut next = self.clone();
        if let Some(EditSession {
            mode: EditMode::Adding,
            ..
        }) = next.editing.take()
        {
            next.invoices.retain(|i| i.id != PLACEHOLDER_ID);
        }
        next
    }

    /// Persist the open edit, then reload the list.
    pub async fn save(&self, store: &dyn InvoiceStore) -> Result<Self, DashboardError> {
        let session = self.session()?;
        let write = InvoiceWrite::from(&session.buffer);
        let saved = match session.mode {
            EditMode::Adding => create_invoice(store, write).await?,
            EditMode::Editing => update_invoice(store, &session.buffer.id, write).await?,
        };
        info!(id = %saved.id, mode = ?session.mode, "Invoice saved");

        let idle = Self {
            editing: None,
            ..self.clone()
        };
        idle.refresh(store).await
    }

    pub async fn delete(&self, store: &dyn InvoiceStore, id: &str) -> Result<Self, DashboardError> {
        store.delete(id).await?;
        self.refresh(store).await
    }

    pub async fn import(
        &self,
        store: &dyn InvoiceStore,
        bytes: &[u8],
    ) -> Result<(Self, ImportReport), DashboardError> {
        self.ensure_idle()?;
        let report = import_bytes(store, bytes).await?;
        let next = self.refresh(store).await?;
        Ok((next, report))
    }

    pub fn export(&self) -> Result<Vec<u8>, DashboardError> {
        self.ensure_idle()?;
        Ok(export_invoices(&self.invoices)?)
    }

    pub fn toggle_sort(&self, field: InvoiceField) -> Self {
        self.with_sort(self.sort.toggle(field))
    }

    pub fn with_sort(&self, sort: SortSpec) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn toggle_campaign(&self, key: &CampaignKey) -> Self {
        let mut next = self.clone();
        if !next.expanded.remove(key) {
            next.expanded.insert(key.clone());
        }
        next
    }

    pub fn expand_all(&self) -> Self {
        let mut next = self.clone();
        next.expanded = self.invoices.iter().map(CampaignKey::of).collect();
        next
    }

    /// Totals and the payment summary cover saved invoices only; campaign groups
    /// follow the current sort and include an open draft.
    pub fn view(&self) -> DashboardView {
        let saved: Vec<&Invoice> = self.invoices.iter().filter(|i| i.is_persisted()).collect();
        let payment_summary = PaymentSummary::from_invoices(saved.iter().copied());

        let sorted = sort_invoices(&self.invoices, self.sort);
        let campaigns = group_by_campaign(&sorted)
            .into_iter()
            .map(|group| {
                let summary = group.payment_summary();
                CampaignView {
                    expanded: self.expanded.contains(&group.key),
                    payment_summary: summary,
                    settlement: summary.settlement(),
                    group,
                }
            })
            .collect();

        DashboardView {
            totals: Totals::from_invoices(saved.iter().copied()),
            payment_summary,
            settlement: payment_summary.settlement(),
            sort: self.sort,
            editing: self.editing.clone(),
            campaigns,
        }
    }
}

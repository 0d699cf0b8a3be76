use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dashboard::{DashboardState, DashboardView};
use crate::dtos::DashboardQuery;
use crate::models::{Invoice, InvoiceWrite};
use crate::services::{create_invoice, update_invoice};
use crate::startup::AppState;

/// Totals, payment summary and campaign groups in the requested order.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let mut dashboard = DashboardState::new()
        .with_sort(query.sort_spec())
        .refresh(state.store.as_ref())
        .await?;
    if query.expand_all {
        dashboard = dashboard.expand_all();
    }
    Ok(Json(dashboard.view()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = state.store.list().await?;
    Ok(Json(invoices))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<InvoiceWrite>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    tracing::info!(
        company = %payload.company,
        campaign = %payload.campaign_name,
        customer_invoice_number = %payload.customer_invoice_number,
        "Creating invoice"
    );
    let invoice = create_invoice(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<InvoiceWrite>,
) -> Result<Json<Invoice>, AppError> {
    tracing::info!(invoice_id = %id, "Updating invoice");
    let invoice = update_invoice(state.store.as_ref(), &id, payload).await?;
    Ok(Json(invoice))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    tracing::info!(invoice_id = %id, "Deleting invoice");
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use service_core::error::AppError;

use crate::dashboard::DashboardState;
use crate::dtos::{ImportQuery, ImportResponse};
use crate::services::metrics::record_workbook;
use crate::services::spreadsheet::{
    export_filename, is_supported_import, template_workbook, SpreadsheetError, TEMPLATE_FILENAME,
    XLSX_MIME,
};
use crate::startup::AppState;

fn attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Bulk-create invoices from an uploaded workbook sent as the raw request body.
pub async fn import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<ImportResponse>, AppError> {
    if let Some(filename) = query.filename.as_deref() {
        if !is_supported_import(filename) {
            return Err(SpreadsheetError::UnsupportedFile(filename.to_string()).into());
        }
    }
    if body.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Request body is empty")));
    }

    tracing::info!(filename = ?query.filename, size = body.len(), "Importing workbook");
    let (_, report) = DashboardState::new()
        .import(state.store.as_ref(), &body)
        .await?;
    Ok(Json(report.into()))
}

/// Every invoice as an xlsx download.
pub async fn export(State(state): State<AppState>) -> Result<Response, AppError> {
    let dashboard = DashboardState::new().refresh(state.store.as_ref()).await?;
    let bytes = dashboard.export()?;
    let filename = export_filename(&state.config.export.basename, Utc::now().date_naive());
    record_workbook("export");
    tracing::info!(rows = dashboard.invoices.len(), %filename, "Exported invoices");
    Ok(attachment(&filename, bytes))
}

pub async fn template() -> Result<Response, AppError> {
    let bytes = template_workbook()?;
    record_workbook("template");
    Ok(attachment(TEMPLATE_FILENAME, bytes))
}

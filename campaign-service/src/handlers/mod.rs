//! HTTP handlers for campaign-service.

pub mod invoices;
pub mod spreadsheet;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;
use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "campaign-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Ready once the invoice store has the settings it needs.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let missing = state.config.store.missing();
    if missing.is_empty() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_configured", "missing": missing })),
        )
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

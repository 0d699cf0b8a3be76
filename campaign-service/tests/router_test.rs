mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use campaign_service::config::StoreConfig;
use campaign_service::models::{Invoice, PaymentStatus};
use campaign_service::services::MemoryInvoiceStore;
use campaign_service::startup::{router, AppState};
use common::test_config;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::util::ServiceExt;

fn seeded(id: &str, campaign: &str, status: PaymentStatus, created_at: &str) -> Invoice {
    let mut invoice = Invoice::draft(None);
    invoice.id = id.to_string();
    invoice.company = "Acme".to_string();
    invoice.campaign_name = campaign.to_string();
    invoice.customer_invoice_number = format!("INV-{id}");
    invoice.customer_received_amount_without_tax = dec!(1000);
    invoice.vendor_paid_amount_without_tax = dec!(400);
    invoice.customer_payment_status = status;
    invoice.created_at = Some(created_at.to_string());
    invoice
}

fn app() -> axum::Router {
    let store = MemoryInvoiceStore::with_rows(vec![
        seeded("1", "Spring Launch", PaymentStatus::Clear, "2024-03-01T09:00:00Z"),
        seeded("2", "Summer Sale", PaymentStatus::Pending, "2024-03-02T09:00:00Z"),
        seeded("3", "Spring Launch", PaymentStatus::Partial, "2024-03-03T09:00:00Z"),
    ]);
    router(AppState::with_store(
        test_config(StoreConfig::memory()),
        Arc::new(store),
    ))
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn dashboard_defaults_to_newest_first() {
    let response = app()
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let view = json_body(response).await;
    let campaigns = view["campaigns"].as_array().unwrap();
    assert_eq!(campaigns[0]["campaign_name"], "Spring Launch");
    assert_eq!(campaigns[0]["invoices"][0]["id"], "3");
    assert_eq!(campaigns[0]["invoices"][1]["id"], "1");
    assert_eq!(campaigns[1]["campaign_name"], "Summer Sale");
    assert_eq!(campaigns[1]["settlement"]["state"], "all_pending");
}

#[tokio::test]
async fn dashboard_reports_mixed_settlement() {
    let response = app()
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let view = json_body(response).await;
    assert_eq!(view["payment_summary"]["clear"], 1);
    assert_eq!(view["payment_summary"]["partial"], 1);
    assert_eq!(view["payment_summary"]["pending"], 1);
    assert_eq!(view["settlement"]["state"], "mixed");
    assert_eq!(view["settlement"]["clear_percentage"], 33);
    assert_eq!(view["totals"]["profit"].as_f64(), Some(1800.0));
    assert_eq!(view["totals"]["margin"].as_f64(), Some(60.0));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invoices")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/campaigns").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! Application startup and lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StoreBackend};
use crate::handlers;
use crate::services::{InvoiceStore, MemoryInvoiceStore, RestInvoiceStore};

/// Largest workbook accepted by the import endpoint.
const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn InvoiceStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn InvoiceStore> = match config.store.backend {
            StoreBackend::Rest => Arc::new(RestInvoiceStore::new(config.store.clone())),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory invoice store; data is lost on restart");
                Arc::new(MemoryInvoiceStore::new())
            }
        };
        Self { config, store }
    }

    pub fn with_store(config: Config, store: Arc<dyn InvoiceStore>) -> Self {
        Self { config, store }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/dashboard", get(handlers::invoices::dashboard))
        .route(
            "/invoices",
            get(handlers::invoices::list).post(handlers::invoices::create),
        )
        .route(
            "/invoices/:id",
            put(handlers::invoices::update).delete(handlers::invoices::delete),
        )
        .route(
            "/invoices/import",
            post(handlers::spreadsheet::import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route("/invoices/export", get(handlers::spreadsheet::export))
        .route("/invoices/template", get(handlers::spreadsheet::template))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let state = AppState::new(config);
        Self::build_with_state(state).await
    }

    /// Build around an existing state, e.g. one holding a custom store.
    pub async fn build_with_state(state: AppState) -> Result<Self, AppError> {
        let host: std::net::IpAddr = state.config.server.host.parse().map_err(|e| {
            AppError::ConfigError {
                message: format!("Invalid CAMPAIGN_SERVICE_HOST: {e}"),
                remediation: "Use an IP address such as 0.0.0.0 or 127.0.0.1".to_string(),
            }
        })?;
        // port 0 = random port for testing
        let addr = SocketAddr::new(host, state.config.server.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let http_port = listener.local_addr()?.port();

        tracing::info!(port = http_port, "Campaign service listening");

        Ok(Self {
            http_port,
            listener,
            state,
        })
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state)).await
    }
}

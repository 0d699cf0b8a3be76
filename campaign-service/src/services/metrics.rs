//! Prometheus metrics for campaign-service.
//!
//! HTTP request metrics go through the `metrics` facade and its Prometheus
//! recorder; service-specific series live in the default `prometheus` registry.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec, TextEncoder,
};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Data API call duration by operation.
pub static STORE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "campaign_store_request_duration_seconds",
        "Invoice store call duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register store_request_duration")
});

/// Bulk import rows by outcome: imported, failed, skipped.
pub static IMPORT_ROWS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "campaign_import_rows_total",
        "Spreadsheet rows processed by bulk import",
        &["outcome"]
    )
    .expect("Failed to register import_rows_total")
});

/// Generated workbooks by kind: export, template.
pub static WORKBOOKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "campaign_workbooks_total",
        "Workbooks generated for download",
        &["kind"]
    )
    .expect("Failed to register workbooks_total")
});

/// Install the HTTP metrics recorder and register service metrics.
///
/// Safe to call more than once; only the first call installs a recorder.
pub fn init_metrics() {
    Lazy::force(&STORE_REQUEST_DURATION);
    Lazy::force(&IMPORT_ROWS_TOTAL);
    Lazy::force(&WORKBOOKS_TOTAL);

    if METRICS_HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

pub fn record_import_rows(outcome: &str, count: usize) {
    IMPORT_ROWS_TOTAL
        .with_label_values(&[outcome])
        .inc_by(count as u64);
}

pub fn record_workbook(kind: &str) {
    WORKBOOKS_TOTAL.with_label_values(&[kind]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    if let Ok(service_metrics) = encoder.encode_to_string(&prometheus::gather()) {
        output.push_str(&service_metrics);
    }
    output
}

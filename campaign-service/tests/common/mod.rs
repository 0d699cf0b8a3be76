#![allow(dead_code)]

use campaign_service::config::{
    Config, ExportConfig, ObservabilityConfig, ServerConfig, StoreBackend, StoreConfig,
};
use campaign_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

pub fn test_config(store: StoreConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        store,
        observability: ObservabilityConfig {
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        export: ExportConfig {
            basename: "campaign-invoices".to_string(),
        },
        service_name: "campaign-service-test".to_string(),
    }
}

/// REST backend pointed at `url` with a test key.
pub fn rest_store(url: &str) -> StoreConfig {
    StoreConfig {
        backend: StoreBackend::Rest,
        url: url.trim_end_matches('/').to_string(),
        key: Some(Secret::new("test-anon-key".to_string())),
        table: "campaign_invoices".to_string(),
    }
}

impl TestApp {
    /// Spawn against the in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(StoreConfig::memory())).await
    }

    pub async fn spawn_with(config: Config) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_address, path)
    }

    pub async fn create_invoice(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/invoices"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn dashboard(&self, query: &str) -> Value {
        self.client
            .get(self.url(&format!("/dashboard{}", query)))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Dashboard body is not JSON")
    }
}

/// A fully settled invoice payload; the `_with_tax` amounts are left for the service to fill.
pub fn invoice_body(company: &str, campaign: &str, number: &str, revenue: i64, expense: i64) -> Value {
    json!({
        "company": company,
        "campaign_name": campaign,
        "date_from": "2024-03-01",
        "date_to": "2024-03-31",
        "customer_invoice_number": number,
        "customer_amount_without_tax": revenue,
        "customer_received_amount_without_tax": revenue,
        "customer_payment_status": "Clear",
        "vendor_name": "Print House",
        "vendor_amount_without_tax": expense,
        "vendor_paid_amount_without_tax": expense,
        "vendor_payment_status": "Clear"
    })
}

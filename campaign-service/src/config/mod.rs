use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::env;

use crate::services::spreadsheet::DEFAULT_EXPORT_BASENAME;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub observability: ObservabilityConfig,
    pub export: ExportConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted REST data API.
    #[default]
    Rest,
    /// In-process store; data is lost on restart.
    Memory,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub key: Option<Secret<String>>,
    pub table: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExportConfig {
    pub basename: String,
}

impl StoreConfig {
    /// Names of the settings the REST backend still needs.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.backend == StoreBackend::Memory {
            return missing;
        }
        if self.url.trim().is_empty() {
            missing.push("CAMPAIGN_STORE_URL");
        }
        if self
            .key
            .as_ref()
            .map_or(true, |key| key.expose_secret().trim().is_empty())
        {
            missing.push("CAMPAIGN_STORE_KEY");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: String::new(),
            key: None,
            table: "campaign_invoices".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `lookup` returns `None` for unset names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("CAMPAIGN_SERVICE_HOST", "0.0.0.0");
        let port = var("CAMPAIGN_SERVICE_PORT", "3010")
            .parse::<u16>()
            .context("CAMPAIGN_SERVICE_PORT must be a port number")?;

        let backend = match var("CAMPAIGN_STORE_BACKEND", "rest").to_lowercase().as_str() {
            "rest" => StoreBackend::Rest,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("CAMPAIGN_STORE_BACKEND must be 'rest' or 'memory', got '{other}'"),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            store: StoreConfig {
                backend,
                url: var("CAMPAIGN_STORE_URL", "").trim_end_matches('/').to_string(),
                key: non_empty("CAMPAIGN_STORE_KEY").map(Secret::new),
                table: var("CAMPAIGN_STORE_TABLE", "campaign_invoices"),
            },
            observability: ObservabilityConfig {
                log_level: var("CAMPAIGN_LOG_LEVEL", "info"),
                otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            },
            export: ExportConfig {
                basename: var("CAMPAIGN_EXPORT_BASENAME", DEFAULT_EXPORT_BASENAME),
            },
            service_name: "campaign-service".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3010);
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.table, "campaign_invoices");
        assert_eq!(config.export.basename, "campaign-invoices");
        assert!(config.observability.otlp_endpoint.is_none());
    }

    #[test]
    fn rest_store_reports_missing_settings() {
        let config = config_from(&[("CAMPAIGN_STORE_KEY", "  ")]).unwrap();
        assert_eq!(
            config.store.missing(),
            vec!["CAMPAIGN_STORE_URL", "CAMPAIGN_STORE_KEY"]
        );

        let config = config_from(&[
            ("CAMPAIGN_STORE_URL", "https://db.example.com/"),
            ("CAMPAIGN_STORE_KEY", "anon-key"),
        ])
        .unwrap();
        assert!(config.store.is_configured());
        assert_eq!(config.store.url, "https://db.example.com");
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let config = config_from(&[("CAMPAIGN_STORE_BACKEND", "Memory")]).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.is_configured());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("CAMPAIGN_SERVICE_PORT", "http")]).is_err());
        assert!(config_from(&[("CAMPAIGN_STORE_BACKEND", "sqlite")]).is_err());
    }
}

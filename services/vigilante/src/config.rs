//! Configuration types for the vigilante service

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::probe::MonitoredService;
use crate::VigilanteError;

/// Environment variable overriding the dashboard port
pub const DASHBOARD_PORT_ENV: &str = "DASHBOARD_PORT";

/// Environment variable supplying the alert webhook URL
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_services")]
    pub services: Vec<MonitoredService>,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: default_services(),
            polling_interval_seconds: default_polling_interval(),
            request_timeout_seconds: default_request_timeout(),
            alerts: AlertConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Alert delivery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            history_size: default_history_size(),
        }
    }
}

fn default_services() -> Vec<MonitoredService> {
    vec![
        MonitoredService::new("Payment Service", "http://localhost:3001/health", true),
        MonitoredService::new("Domain Service", "http://localhost:4000/health", true),
        MonitoredService::new(
            "GitHub Pages",
            "https://antigravityx.github.io/sombrerero/",
            false,
        ),
    ]
}

fn default_polling_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    5000
}

fn default_history_size() -> usize {
    100
}

impl Config {
    /// Apply `DASHBOARD_PORT` and `WEBHOOK_URL` from the process environment
    pub fn apply_env_overrides(&mut self) -> crate::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using the given variable lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(DASHBOARD_PORT_ENV).filter(|v| !v.trim().is_empty()) {
            self.dashboard.port = port.trim().parse().map_err(|e| {
                VigilanteError::Config(format!(
                    "Invalid {} value '{}': {}",
                    DASHBOARD_PORT_ENV, port, e
                ))
            })?;
            tracing::debug!("Dashboard port overridden to {}", self.dashboard.port);
        }

        if let Some(url) = lookup(WEBHOOK_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Alert webhook configured from environment");
            self.alerts.webhook_url = Some(url.trim().to_string());
        }

        Ok(())
    }

    /// Reject configurations the poller cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.services.is_empty() {
            return Err(VigilanteError::Config(
                "At least one monitored service is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(VigilanteError::Config(format!(
                    "Service with url '{}' has an empty name",
                    service.url
                )));
            }
            if !names.insert(service.name.as_str()) {
                return Err(VigilanteError::Config(format!(
                    "Duplicate service name '{}'",
                    service.name
                )));
            }
            validate_http_url(&service.url)
                .map_err(|e| VigilanteError::Config(format!("Service '{}': {}", service.name, e)))?;
        }

        if let Some(webhook_url) = &self.alerts.webhook_url {
            validate_http_url(webhook_url)
                .map_err(|e| VigilanteError::Config(format!("Alert webhook: {}", e)))?;
        }

        if self.polling_interval_seconds == 0 {
            return Err(VigilanteError::Config(
                "polling_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(VigilanteError::Config(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.dashboard.history_size == 0 {
            return Err(VigilanteError::Config(
                "dashboard.history_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_http_url(raw: &str) -> std::result::Result<(), String> {
    let url = reqwest::Url::parse(raw).map_err(|e| format!("invalid url '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}' in '{}'", other, raw)),
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VigilanteError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

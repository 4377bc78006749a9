//! Health probes: one GET per monitored service

use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::io::HttpClient;

/// A service whose health endpoint is polled every round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredService {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub critical: bool,
}

impl MonitoredService {
    pub fn new(name: impl Into<String>, url: impl Into<String>, critical: bool) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            critical,
        }
    }

    pub fn is_https(&self) -> bool {
        self.url.starts_with("https://")
    }
}

/// Outcome of the secure-transport check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportCheck {
    pub passed: bool,
    pub message: String,
}

/// Outcome of a single probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub service: String,
    pub url: String,
    pub critical: bool,
    /// HTTP status, 0 when the endpoint could not be reached
    pub status: u16,
    pub response_time_ms: u64,
    pub healthy: bool,
    pub error: Option<String>,
    pub timestamp_epoch_ms: u64,
    #[serde(default)]
    pub transport: Option<TransportCheck>,
}

impl CheckResult {
    /// Error text, or the status line when the endpoint answered
    pub fn failure_reason(&self) -> String {
        match &self.error {
            Some(error) => error.clone(),
            None => format!("Status {}", self.status),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.healthy {
            write!(f, "{}: healthy ({}ms)", self.service, self.response_time_ms)
        } else {
            write!(f, "{}: failed ({})", self.service, self.failure_reason())
        }
    }
}

/// Probe a service once.
///
/// Never fails: transport errors and timeouts become an unhealthy result with
/// status 0. Any status below 500 is a completed call; 200 alone is healthy.
pub async fn check_service(
    http: &dyn HttpClient,
    service: &MonitoredService,
    timeout: Duration,
) -> CheckResult {
    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, http.get(&service.url)).await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    let (status, error) = match outcome {
        Ok(Ok(response)) if response.status >= 500 => (
            response.status,
            Some(format!("Server error: status {}", response.status)),
        ),
        Ok(Ok(response)) => (response.status, None),
        Ok(Err(e)) => (0, Some(e.to_string())),
        Err(_) => (
            0,
            Some(format!("Timed out after {}ms", timeout.as_millis())),
        ),
    };

    tracing::debug!(
        "Probe '{}' -> status={} in {}ms",
        service.name,
        status,
        response_time_ms
    );

    CheckResult {
        service: service.name.clone(),
        url: service.url.clone(),
        critical: service.critical,
        status,
        response_time_ms,
        healthy: status == 200,
        error,
        timestamp_epoch_ms: current_epoch_ms(),
        transport: None,
    }
}

/// Superficial HTTPS check: repeats the GET and inspects the error text.
///
/// A non-2xx answer fails with its status. Only errors mentioning a
/// certificate are reported as certificate problems; this does not validate
/// the certificate chain.
pub async fn check_secure_transport(
    http: &dyn HttpClient,
    url: &str,
    timeout: Duration,
) -> TransportCheck {
    if !url.starts_with("https://") {
        return TransportCheck {
            passed: false,
            message: "Not using HTTPS".to_string(),
        };
    }

    match tokio::time::timeout(timeout, http.get(url)).await {
        Ok(Ok(response)) if !(200..300).contains(&response.status) => TransportCheck {
            passed: false,
            message: format!("Request failed with status code {}", response.status),
        },
        Ok(Ok(_)) => TransportCheck {
            passed: true,
            message: "TLS certificate accepted".to_string(),
        },
        Ok(Err(e)) => classify_transport_error(&e.to_string()),
        Err(_) => TransportCheck {
            passed: false,
            message: format!("Timed out after {}ms", timeout.as_millis()),
        },
    }
}

fn classify_transport_error(message: &str) -> TransportCheck {
    let message = if message.to_lowercase().contains("certificate") {
        "Invalid or missing TLS certificate".to_string()
    } else {
        message.to_string()
    };
    TransportCheck {
        passed: false,
        message,
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

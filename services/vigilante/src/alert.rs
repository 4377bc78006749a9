//! Alerting for critical service failures

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::probe::CheckResult;

/// How loud an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// An alert to be delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub service: String,
    pub url: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp_epoch_ms: u64,
}

impl Alert {
    /// Critical alert for a failed check of a critical service
    pub fn critical_outage(result: &CheckResult) -> Self {
        Self {
            service: result.service.clone(),
            url: result.url.clone(),
            message: format!(
                "Critical service down: {} ({}): {}",
                result.service,
                result.url,
                result.failure_reason()
            ),
            severity: Severity::Critical,
            timestamp_epoch_ms: result.timestamp_epoch_ms,
        }
    }
}

/// Record of an alert delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub service: String,
    pub alerter_type: String,
    pub message: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp_epoch_ms: u64,
}

/// Trait for delivering alerts
#[async_trait]
pub trait Alerter: Send + Sync + std::fmt::Debug {
    /// Get the alerter type name (e.g. "webhook")
    fn type_name(&self) -> &str;

    /// Deliver an alert
    async fn alert(&self, alert: &Alert) -> crate::Result<()>;
}

/// Emit the alert to the log, then hand it to every alerter.
///
/// Delivery failures are logged and recorded, never propagated.
pub async fn raise(alert: &Alert, alerters: &[Arc<dyn Alerter>]) -> Vec<AlertRecord> {
    tracing::error!("ALERT {}: {}", alert.severity, alert.message);

    let mut records = Vec::with_capacity(alerters.len());
    for alerter in alerters {
        let result = alerter.alert(alert).await;
        if let Err(e) = &result {
            tracing::warn!(
                "Alert via '{}' for '{}' failed: {}",
                alerter.type_name(),
                alert.service,
                e
            );
        }
        records.push(AlertRecord {
            service: alert.service.clone(),
            alerter_type: alerter.type_name().to_string(),
            message: alert.message.clone(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
            timestamp_epoch_ms: alert.timestamp_epoch_ms,
        });
    }
    records
}

//! Webhook alert delivery

use std::sync::Arc;

use async_trait::async_trait;

use crate::alert::{Alert, Alerter};
use crate::io::HttpClient;

/// Posts alerts as JSON to a chat or incident webhook
pub struct WebhookAlerter {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookAlerter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the url usually embeds a secret token
        f.debug_struct("WebhookAlerter").finish_non_exhaustive()
    }
}

impl WebhookAlerter {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created WebhookAlerter");
        Self {
            url: url.into(),
            http,
        }
    }
}

fn payload(alert: &Alert) -> serde_json::Value {
    serde_json::json!({
        "text": alert.message,
        "severity": alert.severity,
        "service": alert.service,
        "url": alert.url,
        "timestamp_epoch_ms": alert.timestamp_epoch_ms,
    })
}

#[async_trait]
impl Alerter for WebhookAlerter {
    fn type_name(&self) -> &str {
        "webhook"
    }

    async fn alert(&self, alert: &Alert) -> crate::Result<()> {
        tracing::debug!("Sending webhook alert for '{}'", alert.service);

        let response = self.http.post_json(&self.url, &payload(alert)).await?;

        if !(200..300).contains(&response.status) {
            return Err(crate::VigilanteError::Alert(format!(
                "Webhook returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("Webhook alert sent successfully");
        Ok(())
    }
}

//! BDD test world for vigilante service

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cucumber::World;
use vigilante::alert::{Alert, Alerter};
use vigilante::io::{HttpClient, HttpResponse};
use vigilante::poller::{Poller, RoundSummary};
use vigilante::probe::{CheckResult, MonitoredService};
use vigilante::state::StateHandle;
use vigilante::VigilanteError;

/// How a fake endpoint answers a GET
#[derive(Debug, Clone)]
pub enum Endpoint {
    Status(u16),
    Refuse,
    Hang,
}

/// HTTP client serving scripted endpoints and a scripted webhook
#[derive(Debug, Default)]
pub struct FakeHttp {
    endpoints: Mutex<HashMap<String, Endpoint>>,
    webhook_status: Mutex<Option<u16>>,
    webhook_posts: Mutex<u32>,
}

impl FakeHttp {
    pub fn set(&self, url: &str, endpoint: Endpoint) {
        self.endpoints
            .lock()
            .unwrap()
            .insert(url.to_string(), endpoint);
    }

    pub fn set_webhook_status(&self, status: u16) {
        *self.webhook_status.lock().unwrap() = Some(status);
    }

    pub fn webhook_posts(&self) -> u32 {
        *self.webhook_posts.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &str) -> vigilante::Result<HttpResponse> {
        let endpoint = self
            .endpoints
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Endpoint::Refuse);
        match endpoint {
            Endpoint::Status(status) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Endpoint::Refuse => Err(VigilanteError::Http(format!(
                "GET {} failed: connection refused",
                url
            ))),
            Endpoint::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(HttpResponse {
                    status: 200,
                    body: String::new(),
                })
            }
        }
    }

    async fn post_json(
        &self,
        _url: &str,
        _body: &serde_json::Value,
    ) -> vigilante::Result<HttpResponse> {
        *self.webhook_posts.lock().unwrap() += 1;
        let status = self.webhook_status.lock().unwrap().unwrap_or(200);
        Ok(HttpResponse {
            status,
            body: String::new(),
        })
    }
}

/// Alerter that only counts what it receives
#[derive(Debug, Default)]
pub struct RecordingAlerter {
    pub received: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Alerter for RecordingAlerter {
    fn type_name(&self) -> &str {
        "recording"
    }

    async fn alert(&self, alert: &Alert) -> vigilante::Result<()> {
        self.received.lock().unwrap().push(alert.service.clone());
        Ok(())
    }
}

#[derive(Debug, Default, World)]
pub struct VigilanteWorld {
    pub http: Arc<FakeHttp>,
    pub services: Vec<MonitoredService>,
    pub webhook_url: Option<String>,

    // Probe testing
    pub check_result: Option<CheckResult>,

    // Round testing
    pub poller: Option<Poller>,
    pub state: Option<StateHandle>,
    pub last_round: Option<RoundSummary>,
    pub recording_alerter: Option<Arc<RecordingAlerter>>,

    // Dashboard testing
    pub response_body: Option<String>,
}

/// Fake url for a service name
pub fn url_for(name: &str) -> String {
    format!("http://{}.test/health", name.to_lowercase().replace(' ', "-"))
}

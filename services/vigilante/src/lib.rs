//! Vigilante - service health poller
//!
//! Probes a fixed list of HTTP health endpoints on a schedule, alerts on
//! critical failures, and serves an HTML status page.

pub mod alert;
pub mod config;
pub mod error;
pub mod io;
pub mod poller;
pub mod probe;
pub mod report;
pub mod state;
pub mod webhook;

pub use config::{load_config, Config};
pub use error::{Result, VigilanteError};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::alert::Alerter;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::poller::{Poller, RoundSummary};
use crate::state::StateHandle;
use crate::webhook::WebhookAlerter;

fn build_alerters(config: &Config, http: &Arc<dyn HttpClient>) -> Vec<Arc<dyn Alerter>> {
    let mut alerters: Vec<Arc<dyn Alerter>> = Vec::new();
    if let Some(url) = &config.alerts.webhook_url {
        alerters.push(Arc::new(WebhookAlerter::new(url.clone(), Arc::clone(http))));
    }
    alerters
}

/// Build a poller for the configuration along with the read side of its stats
pub fn build_poller(config: &Config, http: Arc<dyn HttpClient>) -> (Poller, StateHandle) {
    let (publisher, handle) = state::new_state_channel(config.dashboard.history_size);
    let alerters = build_alerters(config, &http);
    let poller = Poller::new(
        config.services.clone(),
        http,
        alerters,
        Duration::from_secs(config.request_timeout_seconds),
        publisher,
    );
    (poller, handle)
}

/// Run a single round and report whether every service was healthy
pub async fn run_once(config: Config) -> Result<RoundSummary> {
    config.validate()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let (mut poller, _state) = build_poller(&config, http);

    let summary = poller.run_round().await;
    if summary.all_healthy() {
        tracing::info!("All checks passed");
    } else {
        tracing::warn!(
            "{} of {} checks failed",
            summary.failed(),
            summary.results.len()
        );
    }
    Ok(summary)
}

/// Serve the dashboard on an already bound listener until cancelled
pub async fn serve_dashboard(
    listener: TcpListener,
    state: StateHandle,
    service_count: usize,
    cancel: CancellationToken,
) -> Result<()> {
    let router = report::build_router(state, service_count);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await
        .map_err(|e| VigilanteError::Dashboard(e.to_string()))
}

/// Poll continuously and serve the dashboard until ctrl-c
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let cancel = CancellationToken::new();
    let (mut poller, state) = build_poller(&config, http);

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Start dashboard if enabled
    let dashboard = if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let service_count = config.services.len();
        let cancel_for_dashboard = cancel.clone();

        Some(tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            let listener = match TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };
            tracing::info!("Dashboard listening on http://{}", addr);

            if let Err(e) = serve_dashboard(listener, state, service_count, cancel_for_dashboard).await
            {
                tracing::error!("{}", e);
            }
            tracing::debug!("Dashboard stopped");
        }))
    } else {
        None
    };

    tracing::info!(
        "Continuous monitoring every {}s",
        config.polling_interval_seconds
    );

    poller
        .run(Duration::from_secs(config.polling_interval_seconds), cancel.clone())
        .await;

    if let Some(handle) = dashboard {
        if let Err(e) = handle.await {
            tracing::error!("Dashboard task failed: {}", e);
        }
    }
    tracing::info!("Vigilante stopped");

    Ok(())
}

//! Poller: runs check rounds over the monitored services and publishes stats

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::alert::{self, Alert, Alerter};
use crate::io::HttpClient;
use crate::probe::{self, CheckResult, MonitoredService};
use crate::state::{StatePublisher, Stats};

/// Results of one pass over every monitored service
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub results: Vec<CheckResult>,
    pub alerts_raised: usize,
    pub success_rate: f64,
}

impl RoundSummary {
    /// True iff every service was healthy in this round
    pub fn all_healthy(&self) -> bool {
        self.results.iter().all(|r| r.healthy)
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.healthy).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }
}

/// Owns the aggregate stats; the only writer of published snapshots
pub struct Poller {
    services: Vec<MonitoredService>,
    http: Arc<dyn HttpClient>,
    alerters: Vec<Arc<dyn Alerter>>,
    request_timeout: Duration,
    stats: Stats,
    publisher: StatePublisher,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("services", &self.services)
            .field("alerters", &self.alerters)
            .field("request_timeout", &self.request_timeout)
            .field("total", &self.stats.total)
            .finish()
    }
}

impl Poller {
    pub fn new(
        services: Vec<MonitoredService>,
        http: Arc<dyn HttpClient>,
        alerters: Vec<Arc<dyn Alerter>>,
        request_timeout: Duration,
        publisher: StatePublisher,
    ) -> Self {
        let history_max_size = publisher.borrow().history_max_size;
        Self {
            services,
            http,
            alerters,
            request_timeout,
            stats: Stats::new(history_max_size),
            publisher,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Check every service in order, one at a time
    pub async fn run_round(&mut self) -> RoundSummary {
        tracing::info!("Starting check round over {} services", self.services.len());

        let mut results = Vec::with_capacity(self.services.len());
        let mut alerts_raised = 0;

        for service in &self.services {
            tracing::debug!("Checking '{}' at {}", service.name, service.url);
            let mut result =
                probe::check_service(self.http.as_ref(), service, self.request_timeout).await;

            if result.healthy {
                tracing::info!("{}: healthy ({}ms)", service.name, result.response_time_ms);
                if service.is_https() {
                    let transport = probe::check_secure_transport(
                        self.http.as_ref(),
                        &service.url,
                        self.request_timeout,
                    )
                    .await;
                    if transport.passed {
                        tracing::info!("{}: {}", service.name, transport.message);
                    } else {
                        tracing::warn!("{}: {}", service.name, transport.message);
                    }
                    result.transport = Some(transport);
                }
            } else {
                tracing::warn!("{}: failed ({})", service.name, result.failure_reason());
            }

            self.stats.record(result.clone());
            self.publish();

            if !result.healthy && service.critical {
                let records = alert::raise(&Alert::critical_outage(&result), &self.alerters).await;
                self.stats.record_alert(records);
                self.publish();
                alerts_raised += 1;
            }

            results.push(result);
        }

        self.stats.finish_round();
        self.publish();

        let success_rate = self.stats.success_rate();
        log_summary(&self.stats, success_rate);

        RoundSummary {
            results,
            alerts_raised,
            success_rate,
        }
    }

    /// Run a round now, then once per `interval` until cancelled.
    ///
    /// Rounds never overlap: a slow round pushes the next tick back.
    pub async fn run(&mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => {
                    tracing::debug!("Polling loop cancelled");
                    break;
                }
            }

            tokio::select! {
                _ = self.run_round() => {}
                _ = cancel.cancelled() => {
                    tracing::debug!("Polling loop cancelled during a round");
                    break;
                }
            }
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(Arc::new(self.stats.clone()));
    }
}

fn log_summary(stats: &Stats, success_rate: f64) {
    if success_rate >= 90.0 {
        tracing::info!(
            "Success rate: {:.1}% ({}/{})",
            success_rate,
            stats.passed,
            stats.total
        );
    } else if success_rate >= 70.0 {
        tracing::warn!(
            "Success rate: {:.1}% ({}/{})",
            success_rate,
            stats.passed,
            stats.total
        );
    } else {
        tracing::error!(
            "Success rate: {:.1}% ({}/{})",
            success_rate,
            stats.passed,
            stats.total
        );
    }
}

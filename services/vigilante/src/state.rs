//! Aggregate counters, bounded result history and published snapshots

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::alert::AlertRecord;
use crate::probe::CheckResult;

/// Counters and recent results. Owned by the poller, published as snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub rounds: u64,
    pub alerts_raised: u64,
    pub history: VecDeque<CheckResult>,
    pub alerts: VecDeque<AlertRecord>,
    pub history_max_size: usize,
}

impl Stats {
    pub fn new(history_max_size: usize) -> Self {
        Self {
            total: 0,
            passed: 0,
            failed: 0,
            rounds: 0,
            alerts_raised: 0,
            history: VecDeque::with_capacity(history_max_size),
            alerts: VecDeque::with_capacity(history_max_size),
            history_max_size,
        }
    }

    /// Count a result and append it to history, evicting the oldest entry
    pub fn record(&mut self, result: CheckResult) {
        self.total += 1;
        if result.healthy {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        push_bounded(&mut self.history, result, self.history_max_size);
    }

    /// Count a raised alert and keep its delivery records
    pub fn record_alert(&mut self, records: Vec<AlertRecord>) {
        self.alerts_raised += 1;
        for record in records {
            push_bounded(&mut self.alerts, record, self.history_max_size);
        }
    }

    pub fn finish_round(&mut self) {
        self.rounds += 1;
    }

    /// Percentage of passed checks, 0 when nothing has run yet
    pub fn success_rate(&self) -> f64 {
        self.passed as f64 / self.total.max(1) as f64 * 100.0
    }

    /// The newest `n` results in chronological order
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &CheckResult> {
        self.history.iter().skip(self.history.len().saturating_sub(n))
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, max: usize) {
    while queue.len() >= max.max(1) {
        queue.pop_front();
    }
    queue.push_back(item);
}

/// Read side of the published stats
pub type StateHandle = watch::Receiver<Arc<Stats>>;

/// Write side of the published stats
pub type StatePublisher = watch::Sender<Arc<Stats>>;

pub fn new_state_channel(history_max_size: usize) -> (StatePublisher, StateHandle) {
    watch::channel(Arc::new(Stats::new(history_max_size)))
}

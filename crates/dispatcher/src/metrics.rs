//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use crate::round::RoundOutcome;

/// Round counters of a dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Rounds executed, eof round included
    rounds: AtomicU64,
    /// Rounds where nothing was dispatched before eof
    idle_rounds: AtomicU64,
    /// Events dispatched across all subjects
    events: AtomicU64,
    /// Largest number of events in a single round
    max_events_per_round: AtomicU64,
    /// Rounds that found every subject exhausted
    eof_rounds: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one finished round and forward it to the metrics recorder
    pub fn record(&self, outcome: &RoundOutcome) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
        if outcome.is_idle() {
            self.idle_rounds.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.eof {
            self.eof_rounds.fetch_add(1, Ordering::Relaxed);
        }
        let events = outcome.events as u64;
        self.events.fetch_add(events, Ordering::Relaxed);
        self.max_events_per_round
            .fetch_max(events, Ordering::Relaxed);

        observability::record_round(outcome.events, outcome.is_idle(), outcome.eof);
        if let Some(ts) = outcome.timestamp {
            observability::record_round_timestamp(ts);
        }
    }

    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    pub fn idle_rounds(&self) -> u64 {
        self.idle_rounds.load(Ordering::Relaxed)
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rounds: self.rounds(),
            idle_rounds: self.idle_rounds(),
            events: self.events(),
            max_events_per_round: self.max_events_per_round.load(Ordering::Relaxed),
            eof_rounds: self.eof_rounds.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rounds: u64,
    pub idle_rounds: u64,
    pub events: u64,
    pub max_events_per_round: u64,
    pub eof_rounds: u64,
}

impl MetricsSnapshot {
    /// Mean events per round, 0 when no round ran
    pub fn events_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.events as f64 / self.rounds as f64
        }
    }
}

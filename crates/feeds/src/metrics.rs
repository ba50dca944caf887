//! Per-feed counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Feed metrics
#[derive(Debug, Default)]
pub struct FeedMetrics {
    /// Events handed to listeners
    pub events_dispatched: AtomicU64,

    /// Events pushed into the channel by a producer thread
    pub events_produced: AtomicU64,

    /// `dispatch()` calls that found nothing pending
    pub empty_polls: AtomicU64,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatched(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_produced(&self) {
        self.events_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_poll(&self) {
        self.empty_polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        FeedMetricsSnapshot {
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            events_produced: self.events_produced.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedMetricsSnapshot {
    pub events_dispatched: u64,
    pub events_produced: u64,
    pub empty_polls: u64,
}

impl FeedMetricsSnapshot {
    /// Events produced but not dispatched yet
    pub fn backlog(&self) -> u64 {
        self.events_produced.saturating_sub(self.events_dispatched)
    }
}

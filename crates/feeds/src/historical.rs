//! 历史回放 feed
//!
//! 将记录好的带时间戳事件按时间顺序逐个分发。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    ContractError, DispatchPriority, EventCallback, EventRecord, FeedEvent, Subject, SubjectId,
    Timestamp,
};
use tracing::{debug, trace};

use crate::error::FeedError;
use crate::listeners::Listeners;
use crate::metrics::FeedMetrics;

#[derive(Debug, Default)]
struct ReplayState {
    pending: VecDeque<EventRecord>,
    sequence: u64,
}

/// Replays a fixed set of timestamped events, earliest first.
///
/// Events sharing a timestamp keep the order they were given in. The feed is
/// exhausted once every event was dispatched.
pub struct HistoricalFeed {
    id: SubjectId,
    priority: DispatchPriority,
    state: Mutex<ReplayState>,
    started: AtomicBool,
    listeners: Listeners,
    metrics: Arc<FeedMetrics>,
}

impl HistoricalFeed {
    pub fn new(id: impl Into<SubjectId>, events: impl IntoIterator<Item = EventRecord>) -> Self {
        let mut events: Vec<EventRecord> = events.into_iter().collect();
        events.sort_by_key(|e| e.at);

        Self {
            id: id.into(),
            priority: DispatchPriority::Last,
            state: Mutex::new(ReplayState {
                pending: events.into(),
                sequence: 0,
            }),
            started: AtomicBool::new(false),
            listeners: Listeners::default(),
            metrics: Arc::new(FeedMetrics::new()),
        }
    }

    pub fn with_priority(mut self, priority: DispatchPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Register a listener for dispatched events
    pub fn listen(&self, callback: EventCallback) {
        self.listeners.add(callback);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Events not dispatched yet
    pub fn remaining(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn metrics(&self) -> Arc<FeedMetrics> {
        Arc::clone(&self.metrics)
    }

    fn lock(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_started(&self) -> Result<(), FeedError> {
        if self.started.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(FeedError::NotStarted {
                feed_id: self.id.to_string(),
            })
        }
    }
}

impl Subject for HistoricalFeed {
    fn id(&self) -> &str {
        &self.id
    }

    fn dispatch_priority(&self) -> DispatchPriority {
        self.priority
    }

    fn is_exhausted(&self) -> bool {
        self.lock().pending.is_empty()
    }

    fn peek_timestamp(&self) -> Result<Option<Timestamp>, ContractError> {
        self.ensure_started()?;
        match self.lock().pending.front() {
            Some(record) => Ok(Some(record.at)),
            None => Err(ContractError::subject_dispatch(
                self.id.as_str(),
                "no pending event to peek",
            )),
        }
    }

    fn dispatch(&self) -> Result<bool, ContractError> {
        self.ensure_started()?;

        let event = {
            let mut state = self.lock();
            let Some(record) = state.pending.pop_front() else {
                self.metrics.record_empty_poll();
                return Ok(false);
            };
            state.sequence += 1;
            FeedEvent {
                source: self.id.clone(),
                sequence: state.sequence,
                timestamp: Some(record.at),
                payload: record.payload,
            }
        };

        trace!(feed_id = %self.id, sequence = event.sequence, at = ?event.timestamp, "replaying event");
        self.listeners.notify(&event);
        self.metrics.record_dispatched();
        observability::record_event_dispatched(&self.id, false);

        Ok(true)
    }

    fn start(&self) -> Result<(), ContractError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(FeedError::AlreadyStarted {
                feed_id: self.id.to_string(),
            }
            .into());
        }
        debug!(feed_id = %self.id, events = self.remaining(), "historical feed started");
        Ok(())
    }

    fn stop(&self) -> Result<(), ContractError> {
        debug!(feed_id = %self.id, remaining = self.remaining(), "historical feed stopped");
        Ok(())
    }

    fn join(&self) -> Result<(), ContractError> {
        Ok(())
    }
}

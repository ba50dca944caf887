//! 事件记录器
//!
//! 按到达顺序收集所有 feed 分发的事件，用于输出合并后的事件流。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{EventCallback, FeedEvent};

/// Collects dispatched events in arrival order.
///
/// Cheap to clone; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<FeedEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener that appends every event it receives
    pub fn callback(&self) -> EventCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |event: &FeedEvent| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        })
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<FeedEvent> {
        self.lock().clone()
    }

    /// Drain the buffer
    pub fn take(&self) -> Vec<FeedEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of recorded events emitted by `source`
    pub fn count_from(&self, source: &str) -> usize {
        self.lock().iter().filter(|e| e.source == source).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FeedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

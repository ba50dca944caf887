use std::sync::{Mutex, PoisonError};

use contracts::{EventCallback, FeedEvent};

/// Callbacks registered on a feed, notified in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    callbacks: Mutex<Vec<EventCallback>>,
}

impl Listeners {
    pub(crate) fn add(&self, callback: EventCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Callbacks run outside the lock so they may register further listeners.
    pub(crate) fn notify(&self, event: &FeedEvent) {
        let snapshot: Vec<EventCallback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in snapshot {
            callback(event);
        }
    }
}

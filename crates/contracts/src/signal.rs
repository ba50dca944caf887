//! Signal - fire-and-observe notification
//!
//! 无载荷的通知原语：回调按注册顺序同步执行。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Opaque token returned by [`Signal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of callbacks invoked when an occurrence is announced.
///
/// Handlers run synchronously, in registration order, on the thread that calls
/// [`Signal::emit`]. Emission iterates over a snapshot of the registry, so a
/// handler may subscribe or unsubscribe (itself included) while running; the
/// change is visible from the next emission on.
pub struct Signal {
    name: &'static str,
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
}

impl Signal {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Invoke every registered handler.
    pub fn emit(&self) {
        let snapshot: Vec<Handler> = self.lock().iter().map(|(_, h)| h.clone()).collect();
        tracing::trace!(signal = self.name, handlers = snapshot.len(), "signal emitted");
        for handler in snapshot {
            handler();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking handler never holds the lock, so poisoning carries no torn state.
    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Handler)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("handlers", &self.len())
            .finish()
    }
}

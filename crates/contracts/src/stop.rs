//! StopHandle - cooperative cancellation flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle that requests a dispatcher to stop.
///
/// Setting the flag never interrupts an in-flight `dispatch()` or `join()`;
/// the dispatcher observes it at the next round boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let handle = StopHandle::new();
        let other = handle.clone();
        assert!(!other.is_stop_requested());

        handle.stop();
        assert!(other.is_stop_requested());
    }

    #[test]
    fn stop_from_another_thread() {
        let handle = StopHandle::new();
        let remote = handle.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(handle.is_stop_requested());
    }
}

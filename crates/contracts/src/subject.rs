//! Subject trait - event source abstraction
//!
//! A subject is an independent source of timestamped (historical) or
//! timestamp-less (realtime) events. The dispatcher only decides *when* a
//! subject may fire; what an event means is up to the subject and its listeners.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{ContractError, DispatchPriority, Signal, StopHandle};

/// Event time used to order subjects against each other
pub type Timestamp = DateTime<Utc>;

/// Shared subject handle. Identity (not value equality) distinguishes subjects.
pub type SubjectRef = Arc<dyn Subject>;

/// View of the dispatcher handed to a subject when it is registered.
pub trait DispatchContext {
    /// Timestamp of the last computed round, `None` before the first round
    /// or while only realtime subjects are pending.
    fn current_datetime(&self) -> Option<Timestamp>;

    /// Handle that requests the dispatcher to stop at the next round boundary
    fn stop_handle(&self) -> StopHandle;

    /// Fired once, after every subject was started and before the first round
    fn start_signal(&self) -> &Signal;

    /// Fired for each round in which nothing was dispatched and data remains
    fn idle_signal(&self) -> &Signal;
}

/// Event source driven by the dispatcher.
///
/// # Lifecycle contract
///
/// 1. `on_registered` exactly once, when added to a dispatcher
/// 2. `start` before any `is_exhausted` / `peek_timestamp` / `dispatch`
/// 3. `stop` to request shutdown, then `join` to wait until shutdown completes
///
/// Methods take `&self`; implementations that keep state use interior
/// mutability. Implementations backed by background threads must tolerate
/// `peek_timestamp` and `dispatch` racing with their own producers.
pub trait Subject: Send + Sync {
    /// Identifier used in logs and metrics
    fn id(&self) -> &str;

    /// Position in the dispatch order
    fn dispatch_priority(&self) -> DispatchPriority {
        DispatchPriority::Last
    }

    /// `true` once the subject will never produce another event
    fn is_exhausted(&self) -> bool;

    /// Timestamp of the next pending event.
    ///
    /// `None` marks a realtime subject: eligible in every round and never
    /// constraining the round timestamp.
    fn peek_timestamp(&self) -> Result<Option<Timestamp>, ContractError>;

    /// Emit the next pending event. Returns whether something was dispatched.
    fn dispatch(&self) -> Result<bool, ContractError>;

    fn start(&self) -> Result<(), ContractError>;

    fn stop(&self) -> Result<(), ContractError>;

    /// Block until background activity started by `start` has finished
    fn join(&self) -> Result<(), ContractError>;

    /// Called once when the subject is added to a dispatcher
    fn on_registered(&self, _ctx: &dyn DispatchContext) {}
}

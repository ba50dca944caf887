//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Event time is `chrono::DateTime<Utc>` ([`Timestamp`])
//! - A subject without a pending timestamp is *realtime* and always eligible
//! - The dispatcher clock only advances over historical (timestamped) events

mod error;
mod event;
mod priority;
mod scenario;
mod signal;
mod stop;
mod subject;
mod subject_id;

pub use error::*;
pub use event::{EventCallback, FeedEvent};
pub use priority::DispatchPriority;
pub use scenario::*;
pub use signal::{Signal, SubscriptionId};
pub use stop::StopHandle;
pub use subject::{DispatchContext, Subject, SubjectRef, Timestamp};
pub use subject_id::SubjectId;

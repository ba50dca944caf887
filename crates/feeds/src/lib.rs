//! # Feeds
//!
//! Concrete subjects driven by the dispatcher.
//!
//! Responsibilities:
//! - Replay recorded, timestamped events in time order (`HistoricalFeed`)
//! - Produce timestamp-less events from a background thread (`RealtimeFeed`)
//! - Deliver every dispatched event to registered listeners
//! - Build subjects from scenario configuration
//!
//! ## Usage Example
//!
//! ```ignore
//! use feeds::{build_subjects, EventRecorder};
//!
//! let recorder = EventRecorder::new();
//! let subjects = build_subjects(&scenario, Some(recorder.callback()))?;
//!
//! let mut dispatcher = Dispatcher::new();
//! for subject in subjects {
//!     dispatcher.add_subject(subject);
//! }
//! dispatcher.run()?;
//!
//! for event in recorder.events() {
//!     println!("{} #{}", event.source, event.sequence);
//! }
//! ```

mod builder;
mod error;
mod historical;
mod listeners;
mod metrics;
mod realtime;
mod recorder;

// Re-exports
pub use builder::{build_subject, build_subjects};
pub use contracts::{EventCallback, FeedEvent};
pub use error::{FeedError, Result};
pub use historical::HistoricalFeed;
pub use metrics::{FeedMetrics, FeedMetricsSnapshot};
pub use realtime::{RealtimeConfig, RealtimeFeed};
pub use recorder::EventRecorder;

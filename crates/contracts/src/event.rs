//! FeedEvent - 订阅者收到的事件

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{SubjectId, Timestamp};

/// Event emitted by a subject when the dispatcher lets it fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    /// Emitting subject
    pub source: SubjectId,

    /// Per-subject sequence number, starting at 1
    pub sequence: u64,

    /// Event time; `None` for realtime events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,

    /// Opaque payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl FeedEvent {
    pub fn is_realtime(&self) -> bool {
        self.timestamp.is_none()
    }
}

/// Listener invoked synchronously from `Subject::dispatch`.
pub type EventCallback = Arc<dyn Fn(&FeedEvent) + Send + Sync>;

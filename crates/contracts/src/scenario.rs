//! Scenario - Config Loader 输出
//!
//! 描述一次回放：调度模式与全部 subject 定义。

use serde::{Deserialize, Serialize};

use crate::{DispatchPriority, SubjectId, Timestamp};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的回放场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 调度设置
    #[serde(default)]
    pub dispatcher: DispatcherSettings,

    /// Subject 定义列表 (注册顺序)
    pub subjects: Vec<SubjectConfig>,
}

/// How the dispatcher is driven
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatcherSettings {
    /// Run-to-completion or externally stepped
    #[serde(default)]
    pub mode: DriveMode,

    /// Safety cap on the number of rounds; reaching it requests a stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u64>,
}

/// Execution mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Blocking `run()` until end-of-data or stop
    #[default]
    Run,
    /// Repeated `step()` calls
    Step,
}

/// Subject 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// Replays a fixed list of timestamped events
    Historical,
    /// Produces timestamp-less events from a background thread
    Realtime,
}

/// Subject 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectConfig {
    /// 唯一标识符
    pub id: SubjectId,

    /// Subject 类型
    pub kind: SubjectKind,

    /// Dispatch level; absent means last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    /// Historical events (historical only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,

    /// Production interval in milliseconds (realtime only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,

    /// Number of events to produce before closing (realtime only, None = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Bounded channel capacity between producer thread and dispatcher (realtime only)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Payload attached to every realtime event
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,

    /// Max wait in milliseconds for an event when the channel is empty (realtime only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_timeout_ms: Option<u64>,
}

fn default_channel_capacity() -> usize {
    64
}

/// One recorded historical event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event time (RFC 3339)
    pub at: Timestamp,

    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl SubjectConfig {
    pub fn dispatch_priority(&self) -> DispatchPriority {
        DispatchPriority::from(self.priority)
    }
}

impl Scenario {
    pub fn subjects_of_kind(&self, kind: SubjectKind) -> impl Iterator<Item = &SubjectConfig> {
        self.subjects.iter().filter(move |s| s.kind == kind)
    }

    /// Total number of recorded historical events
    pub fn historical_event_count(&self) -> usize {
        self.subjects_of_kind(SubjectKind::Historical)
            .map(|s| s.events.len())
            .sum()
    }

    /// Earliest and latest historical event time
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        self.subjects
            .iter()
            .flat_map(|s| s.events.iter().map(|e| e.at))
            .fold(None, |range, at| match range {
                None => Some((at, at)),
                Some((lo, hi)) => Some((lo.min(at), hi.max(at))),
            })
    }
}

//! Dispatch priority of a subject.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a subject in the dispatch order.
///
/// Lower levels are dispatched first within a round. [`DispatchPriority::Last`]
/// trails every level and keeps insertion order among its peers.
///
/// The derived ordering matches dispatch order: every `Level` sorts before `Last`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPriority {
    /// Explicit level, compared numerically
    Level(u32),
    /// No specific priority
    #[default]
    Last,
}

impl DispatchPriority {
    #[inline]
    pub fn is_last(self) -> bool {
        matches!(self, Self::Last)
    }

    /// Whether a subject with priority `self` must be placed before an
    /// already-registered subject with priority `existing`.
    ///
    /// `Last` never displaces anything; a level displaces `Last` and any
    /// strictly greater level, so equal levels keep insertion order.
    pub fn goes_before(self, existing: DispatchPriority) -> bool {
        match (self, existing) {
            (Self::Last, _) => false,
            (Self::Level(_), Self::Last) => true,
            (Self::Level(new), Self::Level(old)) => new < old,
        }
    }
}

impl From<Option<u32>> for DispatchPriority {
    fn from(level: Option<u32>) -> Self {
        level.map_or(Self::Last, Self::Level)
    }
}

impl fmt::Display for DispatchPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Last => f.write_str("last"),
        }
    }
}

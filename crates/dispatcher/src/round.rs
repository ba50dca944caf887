//! One lockstep round: min-timestamp scan followed by dispatch

use contracts::{ContractError, SubjectRef, Timestamp};
use tracing::trace;

/// Result of a single round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Every subject was exhausted; nothing was scanned or dispatched
    pub eof: bool,

    /// Round timestamp: minimum of the defined pending timestamps,
    /// `None` for eof and for pure-realtime rounds
    pub timestamp: Option<Timestamp>,

    /// Number of subjects whose `dispatch()` reported an event
    pub events: usize,
}

impl RoundOutcome {
    pub fn eof() -> Self {
        Self {
            eof: true,
            ..Self::default()
        }
    }

    pub fn dispatched(&self) -> bool {
        self.events > 0
    }

    /// Round that was not eof and in which nothing was dispatched
    pub fn is_idle(&self) -> bool {
        !self.eof && !self.dispatched()
    }
}

/// Execute one round over `subjects` (in dispatch order).
///
/// Each active subject's pending timestamp is read once, during the scan, and
/// that snapshot decides eligibility. Realtime subjects (no timestamp) are
/// eligible every round and do not take part in the minimum. Exhaustion is
/// re-checked right before dispatching.
///
/// `clock` receives the round timestamp before any subject is dispatched and
/// is left untouched on eof.
pub(crate) fn run_round(
    subjects: &[SubjectRef],
    clock: &mut Option<Timestamp>,
) -> Result<RoundOutcome, ContractError> {
    let mut pending: Vec<(&SubjectRef, Option<Timestamp>)> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        if !subject.is_exhausted() {
            pending.push((subject, subject.peek_timestamp()?));
        }
    }

    if pending.is_empty() {
        return Ok(RoundOutcome::eof());
    }

    let min_ts = pending.iter().filter_map(|(_, ts)| *ts).min();
    *clock = min_ts;

    let mut events = 0;
    for (subject, ts) in pending {
        if ts.is_some() && ts != min_ts {
            continue;
        }
        if subject.is_exhausted() {
            continue;
        }
        if subject.dispatch()? {
            trace!(subject = subject.id(), realtime = ts.is_none(), "event dispatched");
            events += 1;
        }
    }

    Ok(RoundOutcome {
        eof: false,
        timestamp: min_ts,
        events,
    })
}

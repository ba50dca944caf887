//! Subject lifecycle: start, teardown, and the dispatcher state machine

use contracts::{ContractError, SubjectRef};
use tracing::{debug, warn};

/// Dispatcher lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    /// Subjects may still be added; nothing was started
    #[default]
    NotStarted,
    /// Subjects were started; rounds are being executed
    Running,
    /// Every subject was stopped and joined. Terminal.
    Ended,
}

/// Start every subject in dispatch order, stopping at the first failure.
pub(crate) fn start_all(subjects: &[SubjectRef]) -> Result<(), ContractError> {
    for subject in subjects {
        subject.start()?;
        debug!(subject = subject.id(), "subject started");
    }
    Ok(())
}

/// Stop every subject, then join every subject, both in dispatch order.
///
/// A failing subject does not prevent the others from being stopped and
/// joined. The first error is returned; later ones are only logged.
pub(crate) fn teardown_all(subjects: &[SubjectRef]) -> Result<(), ContractError> {
    let mut first_error = None;

    for subject in subjects {
        if let Err(e) = subject.stop() {
            warn!(subject = subject.id(), error = %e, "subject stop failed");
            first_error.get_or_insert(e);
        }
    }

    for subject in subjects {
        match subject.join() {
            Ok(()) => debug!(subject = subject.id(), "subject joined"),
            Err(e) => {
                warn!(subject = subject.id(), error = %e, "subject join failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Tears subjects down when dropped while still armed.
///
/// Normal exits call [`TeardownGuard::complete`] to get the teardown result;
/// the `Drop` path only runs if the dispatch loop unwinds.
pub(crate) struct TeardownGuard {
    subjects: Vec<SubjectRef>,
    armed: bool,
}

impl TeardownGuard {
    pub(crate) fn new(subjects: &[SubjectRef]) -> Self {
        Self {
            subjects: subjects.to_vec(),
            armed: true,
        }
    }

    pub(crate) fn complete(mut self) -> Result<(), ContractError> {
        self.armed = false;
        teardown_all(&self.subjects)
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(
            subjects = self.subjects.len(),
            "dispatch loop unwound, tearing subjects down"
        );
        if let Err(e) = teardown_all(&self.subjects) {
            warn!(error = %e, "teardown after unwind failed");
        }
    }
}

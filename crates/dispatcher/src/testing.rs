//! Scripted subjects for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use contracts::{ContractError, DispatchContext, DispatchPriority, Subject, Timestamp};

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub(crate) fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

enum Script {
    Historical(Mutex<VecDeque<Timestamp>>),
    /// Each entry is the result of one dispatch; exhausted once empty
    Realtime(Mutex<VecDeque<bool>>),
}

pub(crate) struct ScriptedSubject {
    id: String,
    priority: DispatchPriority,
    script: Script,
    log: CallLog,
    calls: AtomicUsize,
    registrations: AtomicUsize,
    fail_dispatch_on: Option<usize>,
    fail_start: bool,
    dispatch_count: AtomicUsize,
}

impl ScriptedSubject {
    pub(crate) fn historical(id: &str, secs: &[i64]) -> Self {
        let timestamps = secs.iter().map(|&s| ts(s)).collect();
        Self::with_script(id, Script::Historical(Mutex::new(timestamps)))
    }

    pub(crate) fn realtime(id: &str, results: &[bool]) -> Self {
        let script = results.iter().copied().collect();
        Self::with_script(id, Script::Realtime(Mutex::new(script)))
    }

    fn with_script(id: &str, script: Script) -> Self {
        Self {
            id: id.to_string(),
            priority: DispatchPriority::Last,
            script,
            log: new_log(),
            calls: AtomicUsize::new(0),
            registrations: AtomicUsize::new(0),
            fail_dispatch_on: None,
            fail_start: false,
            dispatch_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_priority(mut self, priority: DispatchPriority) -> Self {
        self.priority = priority;
        self
    }

    pub(crate) fn with_log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    /// Fail the n-th dispatch (1-based)
    pub(crate) fn failing_dispatch(mut self, n: usize) -> Self {
        self.fail_dispatch_on = Some(n);
        self
    }

    pub(crate) fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub(crate) fn dispatch_attempts(&self) -> usize {
        self.dispatch_count.load(Ordering::SeqCst)
    }

    fn record(&self, what: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", self.id, what));
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Subject for ScriptedSubject {
    fn id(&self) -> &str {
        &self.id
    }

    fn dispatch_priority(&self) -> DispatchPriority {
        self.priority
    }

    fn is_exhausted(&self) -> bool {
        self.touch();
        match &self.script {
            Script::Historical(q) => q.lock().unwrap().is_empty(),
            Script::Realtime(q) => q.lock().unwrap().is_empty(),
        }
    }

    fn peek_timestamp(&self) -> Result<Option<Timestamp>, ContractError> {
        self.touch();
        Ok(match &self.script {
            Script::Historical(q) => q.lock().unwrap().front().copied(),
            Script::Realtime(_) => None,
        })
    }

    fn dispatch(&self) -> Result<bool, ContractError> {
        self.touch();
        let n = self.dispatch_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_dispatch_on == Some(n) {
            self.record("dispatch_failed");
            return Err(ContractError::subject_dispatch(&self.id, "scripted failure"));
        }
        let dispatched = match &self.script {
            Script::Historical(q) => q.lock().unwrap().pop_front().is_some(),
            Script::Realtime(q) => q.lock().unwrap().pop_front().unwrap_or(false),
        };
        if dispatched {
            self.record("dispatch");
        }
        Ok(dispatched)
    }

    fn start(&self) -> Result<(), ContractError> {
        self.touch();
        self.record("start");
        if self.fail_start {
            return Err(ContractError::subject_lifecycle(&self.id, "scripted start failure"));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), ContractError> {
        self.touch();
        self.record("stop");
        Ok(())
    }

    fn join(&self) -> Result<(), ContractError> {
        self.touch();
        self.record("join");
        Ok(())
    }

    fn on_registered(&self, _ctx: &dyn DispatchContext) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        self.record("registered");
    }
}

//! Dispatcher - lockstep main loop over registered subjects

use contracts::{
    ContractError, DispatchContext, Signal, StopHandle, SubjectRef, Timestamp,
};
use tracing::{debug, info, instrument, warn};

use crate::lifecycle::{self, LifecycleState, TeardownGuard};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::SubjectRegistry;
use crate::round::{self, RoundOutcome};

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Request a stop once this many rounds have run (None = until eof)
    pub max_rounds: Option<u64>,
}

/// Drives registered subjects forward in lockstep by event timestamp.
///
/// Each round dispatches every subject whose pending timestamp equals the
/// minimum pending timestamp, plus every realtime subject. Consumed once:
/// either by [`Dispatcher::run`] or by repeated [`Dispatcher::step`] calls.
pub struct Dispatcher {
    config: DispatcherConfig,
    registry: SubjectRegistry,
    current_timestamp: Option<Timestamp>,
    stop: StopHandle,
    state: LifecycleState,
    start_signal: Signal,
    idle_signal: Signal,
    metrics: DispatchMetrics,
    last_round: Option<RoundOutcome>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            config,
            registry: SubjectRegistry::new(),
            current_timestamp: None,
            stop: StopHandle::new(),
            state: LifecycleState::NotStarted,
            start_signal: Signal::new("start"),
            idle_signal: Signal::new("idle"),
            metrics: DispatchMetrics::new(),
            last_round: None,
        }
    }

    /// Register a subject at its priority position.
    ///
    /// Adding the same handle twice is a no-op and returns `false`.
    /// Subjects must be added before the first `run()`/`step()`.
    #[instrument(
        name = "dispatcher_add_subject",
        level = "debug",
        skip(self, subject),
        fields(subject = subject.id(), priority = %subject.dispatch_priority())
    )]
    pub fn add_subject(&mut self, subject: SubjectRef) -> bool {
        if self.state != LifecycleState::NotStarted {
            warn!(state = ?self.state, "subject added after dispatch began");
        }

        match self.registry.insert(subject.clone()) {
            Some(position) => {
                debug!(position, "subject registered");
                subject.on_registered(&*self);
                true
            }
            None => {
                debug!("subject already registered, skipping");
                false
            }
        }
    }

    /// Registered subjects, in dispatch order
    pub fn subjects(&self) -> &[SubjectRef] {
        self.registry.as_slice()
    }

    /// Timestamp of the last round; `None` before the first round and after
    /// a pure-realtime round.
    pub fn current_datetime(&self) -> Option<Timestamp> {
        self.current_timestamp
    }

    /// Request a stop; observed at the next round boundary.
    pub fn stop(&self) {
        info!("stop requested");
        self.stop.stop();
    }

    /// Handle that can request a stop from other threads or from subjects
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }

    pub fn start_signal(&self) -> &Signal {
        &self.start_signal
    }

    pub fn idle_signal(&self) -> &Signal {
        &self.idle_signal
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn ended(&self) -> bool {
        self.state == LifecycleState::Ended
    }

    /// Outcome of the most recent round
    pub fn last_round(&self) -> Option<RoundOutcome> {
        self.last_round
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run rounds until end-of-data or an external stop.
    ///
    /// Every subject is stopped and then joined before returning, on every
    /// exit path: eof, stop request, subject error, or unwinding. A loop
    /// error takes precedence over a teardown error.
    ///
    /// Calling `run()` on an ended dispatcher is a no-op.
    #[instrument(name = "dispatcher_run", skip(self), fields(subjects = self.registry.len()))]
    pub fn run(&mut self) -> Result<(), ContractError> {
        if self.ended() {
            debug!("dispatcher already ended");
            return Ok(());
        }

        let guard = TeardownGuard::new(self.registry.as_slice());
        let outcome = self.drive();
        let teardown = guard.complete();
        self.end();

        outcome.and(teardown)
    }

    /// Advance the state machine by one round.
    ///
    /// Returns `Ok(true)` while the dispatcher has not ended. The call that
    /// detects eof or a stop request also stops and joins every subject, so
    /// it already returns `Ok(false)`. If starting or the round fails, the
    /// subjects are torn down in the same call and the error is returned.
    #[instrument(name = "dispatcher_step", level = "debug", skip(self), fields(state = ?self.state))]
    pub fn step(&mut self) -> Result<bool, ContractError> {
        if self.ended() {
            return Ok(false);
        }

        let progressed = self.step_once();
        if progressed.is_err() {
            self.stop.stop();
        }

        if self.stop.is_stop_requested() {
            let teardown = lifecycle::teardown_all(self.registry.as_slice());
            self.end();
            progressed.and(teardown)?;
        } else {
            progressed?;
        }

        Ok(!self.ended())
    }

    fn step_once(&mut self) -> Result<(), ContractError> {
        if self.state == LifecycleState::NotStarted {
            self.start_subjects()?;
        }
        if !self.stop.is_stop_requested() {
            self.advance()?;
        }
        Ok(())
    }

    fn drive(&mut self) -> Result<(), ContractError> {
        if self.state == LifecycleState::NotStarted {
            self.start_subjects()?;
        }
        while !self.stop.is_stop_requested() {
            self.advance()?;
        }
        Ok(())
    }

    #[instrument(name = "dispatcher_start_subjects", skip(self))]
    fn start_subjects(&mut self) -> Result<(), ContractError> {
        // Running before start_all so that a failed start is still torn down.
        self.state = LifecycleState::Running;
        observability::record_lifecycle("running");
        lifecycle::start_all(self.registry.as_slice())?;
        info!(subjects = self.registry.len(), "subjects started");
        self.start_signal.emit();
        Ok(())
    }

    /// One round plus its consequences: eof stops, idle fires the idle signal.
    fn advance(&mut self) -> Result<(), ContractError> {
        let outcome = round::run_round(self.registry.as_slice(), &mut self.current_timestamp)?;
        self.metrics.record(&outcome);
        self.last_round = Some(outcome);

        if outcome.eof {
            info!(rounds = self.metrics.rounds(), "all subjects exhausted");
            self.stop.stop();
            return Ok(());
        }

        if outcome.is_idle() {
            self.idle_signal.emit();
        }

        if let Some(limit) = self.config.max_rounds {
            if self.metrics.rounds() >= limit {
                info!(limit, "round limit reached");
                self.stop.stop();
            }
        }
        Ok(())
    }

    fn end(&mut self) {
        self.state = LifecycleState::Ended;
        observability::record_lifecycle("ended");
        let snapshot = self.metrics.snapshot();
        info!(
            rounds = snapshot.rounds,
            idle_rounds = snapshot.idle_rounds,
            events = snapshot.events,
            "dispatcher ended"
        );
    }
}

impl DispatchContext for Dispatcher {
    fn current_datetime(&self) -> Option<Timestamp> {
        Dispatcher::current_datetime(self)
    }

    fn stop_handle(&self) -> StopHandle {
        Dispatcher::stop_handle(self)
    }

    fn start_signal(&self) -> &Signal {
        Dispatcher::start_signal(self)
    }

    fn idle_signal(&self) -> &Signal {
        Dispatcher::idle_signal(self)
    }
}

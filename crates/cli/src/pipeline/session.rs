//! Session - wires scenario, feeds and dispatcher together

use std::time::Instant;

use contracts::{DriveMode, Scenario, StopHandle};
use dispatcher::{Dispatcher, DispatcherConfig};
use feeds::{build_subjects, EventRecorder};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::pipeline::SessionStats;

/// One scenario run: subjects built, registered and ready to be driven.
pub struct Session {
    mode: DriveMode,
    dispatcher: Dispatcher,
    recorder: EventRecorder,
}

impl Session {
    /// Build every subject of the scenario and register it with a fresh dispatcher.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let recorder = EventRecorder::new();
        let subjects = build_subjects(scenario, Some(recorder.callback()))?;

        let mut dispatcher = Dispatcher::with_config(DispatcherConfig {
            max_rounds: scenario.dispatcher.max_rounds,
        });
        for subject in subjects {
            dispatcher.add_subject(subject);
        }

        let order: Vec<&str> = dispatcher.subjects().iter().map(|s| s.id()).collect();
        debug!(?order, mode = ?scenario.dispatcher.mode, "session prepared");

        Ok(Self {
            mode: scenario.dispatcher.mode,
            dispatcher,
            recorder,
        })
    }

    /// Handle that stops the session at the next round boundary
    pub fn stop_handle(&self) -> StopHandle {
        self.dispatcher.stop_handle()
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Drive the dispatcher until it ends. Blocks the calling thread.
    #[instrument(name = "session_drive", skip(self), fields(mode = ?self.mode))]
    pub fn drive(mut self) -> Result<SessionStats> {
        let started = Instant::now();
        let subjects = self.dispatcher.subjects().len();

        let steps = match self.mode {
            DriveMode::Run => {
                self.dispatcher.run()?;
                None
            }
            DriveMode::Step => {
                let mut steps: u64 = 0;
                loop {
                    steps += 1;
                    if !self.dispatcher.step()? {
                        break;
                    }
                }
                Some(steps)
            }
        };

        let metrics = self.dispatcher.metrics();
        let stats = SessionStats {
            mode: self.mode,
            subjects,
            rounds: metrics.rounds,
            idle_rounds: metrics.idle_rounds,
            events_dispatched: metrics.events,
            max_events_per_round: metrics.max_events_per_round,
            steps,
            last_timestamp: self.dispatcher.current_datetime(),
            reached_eof: self.dispatcher.last_round().is_some_and(|r| r.eof),
            duration: started.elapsed(),
            events: self.recorder.take(),
        };

        info!(
            rounds = stats.rounds,
            events = stats.events_dispatched,
            eof = stats.reached_eof,
            "session finished"
        );
        Ok(stats)
    }
}

//! Session statistics and reporting.

use std::time::Duration;

use contracts::{DriveMode, FeedEvent, Timestamp};
use serde::Serialize;

/// Statistics from a session run
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub mode: DriveMode,

    /// Registered subjects
    pub subjects: usize,

    /// Rounds executed, the eof round included
    pub rounds: u64,

    /// Rounds in which nothing was dispatched
    pub idle_rounds: u64,

    pub events_dispatched: u64,

    pub max_events_per_round: u64,

    /// `step()` calls (step mode only)
    pub steps: Option<u64>,

    /// Dispatcher clock when the session ended
    pub last_timestamp: Option<Timestamp>,

    /// Ended because every subject was exhausted (not stopped early)
    pub reached_eof: bool,

    pub duration: Duration,

    /// Merged event stream in dispatch order
    pub events: Vec<FeedEvent>,
}

/// Serializable summary (events excluded)
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    mode: DriveMode,
    subjects: usize,
    rounds: u64,
    idle_rounds: u64,
    events_dispatched: u64,
    max_events_per_round: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_timestamp: Option<Timestamp>,
    reached_eof: bool,
    duration_secs: f64,
}

impl SessionStats {
    /// Dispatched events per wall-clock second
    pub fn events_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of idle rounds as percentage
    pub fn idle_rate(&self) -> f64 {
        if self.rounds > 0 {
            (self.idle_rounds as f64 / self.rounds as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            mode: self.mode,
            subjects: self.subjects,
            rounds: self.rounds,
            idle_rounds: self.idle_rounds,
            events_dispatched: self.events_dispatched,
            max_events_per_round: self.max_events_per_round,
            steps: self.steps,
            last_timestamp: self.last_timestamp,
            reached_eof: self.reached_eof,
            duration_secs: self.duration.as_secs_f64(),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");
        println!("Overview");
        println!("   |- Mode: {:?}", self.mode);
        println!("   |- Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   |- Subjects: {}", self.subjects);
        println!("   |- Events dispatched: {}", self.events_dispatched);
        println!("   `- Events/s: {:.2}", self.events_per_second());

        println!("\nRounds");
        println!("   |- Total: {}", self.rounds);
        println!("   |- Idle: {} ({:.2}%)", self.idle_rounds, self.idle_rate());
        println!("   |- Max events in one round: {}", self.max_events_per_round);
        if let Some(steps) = self.steps {
            println!("   |- Steps: {steps}");
        }
        match self.last_timestamp {
            Some(ts) => println!("   |- Last timestamp: {}", ts.to_rfc3339()),
            None => println!("   |- Last timestamp: -"),
        }
        println!(
            "   `- Ended by: {}",
            if self.reached_eof { "end of data" } else { "stop request" }
        );

        println!();
    }
}

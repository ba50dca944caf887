//! Step Replay Example
//!
//! Loads a scenario (or builds a small one) and drives the dispatcher one
//! round at a time, printing the clock and the events of every round.
//!
//! Run with: cargo run -p demos --bin step_replay [scenario.toml]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use config_loader::ConfigLoader;
use contracts::{DispatchPriority, EventRecord, SubjectRef};
use dispatcher::Dispatcher;
use feeds::{build_subjects, EventRecorder, HistoricalFeed};
use observability::{LogFormat, ObservabilityConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(
        ObservabilityConfig::from_env()?.with_log_format(LogFormat::Compact),
    )?;

    tracing::info!("Starting step replay demo");

    let recorder = EventRecorder::new();
    let subjects: Vec<SubjectRef> = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading scenario");
        let scenario = ConfigLoader::load_from_path(std::path::Path::new(&path))?;
        build_subjects(&scenario, Some(recorder.callback()))?
    } else {
        let open: DateTime<Utc> = "2024-01-02T09:30:00Z".parse()?;
        demo_subjects(open, &recorder)
    };

    let mut dispatcher = Dispatcher::new();
    for subject in subjects {
        dispatcher.add_subject(subject);
    }
    dispatcher
        .start_signal()
        .subscribe(|| tracing::info!("all subjects started"));

    let mut step = 0;
    while dispatcher.step()? {
        step += 1;
        let events = recorder.take();
        let clock = dispatcher
            .current_datetime()
            .map_or_else(|| "-".to_string(), |ts| ts.to_rfc3339());
        println!("step {step:>3}  clock {clock}");
        for event in events {
            println!("          {}#{} {}", event.source, event.sequence, event.payload);
        }
    }

    let metrics = dispatcher.metrics();
    println!(
        "\nrounds: {}  events: {}  idle: {}",
        metrics.rounds, metrics.events, metrics.idle_rounds
    );
    Ok(())
}

fn demo_subjects(open: DateTime<Utc>, recorder: &EventRecorder) -> Vec<SubjectRef> {
    let at = |minutes: i64, price: f64| EventRecord {
        at: open + Duration::minutes(minutes),
        payload: serde_json::json!({ "price": price }),
    };

    let trades = HistoricalFeed::new("trades", [at(0, 10.0), at(1, 10.2), at(3, 10.1)]);
    let quotes = HistoricalFeed::new("quotes", [at(0, 9.9), at(2, 10.3), at(3, 10.0)])
        .with_priority(DispatchPriority::Level(0));
    trades.listen(recorder.callback());
    quotes.listen(recorder.callback());

    vec![Arc::new(trades), Arc::new(quotes)]
}

//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Scenario, SubjectKind, Timestamp};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Scenario info for JSON output
#[derive(Serialize)]
struct ScenarioInfo {
    version: String,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_rounds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_range: Option<TimeRange>,
    /// Subjects in dispatch order
    subjects: Vec<SubjectInfo>,
}

#[derive(Serialize)]
struct TimeRange {
    first: Timestamp,
    last: Timestamp,
}

#[derive(Serialize)]
struct SubjectInfo {
    id: String,
    kind: SubjectKind,
    priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    event_times: Vec<Timestamp>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading scenario info");

    if !args.config.exists() {
        anyhow::bail!("Scenario file not found: {}", args.config.display());
    }

    let scenario = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load scenario from {}", args.config.display()))?;
    let info = build_scenario_info(&scenario, args.events);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize scenario info")?;
        println!("{json}");
    } else {
        print_scenario_info(&info);
    }

    Ok(())
}

fn build_scenario_info(scenario: &Scenario, with_events: bool) -> ScenarioInfo {
    // Same stable ordering the dispatcher applies on registration.
    let mut subjects: Vec<_> = scenario.subjects.iter().collect();
    subjects.sort_by_key(|s| s.dispatch_priority());

    let subjects = subjects
        .into_iter()
        .map(|s| {
            let historical = s.kind == SubjectKind::Historical;
            let mut event_times = Vec::new();
            if with_events && historical {
                event_times = s.events.iter().map(|e| e.at).collect();
                event_times.sort();
            }
            SubjectInfo {
                id: s.id.to_string(),
                kind: s.kind,
                priority: s.dispatch_priority().to_string(),
                events: historical.then_some(s.events.len()),
                interval_ms: s.interval_ms,
                count: s.count,
                event_times,
            }
        })
        .collect();

    ScenarioInfo {
        version: format!("{:?}", scenario.version),
        mode: format!("{:?}", scenario.dispatcher.mode),
        max_rounds: scenario.dispatcher.max_rounds,
        time_range: scenario
            .time_range()
            .map(|(first, last)| TimeRange { first, last }),
        subjects,
    }
}

fn print_scenario_info(info: &ScenarioInfo) {
    println!("\n=== Scenario ===\n");
    println!("Version: {}", info.version);
    println!("Mode: {}", info.mode);
    match info.max_rounds {
        Some(limit) => println!("Max rounds: {limit}"),
        None => println!("Max rounds: unlimited"),
    }
    if let Some(ref range) = info.time_range {
        println!(
            "Time range: {} .. {}",
            range.first.to_rfc3339(),
            range.last.to_rfc3339()
        );
    }

    println!("\nSubjects in dispatch order ({}):", info.subjects.len());
    for subject in &info.subjects {
        let detail = match (subject.events, subject.interval_ms) {
            (Some(events), _) => format!("{events} events"),
            (None, Some(interval)) => match subject.count {
                Some(count) => format!("every {interval}ms, {count} events"),
                None => format!("every {interval}ms, unbounded"),
            },
            (None, None) => String::new(),
        };
        println!(
            "  - {} ({:?}, priority {}) {}",
            subject.id, subject.kind, subject.priority, detail
        );
        for at in &subject.event_times {
            println!("      {}", at.to_rfc3339());
        }
    }

    println!();
}

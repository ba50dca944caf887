//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{FeedEvent, Scenario};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Session, SessionStats};

/// Execute the `run` command
pub async fn run_scenario(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading scenario");

    if !args.config.exists() {
        return Err(CliError::scenario_not_found(args.config.display().to_string()).into());
    }

    let mut scenario = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load scenario from {}", args.config.display()))?;
    apply_overrides(&mut scenario, args);

    info!(
        subjects = scenario.subjects.len(),
        historical_events = scenario.historical_event_count(),
        mode = ?scenario.dispatcher.mode,
        max_rounds = ?scenario.dispatcher.max_rounds,
        "Scenario loaded"
    );

    if args.dry_run {
        info!("Dry run mode - scenario is valid, exiting");
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let session = Session::new(&scenario).context("Failed to prepare session")?;
    let stop = session.stop_handle();

    // The dispatcher blocks; keep the runtime free to watch for Ctrl-C.
    let mut task = tokio::task::spawn_blocking(move || session.drive());

    let finished = tokio::select! {
        joined = &mut task => Some(joined),
        _ = shutdown_signal() => None,
    };
    let joined = match finished {
        Some(joined) => joined,
        None => {
            warn!("Received shutdown signal, stopping at next round boundary...");
            stop.stop();
            task.await
        }
    };

    let stats = joined
        .map_err(|e| CliError::task_aborted(e.to_string()))?
        .context("Session execution failed")?;

    print_output(&stats, args)?;

    info!(
        rounds = stats.rounds,
        events = stats.events_dispatched,
        "lockstep finished"
    );
    Ok(())
}

/// CLI flags take precedence over the scenario file
fn apply_overrides(scenario: &mut Scenario, args: &RunArgs) {
    if let Some(mode) = args.mode {
        info!(mode = ?mode, "Overriding drive mode from CLI");
        scenario.dispatcher.mode = mode.into();
    }
    if let Some(limit) = args.max_rounds {
        info!(max_rounds = limit, "Overriding round limit from CLI");
        scenario.dispatcher.max_rounds = (limit != 0).then_some(limit);
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_output(stats: &SessionStats, args: &RunArgs) -> Result<()> {
    if args.json {
        if !args.no_events {
            for event in &stats.events {
                println!("{}", serde_json::to_string(event).context("Failed to serialize event")?);
            }
        }
        let report = serde_json::to_string_pretty(&stats.report())
            .context("Failed to serialize summary")?;
        println!("{report}");
        return Ok(());
    }

    if !args.no_events {
        println!("\n=== Event Stream ===\n");
        for event in &stats.events {
            println!("{}", format_event(event));
        }
    }
    stats.print_summary();
    Ok(())
}

fn format_event(event: &FeedEvent) -> String {
    let when = event
        .timestamp
        .map_or_else(|| "realtime".to_string(), |ts| ts.to_rfc3339());
    if event.payload.is_null() {
        format!("  {when:<25} {}#{}", event.source, event.sequence)
    } else {
        format!(
            "  {when:<25} {}#{} {}",
            event.source, event.sequence, event.payload
        )
    }
}

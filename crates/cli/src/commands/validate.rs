//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{Scenario, SubjectKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ScenarioSummary>,
}

#[derive(Serialize)]
struct ScenarioSummary {
    version: String,
    mode: String,
    historical_subjects: usize,
    realtime_subjects: usize,
    historical_events: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating scenario");

    let result = validate_scenario(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Scenario validation failed")
    }
}

fn validate_scenario(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            error: Some(format!("File not found: {config_path}")),
            config_path,
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(scenario) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&scenario),
            summary: Some(ScenarioSummary {
                version: format!("{:?}", scenario.version),
                mode: format!("{:?}", scenario.dispatcher.mode),
                historical_subjects: scenario.subjects_of_kind(SubjectKind::Historical).count(),
                realtime_subjects: scenario.subjects_of_kind(SubjectKind::Realtime).count(),
                historical_events: scenario.historical_event_count(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Collect scenario warnings (non-fatal issues)
fn collect_warnings(scenario: &Scenario) -> Vec<String> {
    let mut warnings = Vec::new();

    if scenario.subjects.is_empty() {
        warnings.push("No subjects configured - the dispatcher ends immediately".to_string());
    }

    for subject in scenario.subjects_of_kind(SubjectKind::Realtime) {
        if subject.count.is_none() && scenario.dispatcher.max_rounds.is_none() {
            warnings.push(format!(
                "Realtime subject '{}' is unbounded and no max_rounds is set - run ends only on stop",
                subject.id
            ));
        }
    }

    for subject in scenario.subjects_of_kind(SubjectKind::Historical) {
        if subject.events.windows(2).any(|w| w[1].at < w[0].at) {
            warnings.push(format!(
                "Historical subject '{}' lists events out of time order - they will be sorted",
                subject.id
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("OK  Scenario is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Mode: {}", summary.mode);
            println!("  Historical subjects: {}", summary.historical_subjects);
            println!("  Realtime subjects: {}", summary.realtime_subjects);
            println!("  Historical events: {}", summary.historical_events);
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("ERR Scenario is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(path: &Path) -> ValidateArgs {
        ValidateArgs {
            config: path.to_path_buf(),
            json: true,
        }
    }

    #[test]
    fn valid_file_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(
            &path,
            r#"
[[subjects]]
id = "bars"
kind = "historical"
[[subjects.events]]
at = "2024-01-02T09:31:00Z"
[[subjects.events]]
at = "2024-01-02T09:30:00Z"

[[subjects]]
id = "ticker"
kind = "realtime"
interval_ms = 10
"#,
        )
        .unwrap();

        let result = validate_scenario(&args(&path));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
        let summary = result.summary.unwrap();
        assert_eq!(summary.historical_subjects, 1);
        assert_eq!(summary.realtime_subjects, 1);
        assert_eq!(summary.historical_events, 2);

        assert!(run_validate(&args(&path)).is_ok());
    }

    #[test]
    fn invalid_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(&path, "[[subjects]]\nid = \"bars\"\nkind = \"historical\"\n").unwrap();

        let result = validate_scenario(&args(&path));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("no events"));
        assert!(run_validate(&args(&path)).is_err());
    }

    #[test]
    fn missing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_scenario(&args(&dir.path().join("absent.toml")));
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("File not found"));
    }
}

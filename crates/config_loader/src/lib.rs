//! # Config Loader
//!
//! Scenario loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON scenario files
//! - Validate scenario legality
//! - Produce a `Scenario` ready to be turned into subjects
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let scenario = ConfigLoader::load_from_path(Path::new("scenario.toml")).unwrap();
//! println!("subjects: {}", scenario.subjects.len());
//! ```

mod parser;
mod validator;

pub use contracts::Scenario;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Scenario loader
///
/// Provides static methods to load a scenario from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load scenario from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<Scenario, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        let scenario = Self::load_from_str(&content, format)?;

        debug!(
            path = %path.display(),
            format = format.name(),
            subjects = scenario.subjects.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Load scenario from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Scenario, ContractError> {
        let scenario = parser::parse(content, format)?;
        validator::validate(&scenario)?;
        Ok(scenario)
    }

    /// Validate an already-built scenario
    pub fn validate(scenario: &Scenario) -> Result<(), ContractError> {
        validator::validate(scenario)
    }

    /// Serialize Scenario to TOML string
    pub fn to_toml(scenario: &Scenario) -> Result<String, ContractError> {
        toml::to_string_pretty(scenario)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize Scenario to JSON string
    pub fn to_json(scenario: &Scenario) -> Result<String, ContractError> {
        serde_json::to_string_pretty(scenario)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Infer format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SubjectKind;
    use std::io::Write;

    const SCENARIO_TOML: &str = r#"
version = "v1"

[dispatcher]
mode = "run"
max_rounds = 1000

[[subjects]]
id = "bars"
kind = "historical"
priority = 3000
[[subjects.events]]
at = "2024-01-02T09:30:00Z"
payload = { close = 10.5 }
[[subjects.events]]
at = "2024-01-02T09:31:00Z"
payload = { close = 10.7 }

[[subjects]]
id = "ticker"
kind = "realtime"
interval_ms = 5
count = 10
channel_capacity = 64
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_from_str_toml() {
        let scenario = ConfigLoader::load_from_str(SCENARIO_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(scenario.subjects.len(), 2);
        assert_eq!(scenario.historical_event_count(), 2);
        assert_eq!(scenario.subjects_of_kind(SubjectKind::Realtime).count(), 1);
    }

    #[test]
    fn load_from_path_detects_format() {
        let file = write_temp(".toml", SCENARIO_TOML);
        let scenario = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(scenario.subjects[0].id, "bars");

        let json = ConfigLoader::to_json(&scenario).unwrap();
        let file = write_temp(".json", &json);
        let reloaded = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(reloaded.subjects.len(), 2);
        assert_eq!(reloaded.time_range(), scenario.time_range());
    }

    #[test]
    fn unsupported_extension_rejected() {
        let file = write_temp(".yaml", SCENARIO_TOML);
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ContractError::Io(_)));
    }

    #[test]
    fn toml_serialization_reloads() {
        let scenario = ConfigLoader::load_from_str(SCENARIO_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&scenario).unwrap();
        let reloaded = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(reloaded.subjects[1].interval_ms, Some(5));
        assert_eq!(reloaded.dispatcher.max_rounds, Some(1000));
    }

    #[test]
    fn validation_runs_after_parse() {
        let content = r#"
[[subjects]]
id = "bars"
kind = "realtime"
interval_ms = 1

[[subjects]]
id = "bars"
kind = "realtime"
interval_ms = 1
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}

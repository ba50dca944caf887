//! Error types for CLI operations.

use contracts::ContractError;
use feeds::FeedError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Scenario file not found
    #[error("Scenario file not found: {path}")]
    ScenarioNotFound { path: String },

    /// A subject could not be built from its configuration
    #[error("Failed to build subject: {0}")]
    SubjectBuild(#[from] FeedError),

    /// Dispatcher or subject failure while running
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] ContractError),

    /// The blocking dispatch task did not complete
    #[error("Dispatch task aborted: {message}")]
    TaskAborted { message: String },
}

impl CliError {
    pub fn scenario_not_found(path: impl Into<String>) -> Self {
        Self::ScenarioNotFound { path: path.into() }
    }

    pub fn task_aborted(message: impl Into<String>) -> Self {
        Self::TaskAborted {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

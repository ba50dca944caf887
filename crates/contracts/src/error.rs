//! Layered error definitions
//!
//! Categorized by source: config / subject / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Subject Errors =====
    /// Lifecycle contract broken (e.g. dispatch before start) or start/stop failure
    #[error("subject '{subject}' lifecycle error: {message}")]
    SubjectLifecycle { subject: String, message: String },

    /// Failure while peeking or dispatching the next event
    #[error("subject '{subject}' dispatch error: {message}")]
    SubjectDispatch { subject: String, message: String },

    /// Background activity could not be joined
    #[error("subject '{subject}' join error: {message}")]
    SubjectJoin { subject: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn subject_lifecycle(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubjectLifecycle {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn subject_dispatch(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubjectDispatch {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn subject_join(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubjectJoin {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Subject the error originated from, if any
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::SubjectLifecycle { subject, .. }
            | Self::SubjectDispatch { subject, .. }
            | Self::SubjectJoin { subject, .. } => Some(subject),
            _ => None,
        }
    }
}

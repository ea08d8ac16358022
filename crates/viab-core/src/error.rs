//! Error handling for the feasibility engine boundaries
//!
//! The numeric core never fails on degenerate input. These errors only exist
//! where the engine meets the outside world: configuration, the project store,
//! document (de)serialization and the strict share-edit policy.

use std::fmt;

use thiserror::Error;
use viab_calculator::RedistributionError;
use viab_types::ShareSetKind;

/// Error type for feasibility engine operations
#[derive(Error, Debug, Clone)]
pub enum ViabError {
    /// Configuration loading and validation errors
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String>, actual: Option<String> },

    /// Project store operation errors
    #[error("Store error: {message}")]
    Store { message: String, project_id: Option<u64>, operation: Option<String> },

    /// Serialization and deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String, data_type: Option<String>, operation: Option<String> },

    /// A share edit refused by the redistribution engine
    #[error("Redistribution error: {message}")]
    Redistribution { message: String, share_set: Option<String>, keys: Vec<String> },

    /// Lookup of a record that does not exist
    #[error("Not found: {message}")]
    NotFound { message: String, project_id: Option<u64> },
}

impl ViabError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ViabError::Configuration { .. } => "configuration",
            ViabError::Store { .. } => "store",
            ViabError::Serialization { .. } => "serialization",
            ViabError::Redistribution { .. } => "redistribution",
            ViabError::NotFound { .. } => "not_found",
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ViabError::Configuration { .. } => ErrorSeverity::Critical,
            ViabError::Store { .. } => ErrorSeverity::High,
            ViabError::Serialization { .. } => ErrorSeverity::Low,
            ViabError::Redistribution { .. } => ErrorSeverity::Medium,
            ViabError::NotFound { .. } => ErrorSeverity::Low,
        }
    }

    pub fn configuration(setting: &str, actual: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            setting: Some(setting.to_string()),
            actual: Some(actual.to_string()),
        }
    }

    pub fn store(operation: &str, project_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Store { message: message.into(), project_id, operation: Some(operation.to_string()) }
    }

    pub fn serialization(data_type: &str, operation: &str, message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            data_type: Some(data_type.to_string()),
            operation: Some(operation.to_string()),
        }
    }

    pub fn not_found(project_id: u64) -> Self {
        Self::NotFound { message: format!("project {project_id} does not exist"), project_id: Some(project_id) }
    }

    /// Wraps a redistribution refusal with the share set it happened in.
    pub fn redistribution(kind: ShareSetKind, err: RedistributionError) -> Self {
        let keys = match &err {
            RedistributionError::MultipleEdits { keys } => keys.clone(),
            RedistributionError::UnknownKey { key } => vec![key.clone()],
        };
        Self::Redistribution { message: err.to_string(), share_set: Some(kind.label().to_string()), keys }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for engine operations
pub type ViabResult<T> = Result<T, ViabError>;

impl From<serde_json::Error> for ViabError {
    fn from(err: serde_json::Error) -> Self {
        let operation = if err.is_syntax() || err.is_eof() {
            "parse"
        } else if err.is_data() {
            "validate"
        } else {
            "io"
        };
        ViabError::serialization("json", operation, err.to_string())
    }
}

impl From<toml::de::Error> for ViabError {
    fn from(err: toml::de::Error) -> Self {
        ViabError::Configuration { message: err.message().to_string(), setting: None, actual: None }
    }
}

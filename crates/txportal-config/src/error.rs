//! Error types for txportal-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    MissingField,
    InvalidValue,
    IoError,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ConfigErrorCode::InvalidYaml => write!(f, "INVALID_YAML"),
            ConfigErrorCode::MissingField => write!(f, "MISSING_FIELD"),
            ConfigErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ConfigErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML format")]
    InvalidYaml,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error occurred")]
    IoError,
}

impl ConfigError {
    /// Get the error code
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::IoError => ConfigErrorCode::IoError,
        }
    }

    /// Field path for field-specific errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }

    /// Hints shown next to the error at startup
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Use --config to point at an existing file.".to_string(),
                "Run with --print-default-config to get a starting template.".to_string(),
            ],
            ConfigError::InvalidYaml => {
                vec!["Check indentation and quoting in the YAML file.".to_string()]
            }
            ConfigError::MissingField { field } => {
                vec![format!("Add the '{}' field to your config file.", field)]
            }
            ConfigError::InvalidValue { reason, .. } => vec![reason.clone()],
            ConfigError::IoError => vec![],
        }
    }

    /// Multi-line startup report: code, field, message and hints
    pub fn report(&self) -> String {
        let mut out = format!("[{}] {}", self.code(), self);
        if let Some(field) = self.field() {
            out.push_str(&format!("\n  field: {}", field));
        }
        for hint in self.suggestions() {
            out.push_str(&format!("\n  hint: {}", hint));
        }
        out
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

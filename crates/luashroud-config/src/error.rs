//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was absent or blank.
    #[error("missing required environment variable")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Variable that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.to_string()),
            reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

//! # Design
//!
//! - Provide one error type covering job preparation and tool invocation.
//! - Keep error messages constant; carry paths, exit codes, and diagnostics as fields.
//! - Expose the tool's raw diagnostics through [`ObfuscateError::detail`] for user replies.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Result alias for obfuscation operations.
pub type ObfuscateResult<T> = Result<T, ObfuscateError>;

/// Errors produced while preparing or running an obfuscation job.
#[derive(Debug, Error)]
pub enum ObfuscateError {
    /// Caller-supplied input failed validation.
    #[error("invalid obfuscation input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Reading or writing a job file failed.
    #[error("job file operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The external process could not be started.
    #[error("failed to spawn obfuscator")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The external process exited unsuccessfully.
    #[error("obfuscator exited with failure")]
    ToolFailed {
        /// Exit code when the process was not terminated by a signal.
        code: Option<i32>,
        /// Diagnostic text captured from the process.
        diagnostics: String,
    },
    /// The external process exceeded its wall-clock budget.
    #[error("obfuscator timed out")]
    Timeout {
        /// Budget that was exceeded.
        after: Duration,
    },
    /// The process exited cleanly but wrote no output artifact.
    #[error("obfuscator output not produced")]
    OutputMissing {
        /// Expected output path.
        path: PathBuf,
    },
    /// Captured stdout/stderr exceeded the configured bound.
    #[error("obfuscator output exceeded capture limit")]
    OutputOverflow {
        /// Stream that overflowed.
        stream: &'static str,
        /// Capture bound in bytes.
        limit: usize,
    },
    /// The output artifact was not valid UTF-8.
    #[error("obfuscator output was not valid utf-8")]
    OutputNotUtf8 {
        /// Output artifact path.
        path: PathBuf,
        /// Underlying conversion error.
        source: FromUtf8Error,
    },
    /// The invoker stopped accepting jobs.
    #[error("obfuscator unavailable")]
    Unavailable,
}

impl ObfuscateError {
    /// Build an input validation error.
    #[must_use]
    pub const fn invalid_input(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidInput {
            field,
            reason,
            value,
        }
    }

    pub(crate) const fn io(operation: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self::Io {
            operation,
            path,
            source,
        }
    }

    /// Stable label used for metrics and structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::Io { .. } => "io",
            Self::Spawn { .. } => "spawn",
            Self::ToolFailed { .. } => "tool_failed",
            Self::Timeout { .. } => "timeout",
            Self::OutputMissing { .. } => "output_missing",
            Self::OutputOverflow { .. } => "output_overflow",
            Self::OutputNotUtf8 { .. } => "output_not_utf8",
            Self::Unavailable => "unavailable",
        }
    }

    /// Whether the failure was caused by the wall-clock budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Human-readable detail passed through to requesters.
    ///
    /// Tool failures return the captured diagnostics verbatim.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidInput { field, reason, .. } => format!("{field}: {reason}"),
            Self::Io {
                operation, source, ..
            } => format!("{operation}: {source}"),
            Self::Spawn { program, source } => format!("could not start `{program}`: {source}"),
            Self::ToolFailed { code, diagnostics } => {
                if diagnostics.trim().is_empty() {
                    code.map_or_else(
                        || "process terminated by signal".to_string(),
                        |code| format!("process exited with status {code}"),
                    )
                } else {
                    diagnostics.trim().to_string()
                }
            }
            Self::Timeout { after } => format!("timed out after {}s", after.as_secs_f64()),
            Self::OutputMissing { .. } => "Output file not created".to_string(),
            Self::OutputOverflow { stream, limit } => {
                format!("{stream} exceeded {limit} bytes")
            }
            Self::OutputNotUtf8 { .. } => "output was not valid UTF-8".to_string(),
            Self::Unavailable => "obfuscator is shutting down".to_string(),
        }
    }
}

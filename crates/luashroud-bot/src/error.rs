//! # Design
//!
//! - One error type for the chat surface: gateway calls, attachment downloads, setup.
//! - Messages stay constant; URLs, statuses, and operations travel as fields.
//! - [`BotError::user_message`] is the short text shown in chat replies.

use std::string::FromUtf8Error;
use std::time::Duration;

use thiserror::Error;

/// Result alias for chat surface operations.
pub type BotResult<T> = Result<T, BotError>;

/// Errors produced by the chat surface.
#[derive(Debug, Error)]
pub enum BotError {
    /// A code-block pattern failed to compile.
    #[error("failed to compile pattern")]
    RegexCompile {
        /// Pattern that failed.
        pattern: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },
    /// The download client could not be built.
    #[error("failed to build download client")]
    HttpClient {
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// Fetching an attachment failed before a response arrived.
    #[error("attachment download failed")]
    Download {
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The attachment host answered with a non-success status.
    #[error("attachment download returned an error status")]
    DownloadStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The attachment did not arrive within the download bound.
    #[error("attachment download timed out")]
    DownloadTimeout {
        /// Bound that was exceeded.
        after: Duration,
    },
    /// The attachment body was not valid UTF-8.
    #[error("attachment was not valid utf-8")]
    DownloadNotUtf8 {
        /// Underlying conversion error.
        source: FromUtf8Error,
    },
    /// A Discord API or gateway call failed.
    #[error("discord request failed")]
    Discord {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying serenity error.
        source: Box<serenity::Error>,
    },
}

impl BotError {
    pub(crate) fn discord(operation: &'static str, source: serenity::Error) -> Self {
        Self::Discord {
            operation,
            source: Box::new(source),
        }
    }

    /// Whether this error came from fetching an attachment.
    #[must_use]
    pub const fn is_download(&self) -> bool {
        matches!(
            self,
            Self::Download { .. }
                | Self::DownloadStatus { .. }
                | Self::DownloadTimeout { .. }
                | Self::DownloadNotUtf8 { .. }
        )
    }

    /// Short description shown to chat users.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DownloadStatus { status } => format!("HTTP {status}"),
            Self::DownloadTimeout { .. } => "Download timeout".to_string(),
            Self::Download { source } => format!("Download failed: {source}"),
            Self::DownloadNotUtf8 { .. } => "Attachment is not UTF-8 text".to_string(),
            other => other.to_string(),
        }
    }
}

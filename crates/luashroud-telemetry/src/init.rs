//! Telemetry initialisation primitives and logging configuration.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Records the build identifier once so every span and status reply agrees.

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Filter directive used when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. The first call also fixes the
/// build identifier reported by [`build_sha`].
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> TelemetryResult<()> {
    let _ = BUILD_SHA.set(config.build_sha.to_owned());

    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().compact().with_target(false).boxed(),
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level));

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Build identifier recorded by [`init_logging`], or `dev` before it runs.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Inputs to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Filter directive such as `info` or `luashroud_bot=debug`.
    pub level: &'a str,
    /// Output encoding.
    pub format: LogFormat,
    /// Build identifier attached to the `app` span and status replies.
    pub build_sha: &'a str,
}

/// Log encodings selectable through `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Compact human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty output for debug builds, JSON otherwise.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Resolve an explicit `LOG_FORMAT` value, inferring when absent or unknown.
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(format) if format.eq_ignore_ascii_case("json") => Self::Json,
            Some(format) if format.eq_ignore_ascii_case("pretty") => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_from_setting_parses_variants() {
        assert_eq!(LogFormat::from_setting(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some(" PRETTY ")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_setting(Some("xml")), LogFormat::infer());
        assert_eq!(LogFormat::from_setting(None), LogFormat::infer());
    }

    #[test]
    fn second_install_is_rejected_and_sha_sticks() {
        let config = LoggingConfig {
            level: "warn",
            format: LogFormat::Json,
            build_sha: "abc1234",
        };
        let _ = init_logging(&config);
        let again = init_logging(&LoggingConfig {
            build_sha: "other",
            ..config
        });
        assert!(matches!(again, Err(TelemetryError::SubscriberInstall { .. })));
        assert_eq!(build_sha(), "abc1234");
    }
}

//! # Design
//!
//! - Centralize application-level errors for bootstrap and surface hosting.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::error::Error as StdError;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: luashroud_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: luashroud_telemetry::TelemetryError,
    },
    /// Building the obfuscator invoker failed.
    #[error("obfuscator setup failed")]
    Obfuscator {
        /// Operation identifier.
        operation: &'static str,
        /// Source invoker error.
        source: luashroud_core::ObfuscateError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source server error.
        source: Box<dyn StdError + Send + Sync>,
    },
    /// Chat bot operations failed.
    #[error("chat bot operation failed")]
    Bot {
        /// Operation identifier.
        operation: &'static str,
        /// Source bot error.
        source: luashroud_bot::BotError,
    },
    /// A surface enabled by the run mode had no configuration section.
    #[error("missing surface configuration")]
    MissingSurface {
        /// Surface name.
        name: &'static str,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: luashroud_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: luashroud_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn obfuscator(
        operation: &'static str,
        source: luashroud_core::ObfuscateError,
    ) -> Self {
        Self::Obfuscator { operation, source }
    }

    pub(crate) fn api_server(operation: &'static str, source: anyhow::Error) -> Self {
        Self::ApiServer {
            operation,
            source: source.into(),
        }
    }

    pub(crate) const fn bot(operation: &'static str, source: luashroud_bot::BotError) -> Self {
        Self::Bot { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "load",
            luashroud_config::ConfigError::MissingEnv {
                name: "DISCORD_TOKEN",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));

        let obfuscator = AppError::obfuscator("new", luashroud_core::ObfuscateError::Unavailable);
        assert!(matches!(obfuscator, AppError::Obfuscator { .. }));

        let api = AppError::api_server("serve", anyhow::Error::new(io::Error::other("io")));
        assert!(matches!(api, AppError::ApiServer { .. }));
        assert!(api.source().is_some());

        let bot = AppError::bot(
            "run",
            luashroud_bot::BotError::DownloadTimeout {
                after: Duration::from_secs(1),
            },
        );
        assert!(matches!(bot, AppError::Bot { .. }));
        assert_eq!(bot.to_string(), "chat bot operation failed");
    }
}

//! Error types for telemetry operations.

use prometheus::Error as PrometheusError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing logging or operating the metrics registry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed or could not be set.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Creating a collector failed (bad name or label set).
    #[error("failed to build metrics collector")]
    MetricsCollector {
        /// Metric name.
        name: &'static str,
        /// Underlying registry error.
        source: PrometheusError,
    },
    /// The registry refused a collector.
    #[error("failed to register metrics collector")]
    MetricsRegister {
        /// Metric name.
        name: &'static str,
        /// Underlying registry error.
        source: PrometheusError,
    },
    /// Text exposition failed.
    #[error("failed to encode metrics")]
    MetricsEncode {
        /// Underlying registry error.
        source: PrometheusError,
    },
    /// Text exposition produced bytes that are not UTF-8.
    #[error("metrics output was not valid utf-8")]
    MetricsUtf8 {
        /// Conversion error.
        source: std::string::FromUtf8Error,
    },
}

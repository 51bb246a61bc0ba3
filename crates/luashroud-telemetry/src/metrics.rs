//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers see one method per signal.
//! - Job series are labelled by surface, preset, and outcome.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, core::Collector,
};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Output produced.
    Succeeded,
    /// Rejected before reaching the tool.
    Rejected,
    /// The tool failed or produced no output.
    Failed,
    /// The tool exceeded its wall-clock bound.
    TimedOut,
}

impl JobOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Prometheus-backed metrics registry shared across surfaces.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    jobs_total: IntCounterVec,
    source_bytes_total: IntCounterVec,
    output_bytes_total: IntCounterVec,
    active_jobs: IntGauge,
    last_job_latency_ms: IntGauge,
    attachment_downloads_failed_total: IntCounter,
}

/// Point-in-time view used by health reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Jobs currently running.
    pub active_jobs: i64,
    /// Latency of the most recently finished job (ms).
    pub last_job_latency_ms: i64,
    /// Failed attachment downloads since start.
    pub attachment_downloads_failed_total: u64,
}

impl Metrics {
    /// Construct a registry with every collector registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be built or registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let jobs_total = counter_vec(
            "obfuscation_jobs_total",
            "Obfuscation jobs by surface, preset, and outcome",
            &["surface", "preset", "outcome"],
        )?;
        let source_bytes_total = counter_vec(
            "obfuscation_source_bytes_total",
            "Source bytes submitted to the tool",
            &["surface"],
        )?;
        let output_bytes_total = counter_vec(
            "obfuscation_output_bytes_total",
            "Obfuscated bytes returned by the tool",
            &["surface"],
        )?;
        let active_jobs = IntGauge::with_opts(Opts::new(
            "obfuscation_active_jobs",
            "Jobs currently running in the tool",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "obfuscation_active_jobs",
            source,
        })?;
        let last_job_latency_ms = IntGauge::with_opts(Opts::new(
            "obfuscation_last_job_latency_ms",
            "Wall-clock time of the most recent job (ms)",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "obfuscation_last_job_latency_ms",
            source,
        })?;
        let attachment_downloads_failed_total = IntCounter::with_opts(Opts::new(
            "attachment_downloads_failed_total",
            "Chat attachments that could not be fetched",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "attachment_downloads_failed_total",
            source,
        })?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "obfuscation_jobs_total", &jobs_total)?;
        register(&registry, "obfuscation_source_bytes_total", &source_bytes_total)?;
        register(&registry, "obfuscation_output_bytes_total", &output_bytes_total)?;
        register(&registry, "obfuscation_active_jobs", &active_jobs)?;
        register(
            &registry,
            "obfuscation_last_job_latency_ms",
            &last_job_latency_ms,
        )?;
        register(
            &registry,
            "attachment_downloads_failed_total",
            &attachment_downloads_failed_total,
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                jobs_total,
                source_bytes_total,
                output_bytes_total,
                active_jobs,
                last_job_latency_ms,
                attachment_downloads_failed_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        let code = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[route, code.as_str()])
            .inc();
    }

    /// Record a finished job.
    pub fn record_job(&self, surface: &str, preset: &str, outcome: JobOutcome, elapsed: Duration) {
        self.inner
            .jobs_total
            .with_label_values(&[surface, preset, outcome.as_str()])
            .inc();
        if outcome != JobOutcome::Rejected {
            self.inner
                .last_job_latency_ms
                .set(Self::duration_to_ms(elapsed));
        }
    }

    /// Add source and output byte counts for a successful job.
    pub fn add_job_bytes(&self, surface: &str, source: usize, output: usize) {
        self.inner
            .source_bytes_total
            .with_label_values(&[surface])
            .inc_by(u64::try_from(source).unwrap_or(u64::MAX));
        self.inner
            .output_bytes_total
            .with_label_values(&[surface])
            .inc_by(u64::try_from(output).unwrap_or(u64::MAX));
    }

    /// Set the running-job gauge.
    pub fn set_active_jobs(&self, count: usize) {
        self.inner
            .active_jobs
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Count a failed attachment download.
    pub fn inc_attachment_download_failure(&self) {
        self.inner.attachment_downloads_failed_total.inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn render(&self) -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Snapshot of the gauges surfaced by health endpoints.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_jobs: self.inner.active_jobs.get(),
            last_job_latency_ms: self.inner.last_job_latency_ms.get(),
            attachment_downloads_failed_total: self.inner.attachment_downloads_failed_total.get(),
        }
    }

    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn counter_vec(
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> TelemetryResult<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> TelemetryResult<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

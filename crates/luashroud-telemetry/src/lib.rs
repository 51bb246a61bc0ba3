#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the luashroud workspace.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (span and request context),
//! `layers.rs` (request-id middleware), `metrics.rs` (Prometheus registry).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{
    GlobalContextGuard, current_request_id, current_route, set_request_context,
    with_request_context,
};
pub use error::{TelemetryError, TelemetryResult};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{JobOutcome, Metrics, MetricsSnapshot};

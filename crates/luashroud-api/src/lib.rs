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

//! HTTP surface for the obfuscation service.
//!
//! Layout: `http/router.rs` (router and server host), `http/obfuscate.rs`
//! (`POST /obfuscate`), `http/health.rs` (health, presets, metrics),
//! `http/errors.rs` (error bodies), `http/telemetry.rs` (request metrics),
//! `models.rs` (request/response DTOs), `state.rs` (shared handler state).

pub mod http;
pub mod models;
pub mod state;

pub use http::router::ApiServer;
pub use state::ApiState;

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

//! Luashroud application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (service wiring), `tool_config.rs` (tool settings
//! mapping), `error.rs`.

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level errors.
pub mod error;
/// Mapping from configuration to invoker settings.
pub mod tool_config;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};

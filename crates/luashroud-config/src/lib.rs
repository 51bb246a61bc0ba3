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

//! Environment-driven configuration for the luashroud services.
//!
//! Layout: `model.rs` (typed config sections), `validate.rs` (parsing helpers),
//! `loader.rs` (`ServiceConfig::from_env` / `from_lookup`), `defaults.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{ApiConfig, BotConfig, LogSettings, RunMode, ServiceConfig, ToolConfig};

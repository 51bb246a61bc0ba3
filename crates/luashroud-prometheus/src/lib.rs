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
#![allow(clippy::redundant_pub_crate)]

//! Subprocess adapter driving the Prometheus obfuscator CLI.

mod capture;
/// The [`luashroud_core::Obfuscator`] implementation.
pub mod cli;
/// Invocation settings supplied by the host application.
pub mod settings;

pub use cli::PrometheusCli;
pub use settings::CliSettings;

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

//! Engine-agnostic obfuscation interfaces, presets, and job plumbing.
//!
//! Layout: `preset.rs` (preset registry and Lua versions), `document.rs`
//! (configuration documents), `lua_table.rs` (Lua table rendering),
//! `builder.rs` (preset/override to job settings), `job.rs` (temp-file
//! lifecycle), `model.rs` (request/output DTOs), `service.rs` (`Obfuscator`).

pub mod builder;
pub mod document;
pub mod error;
pub mod job;
pub mod lua_table;
pub mod model;
pub mod preset;
pub mod service;

pub use builder::{ConfigBuilder, JobSettings};
pub use document::ConfigDocument;
pub use error::{ObfuscateError, ObfuscateResult};
pub use job::{JobFiles, JobId};
pub use model::{ObfuscationOutput, ObfuscationRequest, SourceLimits, Surface};
pub use preset::{LuaVersion, Preset};
pub use service::{Obfuscator, SharedObfuscator, ToolReadiness};

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

//! Discord surface for the obfuscation service.
//!
//! Layout: `command.rs` (command grammar), `source.rs` (code blocks and
//! attachments), `reply.rs` (reply texts and embeds), `service.rs` (plan and
//! execute a command without Discord), `handler.rs` (serenity event handler),
//! `client.rs` (gateway client host).

pub mod client;
pub mod command;
pub mod error;
pub mod handler;
pub mod reply;
pub mod service;
pub mod source;

pub use client::ChatBot;
pub use command::Command;
pub use error::{BotError, BotResult};
pub use reply::{EmbedField, EmbedSpec, Reply, ReplyFile};
pub use service::{ChatService, PendingJob, Plan};
pub use source::{
    AttachmentFetcher, AttachmentRef, AttachmentRejection, CodeBlockExtractor, HttpFetcher,
};

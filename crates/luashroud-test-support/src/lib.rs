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

//! Shared test helpers used across integration suites.
//! Layout: `fake_cli.rs` (scripted stand-in for the external tool), `stub.rs`
//! (in-process `Obfuscator` double).

pub mod fake_cli;
pub mod stub;

pub use fake_cli::{
    ECHO_MARKER, FAKE_CLI, FAKE_DIAGNOSTIC, FAKE_RUNTIME, FakeBehaviour, FakeInvocation,
    FakePrometheus,
};
pub use stub::{StubBehaviour, StubObfuscator};

//! Default values applied when a variable is unset.

use std::time::Duration;

/// Tool install directory.
pub const INSTALL_PATH: &str = "./prometheus";
/// Runtime executable.
pub const RUNTIME: &str = "lua5.1";
/// CLI script relative to the install directory.
pub const CLI_SCRIPT: &str = "cli.lua";
/// Per-job wall-clock bound.
pub const TIMEOUT: Duration = Duration::from_secs(60);
/// Capture bound for each of stdout and stderr.
pub const MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;
/// HTTP listener host.
pub const HOST: &str = "0.0.0.0";
/// HTTP listener port.
pub const PORT: u16 = 3000;
/// HTTP request body bound.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Source size bound shared by both surfaces.
pub const MAX_CODE_BYTES: usize = 500_000;
/// Minimum inline code-block length in characters.
pub const MIN_CODE_CHARS: usize = 5;
/// Inline reply threshold in characters.
pub const INLINE_LIMIT: usize = 1900;
/// Largest accepted inline threshold; chat messages carry at most 2000 characters.
pub const MAX_INLINE_LIMIT: usize = 2000;
/// Attachment download bound.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Log level when `RUST_LOG` is unset.
pub const LOG_LEVEL: &str = "info";

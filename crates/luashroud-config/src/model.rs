//! Typed configuration sections.

use std::fmt::{self, Debug, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use luashroud_core::{LuaVersion, SourceLimits};

use crate::error::ConfigError;

/// Which surfaces the process hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP API and chat bot.
    All,
    /// HTTP API only.
    Api,
    /// Chat bot only.
    Bot,
}

impl RunMode {
    /// Lowercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Api => "api",
            Self::Bot => "bot",
        }
    }

    /// Whether the HTTP API runs.
    #[must_use]
    pub const fn includes_api(self) -> bool {
        matches!(self, Self::All | Self::Api)
    }

    /// Whether the chat bot runs.
    #[must_use]
    pub const fn includes_bot(self) -> bool {
        matches!(self, Self::All | Self::Bot)
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "api" => Ok(Self::Api),
            "bot" => Ok(Self::Bot),
            _ => Err(ConfigError::invalid("LUASHROUD_MODE", value, "unknown_mode")),
        }
    }
}

/// External tool location and invocation bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Tool install directory.
    pub install_path: PathBuf,
    /// Runtime executable.
    pub runtime: String,
    /// CLI script relative to the install directory.
    pub cli_script: String,
    /// Directory for per-job files.
    pub work_dir: PathBuf,
    /// Per-job wall-clock bound.
    pub timeout: Duration,
    /// Capture bound for each of stdout and stderr.
    pub max_output_bytes: usize,
    /// Optional bound on concurrent tool processes.
    pub max_concurrent_jobs: Option<usize>,
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Listener address.
    pub bind_addr: SocketAddr,
    /// Request body bound.
    pub max_body_bytes: usize,
    /// Maximum `code` size in bytes.
    pub max_code_bytes: usize,
    /// Dialect used when the request names none.
    pub default_lua_version: LuaVersion,
}

/// Chat surface settings.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Gateway token.
    pub token: String,
    /// Source bounds for inline code blocks.
    pub limits: SourceLimits,
    /// Largest output (in characters) replied inline.
    pub inline_limit: usize,
    /// Attachment download bound.
    pub download_timeout: Duration,
}

impl Debug for BotConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("limits", &self.limits)
            .field("inline_limit", &self.inline_limit)
            .field("download_timeout", &self.download_timeout)
            .finish()
    }
}

/// Logging settings passed to telemetry initialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Explicit `LOG_FORMAT` value (`json` or `pretty`), if any.
    pub format: Option<String>,
}

/// Fully validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Surfaces to host.
    pub mode: RunMode,
    /// Tool settings shared by both surfaces.
    pub tool: ToolConfig,
    /// HTTP settings; present when the mode includes the API.
    pub api: Option<ApiConfig>,
    /// Bot settings; present when the mode includes the bot.
    pub bot: Option<BotConfig>,
    /// Logging settings.
    pub logging: LogSettings,
}

//! Shared state handed to every HTTP handler.

use std::time::{Duration, Instant};

use luashroud_config::ApiConfig;
use luashroud_core::{LuaVersion, SharedObfuscator};
use luashroud_telemetry::Metrics;

/// Dependencies and limits shared by the HTTP handlers.
pub struct ApiState {
    /// Invoker shared with the chat surface.
    pub obfuscator: SharedObfuscator,
    /// Metrics registry.
    pub telemetry: Metrics,
    /// Maximum `code` size in bytes.
    pub max_code_bytes: usize,
    /// Dialect used when a request names none.
    pub default_lua_version: LuaVersion,
    started_at: Instant,
}

impl ApiState {
    /// Build handler state from the HTTP configuration section.
    #[must_use]
    pub fn new(config: &ApiConfig, obfuscator: SharedObfuscator, telemetry: Metrics) -> Self {
        Self {
            obfuscator,
            telemetry,
            max_code_bytes: config.max_code_bytes,
            default_lua_version: config.default_lua_version,
            started_at: Instant::now(),
        }
    }

    /// Time since the state was built.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Copy the invoker's in-flight count into the gauge.
    pub(crate) fn refresh_active_jobs(&self) -> usize {
        let active = self.obfuscator.active_jobs();
        self.telemetry.set_active_jobs(active);
        active
    }
}

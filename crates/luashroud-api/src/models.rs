//! Request and response bodies for the HTTP surface.

use std::collections::BTreeMap;

use luashroud_core::ToolReadiness;
use luashroud_telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body accepted by `POST /obfuscate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscateBody {
    /// Lua/LuaU source text.
    #[serde(default)]
    pub code: Option<String>,
    /// Preset name; unknown names fall back to `Medium`.
    #[serde(default)]
    pub preset: Option<String>,
    /// Full configuration document overriding the preset.
    #[serde(default)]
    pub config: Option<Value>,
    /// `Lua51` or `LuaU`.
    #[serde(default)]
    pub lua_version: Option<String>,
}

/// Successful `POST /obfuscate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscateResponse {
    /// Always `true`.
    pub success: bool,
    /// Obfuscated source text.
    pub code: String,
    /// Preset name, or `custom` for override documents.
    pub preset: String,
    /// Dialect tag written to the configuration.
    pub lua_version: Option<String>,
    /// Input size in bytes.
    pub original_size: usize,
    /// Output size in bytes.
    pub obfuscated_size: usize,
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short, stable description.
    pub error: String,
    /// Raw diagnostics from the tool or the validator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Identifier of the failing request, matching the `x-request-id` header.
    #[serde(
        rename = "requestId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_id: Option<String>,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when the tool looks runnable, `degraded` otherwise.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Runtime executable used to launch the tool.
    pub lua_runtime: String,
    /// Dialect support caveat.
    pub note: &'static str,
    /// Tool installation snapshot.
    pub tool: ToolReadiness,
    /// Jobs currently running.
    pub active_jobs: usize,
    /// Job gauges from the metrics registry.
    pub metrics: MetricsSnapshot,
    /// Seconds since the API started.
    pub uptime_secs: u64,
    /// Build identifier.
    pub build: String,
}

/// `GET /presets` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetsResponse {
    /// Preset names in listing order.
    pub presets: Vec<&'static str>,
    /// Preset used when none is named.
    pub default: &'static str,
    /// Dialect used when none is named.
    pub lua_version: &'static str,
    /// Dialect support caveat.
    pub warning: &'static str,
    /// One-line description per preset.
    pub description: BTreeMap<&'static str, &'static str>,
}

//! Health, preset listing, and metrics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use luashroud_core::Preset;
use luashroud_telemetry::build_sha;
use tracing::{error, warn};

use crate::http::constants::{LUAU_NOTE, LUAU_WARNING, METRICS_CONTENT_TYPE, SERVICE_NAME};
use crate::http::errors::ApiError;
use crate::models::{HealthResponse, PresetsResponse};
use crate::state::ApiState;

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let tool = state.obfuscator.readiness();
    let status = if tool.is_ready() {
        "ok"
    } else {
        warn!(
            install_path = %tool.install_path.display(),
            cli_script = %tool.cli_script,
            "obfuscator install is incomplete"
        );
        "degraded"
    };
    Json(HealthResponse {
        status,
        service: SERVICE_NAME,
        lua_runtime: tool.runtime.clone(),
        note: LUAU_NOTE,
        active_jobs: state.refresh_active_jobs(),
        metrics: state.telemetry.snapshot(),
        uptime_secs: state.uptime().as_secs(),
        build: build_sha().to_string(),
        tool,
    })
}

pub(crate) async fn presets(State(state): State<Arc<ApiState>>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: Preset::ALL.iter().map(|preset| preset.as_str()).collect(),
        default: Preset::DEFAULT.as_str(),
        lua_version: state.default_lua_version.as_str(),
        warning: LUAU_WARNING,
        description: Preset::ALL
            .iter()
            .map(|preset| (preset.as_str(), preset.description()))
            .collect(),
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    state.refresh_active_jobs();
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(axum::http::header::CONTENT_TYPE, METRICS_CONTENT_TYPE)
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

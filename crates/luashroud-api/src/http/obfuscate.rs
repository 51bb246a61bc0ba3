//! `POST /obfuscate`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use luashroud_core::{
    ConfigBuilder, LuaVersion, ObfuscateError, ObfuscationRequest, Preset, Surface,
};
use luashroud_telemetry::JobOutcome;
use tracing::{info, warn};

use crate::http::errors::ApiError;
use crate::models::{ObfuscateBody, ObfuscateResponse};
use crate::state::ApiState;

/// Validate the body, run one job, and report the result.
pub(crate) async fn obfuscate(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ObfuscateBody>, JsonRejection>,
) -> Result<Json<ObfuscateResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(rejection.body_text())
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    })?;
    let preset = Preset::resolve(body.preset.as_deref());

    let source = match body.code {
        Some(code) if !code.trim().is_empty() => code,
        _ => {
            reject(&state, preset.as_str());
            return Err(ApiError::code_required());
        }
    };
    if source.len() > state.max_code_bytes {
        reject(&state, preset.as_str());
        return Err(ApiError::payload_too_large(format!(
            "code is {} bytes; maximum is {}",
            source.len(),
            state.max_code_bytes
        )));
    }

    let settings = body
        .lua_version
        .as_deref()
        .map_or(Ok(state.default_lua_version), str::parse::<LuaVersion>)
        .and_then(|version| ConfigBuilder::for_request(preset, body.config, version))
        .map_err(|err| {
            reject(&state, preset.as_str());
            ApiError::from_obfuscate(&err)
        })?;

    let label = settings.label();
    let started = Instant::now();
    let request = ObfuscationRequest::new(source, settings, Surface::Http);
    match state.obfuscator.obfuscate(request).await {
        Ok(output) => {
            state.telemetry.record_job(
                Surface::Http.as_str(),
                label,
                JobOutcome::Succeeded,
                output.elapsed,
            );
            state.telemetry.add_job_bytes(
                Surface::Http.as_str(),
                output.original_size,
                output.obfuscated_size,
            );
            info!(
                preset = label,
                original_size = output.original_size,
                obfuscated_size = output.obfuscated_size,
                "obfuscation served"
            );
            Ok(Json(ObfuscateResponse {
                success: true,
                code: output.code,
                preset: output.preset_label.to_string(),
                lua_version: output.lua_version,
                original_size: output.original_size,
                obfuscated_size: output.obfuscated_size,
            }))
        }
        Err(err) => {
            state.telemetry.record_job(
                Surface::Http.as_str(),
                label,
                failure_outcome(&err),
                started.elapsed(),
            );
            warn!(preset = label, kind = err.kind(), detail = %err.detail(), "obfuscation failed");
            Err(ApiError::from_obfuscate(&err))
        }
    }
}

fn reject(state: &ApiState, preset: &str) {
    state.telemetry.record_job(
        Surface::Http.as_str(),
        preset,
        JobOutcome::Rejected,
        Duration::ZERO,
    );
}

const fn failure_outcome(err: &ObfuscateError) -> JobOutcome {
    match err {
        ObfuscateError::InvalidInput { .. } => JobOutcome::Rejected,
        ObfuscateError::Timeout { .. } => JobOutcome::TimedOut,
        _ => JobOutcome::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use luashroud_config::ApiConfig;
    use luashroud_core::JobSettings;
    use luashroud_telemetry::Metrics;
    use luashroud_test_support::{StubBehaviour, StubObfuscator};
    use serde_json::json;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn state_with(stub: &Arc<StubObfuscator>) -> Result<Arc<ApiState>, Box<dyn std::error::Error>> {
        let config = ApiConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_body_bytes: 1024 * 1024,
            max_code_bytes: 64,
            default_lua_version: LuaVersion::LuaU,
        };
        Ok(Arc::new(ApiState::new(
            &config,
            stub.clone(),
            Metrics::new()?,
        )))
    }

    fn body(value: serde_json::Value) -> Result<Json<ObfuscateBody>, JsonRejection> {
        Ok(Json(
            serde_json::from_value(value).unwrap_or_else(|_| ObfuscateBody::default()),
        ))
    }

    #[tokio::test]
    async fn empty_code_is_rejected_without_invoking_tool() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let state = state_with(&stub)?;

        for payload in [json!({ "code": "" }), json!({}), json!({ "code": "   " })] {
            let err = obfuscate(State(state.clone()), body(payload))
                .await
                .err()
                .ok_or("expected rejection")?;
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.kind, "code_required");
        }
        assert_eq!(stub.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn oversized_code_returns_413() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let state = state_with(&stub)?;
        let err = obfuscate(State(state), body(json!({ "code": "x".repeat(65) })))
            .await
            .err()
            .ok_or("expected rejection")?;
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(stub.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_preset_falls_back_to_medium_with_default_version() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let state = state_with(&stub)?;
        let Json(response) = obfuscate(
            State(state),
            body(json!({ "code": "print(1)", "preset": "Ultra" })),
        )
        .await
        .map_err(|err| format!("unexpected {err:?}"))?;

        assert!(response.success);
        assert_eq!(response.preset, "Medium");
        assert_eq!(response.original_size, 8);
        assert!(response.code.ends_with("print(1)"));

        let request = stub.last_request().ok_or("no request recorded")?;
        assert_eq!(request.surface, Surface::Http);
        match request.settings {
            JobSettings::PresetDocument { preset, document } => {
                assert_eq!(preset, Preset::Medium);
                assert_eq!(document.lua_version(), Some("LuaU"));
            }
            other => return Err(format!("unexpected settings {other:?}").into()),
        }
        Ok(())
    }

    #[tokio::test]
    async fn override_config_keeps_its_own_lua_version() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let state = state_with(&stub)?;
        let Json(response) = obfuscate(
            State(state),
            body(json!({
                "code": "print(1)",
                "luaVersion": "LuaU",
                "config": { "LuaVersion": "Lua51", "Steps": [] }
            })),
        )
        .await
        .map_err(|err| format!("unexpected {err:?}"))?;
        assert_eq!(response.preset, "custom");

        let request = stub.last_request().ok_or("no request recorded")?;
        assert_eq!(request.settings.lua_version(), Some("Lua51"));
        Ok(())
    }

    #[tokio::test]
    async fn bad_version_or_config_is_a_client_error() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Echo));
        let state = state_with(&stub)?;
        for payload in [
            json!({ "code": "print(1)", "luaVersion": "Lua54" }),
            json!({ "code": "print(1)", "config": [1, 2] }),
        ] {
            let err = obfuscate(State(state.clone()), body(payload))
                .await
                .err()
                .ok_or("expected rejection")?;
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(stub.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn tool_failures_surface_diagnostics() -> TestResult {
        let stub = Arc::new(StubObfuscator::new(StubBehaviour::Fail(
            "cli.lua:1: unexpected symbol".to_string(),
        )));
        let state = state_with(&stub)?;
        let err = obfuscate(State(state.clone()), body(json!({ "code": "print(1)" })))
            .await
            .err()
            .ok_or("expected failure")?;
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let rendered = state.telemetry.render()?;
        assert!(rendered.contains("outcome=\"failed\""));

        let timeout_stub = Arc::new(StubObfuscator::new(StubBehaviour::Timeout));
        let timeout_state = state_with(&timeout_stub)?;
        let err = obfuscate(State(timeout_state), body(json!({ "code": "print(1)" })))
            .await
            .err()
            .ok_or("expected timeout")?;
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        Ok(())
    }
}

//! API error wrapper rendered as `{error, details?, hint?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use luashroud_core::ObfuscateError;
use luashroud_telemetry::{current_request_id, current_route};
use tracing::warn;

use crate::http::constants::LUAU_HINT;
use crate::models::ErrorBody;

/// Structured API error with optional diagnostics and hint.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    hint: Option<&'static str>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            hint: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    const fn with_hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub(crate) const fn code_required() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "code_required", "Code is required")
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", "Invalid request").with_detail(detail)
    }

    pub(crate) fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Code too large",
        )
        .with_detail(detail)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
        )
        .with_detail(message)
    }

    /// Map an invoker failure onto a response.
    pub(crate) fn from_obfuscate(err: &ObfuscateError) -> Self {
        let detail = err.detail();
        match err {
            ObfuscateError::InvalidInput { .. } => Self::bad_request(detail),
            ObfuscateError::Timeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                err.kind(),
                "Obfuscation timed out",
            )
            .with_detail(detail)
            .with_hint(LUAU_HINT),
            ObfuscateError::OutputMissing { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.kind(),
                "Output file not generated",
            )
            .with_detail(detail),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.kind(),
                "Obfuscation failed",
            )
            .with_detail(detail)
            .with_hint(LUAU_HINT),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(
                route = current_route().as_deref(),
                status = self.status.as_u16(),
                kind = self.kind,
                "request failed"
            );
        }
        let body = ErrorBody {
            error: self.title.to_string(),
            details: self.detail,
            hint: self.hint.map(str::to_string),
            request_id: current_request_id(),
        };
        (self.status, Json(body)).into_response()
    }
}

//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{Method, Request, Response, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use luashroud_config::ApiConfig;
use luashroud_core::SharedObfuscator;
use luashroud_telemetry::Metrics;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics, presets};
use crate::http::obfuscate::obfuscate;
use crate::http::telemetry::track_requests;
use crate::state::ApiState;

/// Axum router wrapper that hosts the obfuscation API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the API with the shared invoker and metrics registry.
    #[must_use]
    pub fn new(config: &ApiConfig, obfuscator: SharedObfuscator, telemetry: Metrics) -> Self {
        let state = Arc::new(ApiState::new(config, obfuscator, telemetry.clone()));
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_request(())
            .on_response(record_response);
        let layered = ServiceBuilder::new()
            .layer(luashroud_telemetry::set_request_id_layer())
            .layer(luashroud_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(telemetry, track_requests));

        let router = Self::routes()
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    fn routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/obfuscate", post(obfuscate))
            .route("/health", get(health))
            .route("/presets", get(presets))
            .route("/metrics", get(metrics))
    }

    /// Serve the API using the configured router on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        tracing::info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.into_router().into_make_service()).await?;
        Ok(())
    }

    /// Consume the server and return its router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    tracing::info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        route = tracing::field::Empty,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty
    )
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
}

//! Request accounting middleware.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use luashroud_telemetry::{Metrics, set_request_context, with_request_context};
use tracing::Span;

use crate::http::constants::HEADER_REQUEST_ID;

/// Count each request by matched route and status, with the request context
/// visible to the handler.
pub(crate) async fn track_requests(
    State(telemetry): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let route = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    set_request_context(&Span::current(), &request_id, &route);

    with_request_context(&request_id, &route, async {
        let response = next.run(request).await;
        telemetry.inc_http_request(&route, response.status().as_u16());
        response
    })
    .await
}

//! Span and request context helpers.
//!
//! # Design
//! - Request identifiers and routes live in task-local storage for the duration of a request.
//! - The process-wide span carries the run mode and build id on every event.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Keeps the process-wide `app` span entered until dropped.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span tagged with `mode` and the build id.
    #[must_use]
    pub fn new(mode: &str) -> Self {
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            mode = %mode,
            build_sha = %build_sha()
        )));
        Self {
            _guard: span.enter(),
        }
    }
}

/// Record request identifiers on an HTTP span.
pub fn set_request_context(span: &Span, request_id: &str, route: &str) {
    span.record("request_id", tracing::field::display(request_id));
    span.record("route", tracing::field::display(route));
}

/// Request identifier of the request being served by this task, if any.
#[must_use]
pub fn current_request_id() -> Option<String> {
    REQUEST_CONTEXT
        .try_with(|ctx| ctx.request_id.to_string())
        .ok()
}

/// Matched route of the request being served by this task, if any.
#[must_use]
pub fn current_route() -> Option<String> {
    REQUEST_CONTEXT.try_with(|ctx| ctx.route.to_string()).ok()
}

/// Run `fut` with the request context visible to [`current_request_id`] and [`current_route`].
pub async fn with_request_context<Fut, T>(request_id: &str, route: &str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let context = RequestContext {
        request_id: Arc::from(request_id),
        route: Arc::from(route),
    };
    REQUEST_CONTEXT.scope(context, fut).await
}

#[derive(Clone)]
struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
}

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

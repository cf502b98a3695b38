//! Request correlation for the HTTP layer.
//!
//! Every request is tagged with a [`RequestId`]. The id is kept in a task
//! local while the handler runs so error bodies can echo it, and it is
//! recorded on the `tower-http` span together with the resource being hit.

use axum::http::Request;
use std::{cell::RefCell, fmt, future::Future};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Longest client-supplied id that is echoed back as-is.
pub const MAX_REQUEST_ID_LEN: usize = 64;

/// Correlation id of one HTTP request
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accepts a client-supplied id when it is short, non-empty printable ASCII.
    pub fn from_client(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let acceptable = !raw.is_empty()
            && raw.len() <= MAX_REQUEST_ID_LEN
            && raw.bytes().all(|b| b.is_ascii_graphic());
        acceptable.then(|| Self::new(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

tokio::task_local! {
    static ACTIVE_REQUEST_ID: RefCell<Option<RequestId>>;
}

/// Runs `future` with `request_id` visible to [`current_request_id`].
pub async fn scope_request_id<Fut, R>(request_id: RequestId, future: Fut) -> R
where
    Fut: Future<Output = R>,
{
    ACTIVE_REQUEST_ID
        .scope(RefCell::new(Some(request_id)), future)
        .await
}

/// Id of the request being served by the current task, if any.
pub fn current_request_id() -> Option<RequestId> {
    ACTIVE_REQUEST_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

/// `marcas` for `/api/marcas/3`; empty outside `/api`.
fn api_resource(path: &str) -> &str {
    path.strip_prefix("/api/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
}

/// Span per request carrying its id and the API resource.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceSpan;

impl<B> MakeSpan<B> for ResourceSpan {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(RequestId::to_string)
            .unwrap_or_default();

        tracing::info_span!(
            "http",
            %request_id,
            method = %request.method(),
            path = %request.uri().path(),
            resource = api_resource(request.uri().path()),
        )
    }
}

/// `TraceLayer` type installed by [`crate::app_router`].
pub type HttpTraceLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, ResourceSpan>;

/// HTTP tracing: 5xx responses are logged as failures.
pub fn configure_http_tracing() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(ResourceSpan)
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}

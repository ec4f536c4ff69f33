//! Request correlation
//!
//! Adopts `x-request-id` / `x-trace-id` from the caller (or mints a request
//! id), stores the [`RequestContext`] in the request extensions for the trace
//! span, and echoes the request id on the response.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;
use vgraph_core_types::RequestContext;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

pub async fn request_context(mut req: Request, next: Next) -> Response {
    let ctx = {
        let header = |name: &HeaderName| req.headers().get(name).and_then(|v| v.to_str().ok());
        RequestContext::from_headers(header(&REQUEST_ID_HEADER), header(&TRACE_ID_HEADER))
    };
    let request_id = ctx.request_id.clone();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Span for one HTTP request, tagged with its correlation ids
pub fn request_span(req: &axum::http::Request<Body>) -> Span {
    let ctx = req.extensions().get::<RequestContext>();
    let request_id = ctx.map(|c| c.request_id.to_string()).unwrap_or_default();
    let trace_id = ctx
        .and_then(|c| c.trace_id.as_ref())
        .map(|t| t.to_string())
        .unwrap_or_default();
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
        trace_id = %trace_id,
    )
}

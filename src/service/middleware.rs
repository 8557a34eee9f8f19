//! Service middleware for request ids and metrics.
//!
//! ## Metrics Logged
//!
//! Under the `causal_layout::metrics` target:
//! - `request_metric` - path pattern, method, status, latency
//! - `layout_metric` - nodes and edges per computed layout

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::info;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id attached to every request's extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attach a [`RequestId`] to the request and echo it on the response.
///
/// An id already present in the extensions wins, then the `X-Request-Id`
/// header, then a fresh UUID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = match request.extensions().get::<RequestId>() {
        Some(existing) => existing.clone(),
        None => RequestId(
            request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        ),
    };
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "causal_layout::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

fn uuid_segment() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("uuid pattern is a valid regex")
    })
}

fn post_slug_segment() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"^/api/posts/[^/]+/layout$").expect("slug pattern is a valid regex")
    })
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Article slugs and UUIDs are replaced with placeholders.
fn normalize_path(path: &str) -> String {
    if post_slug_segment().is_match(path) {
        return "/api/posts/:slug/layout".to_string();
    }
    uuid_segment().replace_all(path, ":id").to_string()
}

/// Record layout computation metrics.
pub fn record_layout_metrics(node_count: usize, edge_count: usize, latency_ms: u64) {
    info!(
        target: "causal_layout::metrics",
        metric_type = "layout",
        node_count = node_count,
        edge_count = edge_count,
        latency_ms = latency_ms,
        "layout_metric"
    );
}

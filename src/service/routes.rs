//! Axum routes for the causal layout service.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Extension, FromRequest, Json, Path, Request, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::relayout::auto_layout;
use crate::store::{NodeSource, PoolStats};
use crate::ticker::extract_ticker;
use crate::types::{CausalNode, FlowGraph, LayoutNode, PostRef};
use crate::LAYOUT_SCHEMA_VERSION;

use super::middleware::{metrics_middleware, record_layout_metrics, request_id_middleware, RequestId};
use super::state::ServiceState;

/// Largest accepted request body. Sized for graphs of tens of thousands of nodes.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to lay out a flat node collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRequest {
    /// Nodes in store order.
    pub nodes: Vec<CausalNode>,
}

/// Computed layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResponse {
    /// Positioned nodes and edges.
    pub graph: FlowGraph,
    /// Fingerprint of `graph`.
    pub fingerprint: String,
    /// Hash of the grid policy that produced `graph`.
    pub grid_params_hash: String,
}

/// Request to snap positioned nodes back onto the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLayoutRequest {
    /// Nodes with their current canvas positions.
    pub nodes: Vec<LayoutNode>,
}

/// Re-positioned nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLayoutResponse {
    /// Nodes ordered by column then label.
    pub nodes: Vec<LayoutNode>,
}

/// Request to extract a ticker from a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerRequest {
    /// Free-text label.
    pub label: String,
}

/// Extracted ticker, `null` when none was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerResponse {
    /// Ticker symbol.
    pub ticker: Option<String>,
}

/// Layout of a stored article's causal graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLayoutResponse {
    /// The article.
    pub post: PostRef,
    /// Positioned nodes and edges.
    pub graph: FlowGraph,
    /// Fingerprint of `graph`.
    pub fingerprint: String,
    /// Store fetch plus layout time.
    pub duration_ms: u64,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    pub grid_policy_id: String,
    pub grid_params_hash: String,
    pub store_healthy: bool,
    /// Pool statistics, absent for stores without a pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PoolStats>,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub store: bool,
    pub details: Option<String>,
}

/// Structured error response with correlation ID for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Correlation ID for request tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            correlation_id: None,
            details: None,
        }
    }

    /// Add a correlation ID to the error.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, body: ErrorResponse) -> ApiError {
    tracing::warn!(
        status = status.as_u16(),
        code = %body.code,
        error = %body.error,
        correlation_id = ?body.correlation_id,
        "Request error"
    );
    (status, Json(body))
}

fn not_found(slug: &str, request_id: &RequestId) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        ErrorResponse::new("NOT_FOUND", format!("Post not found: {}", slug))
            .with_correlation_id(request_id.as_str()),
    )
}

fn store_error<E: std::error::Error>(e: &E, request_id: &RequestId) -> ApiError {
    tracing::error!(error = %e, correlation_id = %request_id.as_str(), "Node store request failed");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("STORE_ERROR", format!("Store error: {}", e))
            .with_correlation_id(request_id.as_str()),
    )
}

fn invalid_request(rejection: &JsonRejection, request_id: Option<&RequestId>) -> ApiError {
    let mut body = ErrorResponse::new("INVALID_REQUEST", "Invalid request body")
        .with_details(rejection.body_text());
    if let Some(id) = request_id {
        body = body.with_correlation_id(id.as_str());
    }
    api_error(rejection.status(), body)
}

/// JSON body extractor whose rejections are `ErrorResponse` bodies.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = req.extensions().get::<RequestId>().cloned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_request(&rejection, request_id.as_ref())),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Lay out a node collection supplied in the request body.
async fn layout_handler<S: NodeSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    JsonBody(request): JsonBody<LayoutRequest>,
) -> Json<LayoutResponse> {
    let started = Instant::now();
    let graph = state.engine().layout(&request.nodes);
    record_layout_metrics(graph.num_nodes(), graph.num_edges(), started.elapsed().as_millis() as u64);

    Json(LayoutResponse {
        fingerprint: graph.fingerprint(),
        grid_params_hash: state.policy().params_hash(),
        graph,
    })
}

/// Snap positioned nodes back onto the grid.
async fn auto_layout_handler<S: NodeSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    JsonBody(request): JsonBody<AutoLayoutRequest>,
) -> Json<AutoLayoutResponse> {
    Json(AutoLayoutResponse {
        nodes: auto_layout(&request.nodes, state.policy()),
    })
}

/// Extract a ticker symbol from a label.
async fn ticker_handler(JsonBody(request): JsonBody<TickerRequest>) -> Json<TickerResponse> {
    Json(TickerResponse {
        ticker: extract_ticker(&request.label),
    })
}

/// Fetch an article's nodes from the store and lay them out.
async fn post_layout_handler<S: NodeSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Extension(request_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<PostLayoutResponse>, ApiError> {
    let started = Instant::now();

    let post = state
        .store
        .get_post_by_slug(&slug)
        .await
        .map_err(|e| store_error(&e, &request_id))?
        .ok_or_else(|| not_found(&slug, &request_id))?;

    let nodes = state
        .store
        .get_nodes(&post.id)
        .await
        .map_err(|e| store_error(&e, &request_id))?;

    let graph = state.engine().layout(&nodes);
    let duration_ms = started.elapsed().as_millis() as u64;
    record_layout_metrics(graph.num_nodes(), graph.num_edges(), duration_ms);

    Ok(Json(PostLayoutResponse {
        post,
        fingerprint: graph.fingerprint(),
        graph,
        duration_ms,
    }))
}

/// Health check endpoint (detailed).
async fn health_handler<S: NodeSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<HealthResponse> {
    let store_healthy = state.store.is_healthy().await;

    Json(HealthResponse {
        status: if store_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: LAYOUT_SCHEMA_VERSION.to_string(),
        grid_policy_id: state.policy().policy_id().to_string(),
        grid_params_hash: state.policy().params_hash(),
        store_healthy,
        database: state.store.pool_stats(),
    })
}

/// Liveness probe endpoint. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint. 503 while the store is unreachable.
async fn readiness_handler<S: NodeSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.store.is_healthy().await {
        Ok(Json(ReadinessResponse {
            ready: true,
            store: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                store: false,
                details: Some("Node store unreachable".to_string()),
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the layout service.
pub fn create_router<S: NodeSource + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Layout operations
        .route("/api/layout", post(layout_handler::<S>))
        .route("/api/layout/auto", post(auto_layout_handler::<S>))
        .route("/api/ticker", post(ticker_handler))
        .route("/api/posts/:slug/layout", get(post_layout_handler::<S>))
        // Health checks
        .route("/health", get(health_handler::<S>))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler::<S>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryNodeSource;
    use crate::types::{NodeKind, PostId};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn seeded_store() -> InMemoryNodeSource {
        let mut store = InMemoryNodeSource::new();
        let post = PostRef {
            id: PostId::new(Uuid::from_u128(7)),
            slug: "ai-power".to_string(),
            title: "AI and the grid".to_string(),
            is_premium: true,
        };
        store.add_post(post.clone());
        store
            .add_node(post.id, CausalNode::new("a", "AI Compute Demand", NodeKind::Root))
            .unwrap();
        store
            .add_node(post.id, CausalNode::new("b", "VST (Vistra)", NodeKind::Ticker).with_parent("a"))
            .unwrap();
        store
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_layout_endpoint() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));
        let body = serde_json::json!({
            "nodes": [
                { "id": "a", "label": "AI Compute Demand", "type": "root", "parent_id": null },
                { "id": "e", "label": "Orphan", "type": "impact", "parent_id": "missing" }
            ]
        });

        let response = app.oneshot(post_json("/api/layout", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["graph"]["nodes"][1]["id"], "e");
        assert_eq!(json["graph"]["nodes"][1]["position"]["y"], 220.0);
        assert_eq!(json["graph"]["edges"].as_array().unwrap().len(), 0);
        assert_eq!(json["fingerprint"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_ticker_endpoint() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));

        let response = app
            .clone()
            .oneshot(post_json("/api/ticker", serde_json::json!({ "label": "Vistra (VST)" })))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["ticker"], "VST");

        let response = app
            .oneshot(post_json("/api/ticker", serde_json::json!({ "label": "vistra" })))
            .await
            .unwrap();
        assert!(body_json(response).await["ticker"].is_null());
    }

    #[tokio::test]
    async fn test_post_layout_endpoint() {
        let app = create_router(ServiceState::new(seeded_store()));

        let request = Request::builder().uri("/api/posts/ai-power/layout").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["post"]["slug"], "ai-power");
        assert_eq!(json["post"]["is_premium"], true);
        assert_eq!(json["graph"]["edges"][0]["id"], "e-a-b");
        assert_eq!(json["graph"]["nodes"][1]["data"]["ticker"], "VST");
    }

    #[tokio::test]
    async fn test_post_layout_not_found() {
        let app = create_router(ServiceState::new(seeded_store()));

        let request = Request::builder().uri("/api/posts/nope/layout").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_auto_layout_endpoint() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));
        let body = serde_json::json!({
            "nodes": [
                { "id": "n1", "type": "impact", "position": { "x": 130.0, "y": 500.0 }, "data": { "label": "Zeta" } },
                { "id": "n2", "type": "trigger", "position": { "x": 100.0, "y": 10.0 }, "data": { "label": "Alpha" } }
            ]
        });

        let response = app.oneshot(post_json("/api/layout/auto", body)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["nodes"][0]["id"], "n2");
        assert_eq!(json["nodes"][1]["position"]["y"], 220.0);
    }

    #[tokio::test]
    async fn test_health_probes() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["grid_policy_id"], "grid_policy_v1");
        assert!(json.get("database").is_none());

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_error_response() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));
        let mut request = post_json("/api/layout", serde_json::json!({ "nodes": [{ "id": "a" }] }));
        request
            .headers_mut()
            .insert("x-request-id", "req-42".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()["content-type"], "application/json");

        let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "INVALID_REQUEST");
        assert_eq!(error.correlation_id.as_deref(), Some("req-42"));
        assert!(error.details.unwrap().contains("label"));
    }

    #[tokio::test]
    async fn test_non_json_body_returns_error_response() {
        let app = create_router(ServiceState::new(InMemoryNodeSource::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/api/ticker")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_not_found_carries_request_id() {
        let app = create_router(ServiceState::new(seeded_store()));
        let request = Request::builder()
            .uri("/api/posts/nope/layout")
            .header("x-request-id", "req-7")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-7");
        assert_eq!(body_json(response).await["correlation_id"], "req-7");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Unreachable;

    /// Store whose backend is down but still reports pool statistics.
    struct DownStore;

    #[async_trait]
    impl NodeSource for DownStore {
        type Error = Unreachable;

        async fn get_post_by_slug(&self, _slug: &str) -> Result<Option<PostRef>, Self::Error> {
            Err(Unreachable)
        }

        async fn get_nodes(&self, _post_id: &PostId) -> Result<Vec<CausalNode>, Self::Error> {
            Err(Unreachable)
        }

        async fn is_healthy(&self) -> bool {
            false
        }

        fn pool_stats(&self) -> Option<PoolStats> {
            Some(PoolStats { size: 2, idle: 0, max: 10 })
        }
    }

    #[tokio::test]
    async fn test_store_failure_returns_store_error_with_generated_id() {
        let app = create_router(ServiceState::new(DownStore));

        let request = Request::builder().uri("/api/posts/ai-power/layout").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let echoed = response.headers()["x-request-id"].to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&echoed).is_ok());

        let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "STORE_ERROR");
        assert_eq!(error.correlation_id, Some(echoed));
    }

    #[tokio::test]
    async fn test_health_reports_pool_stats_and_degraded_store() {
        let app = create_router(ServiceState::new(DownStore));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["database"]["size"], 2);
        assert_eq!(json["database"]["max"], 10);

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

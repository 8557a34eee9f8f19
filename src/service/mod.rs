//! Causal Layout REST Service
//!
//! Exposes the layout engine and ticker heuristic over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /api/layout` - Lay out a flat node collection
//! - `POST /api/layout/auto` - Snap positioned nodes back onto the grid
//! - `POST /api/ticker` - Extract a ticker symbol from a label
//! - `GET /api/posts/:slug/layout` - Lay out a stored article's graph
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{
    metrics_middleware, record_layout_metrics, request_id_middleware, RequestId, REQUEST_ID_HEADER,
};
pub use routes::{create_router, ErrorResponse, MAX_BODY_BYTES};
pub use state::ServiceState;

//! Content-store backends that supply causal nodes.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::types::{CausalNode, PostId, PostRef};

/// Connection pool statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Current pool size.
    pub size: u32,
    /// Number of idle connections.
    pub idle: usize,
    /// Maximum pool size.
    pub max: u32,
}

/// Source of the flat node collection attached to an article.
///
/// Implementations must return nodes in a stable order (creation time, then
/// id): root tie-breaking in the layout depends on input order.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Resolve an article by slug.
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostRef>, Self::Error>;

    /// Fetch the causal nodes of an article in store order.
    async fn get_nodes(&self, post_id: &PostId) -> Result<Vec<CausalNode>, Self::Error>;

    /// Whether the backend is reachable.
    async fn is_healthy(&self) -> bool {
        true
    }

    /// Pool statistics, for backends that hold a connection pool.
    fn pool_stats(&self) -> Option<PoolStats> {
        None
    }
}

pub use memory::InMemoryNodeSource;

#[cfg(feature = "postgres")]
pub use postgres::PostgresNodeSource;

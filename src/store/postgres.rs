//! PostgreSQL node source for production use.
//!
//! Reads the content site's `posts` and `butterfly_nodes` tables. Node ids
//! are cast to text in SQL, so `uuid` and text id columns both decode.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use crate::types::{CausalNode, NodeId, NodeKind, PostId, PostRef};
use super::{NodeSource, PoolStats};

/// Configuration for the PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800).
    pub max_lifetime_secs: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/postgres".to_string()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 2),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", 1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Error type for PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// PostgreSQL node source.
pub struct PostgresNodeSource {
    pool: PgPool,
}

impl PostgresNodeSource {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    fn parse_node_row(row: &PgRow) -> Result<CausalNode, sqlx::Error> {
        Ok(node_from_columns(
            row.try_get("id")?,
            row.try_get("label")?,
            row.try_get("type")?,
            row.try_get("parent_id")?,
        ))
    }
}

/// Build a node from text-cast `butterfly_nodes` columns.
fn node_from_columns(
    id: String,
    label: Option<String>,
    kind: Option<String>,
    parent_id: Option<String>,
) -> CausalNode {
    let kind = kind
        .as_deref()
        .and_then(NodeKind::from_str)
        .unwrap_or(NodeKind::Unknown);

    let node = CausalNode::new(NodeId::from(id), label.unwrap_or_default(), kind);
    match parent_id {
        Some(parent) => node.with_parent(parent),
        None => node,
    }
}

#[async_trait]
impl NodeSource for PostgresNodeSource {
    type Error = PostgresError;

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostRef>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, title, is_premium
            FROM posts
            WHERE slug = $1
            "#
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: Uuid = row.try_get("id")?;
        let title: Option<String> = row.try_get("title")?;
        let is_premium: Option<bool> = row.try_get("is_premium")?;

        Ok(Some(PostRef {
            id: PostId::new(id),
            slug: row.try_get("slug")?,
            title: title.unwrap_or_default(),
            is_premium: is_premium.unwrap_or(false),
        }))
    }

    async fn get_nodes(&self, post_id: &PostId) -> Result<Vec<CausalNode>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id::text AS id, label, type, parent_id::text AS parent_id
            FROM butterfly_nodes
            WHERE post_id = $1
            ORDER BY created_at, id
            "#
        )
        .bind(post_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let nodes = rows
            .iter()
            .map(Self::parse_node_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(post_id = %post_id, node_count = nodes.len(), "Loaded causal nodes");
        Ok(nodes)
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        Some(PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max: self.pool.options().get_max_connections(),
        })
    }
}

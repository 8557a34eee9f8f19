//! In-memory node source for tests and local runs.

use std::collections::BTreeMap;
use async_trait::async_trait;

use crate::types::{CausalNode, PostId, PostRef};
use super::NodeSource;

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Nodes were added for an article that was never registered.
    #[error("Post not found: {0}")]
    PostNotFound(PostId),
}

/// In-memory node source.
///
/// Posts live in a BTreeMap; nodes keep insertion order per post.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeSource {
    posts: BTreeMap<PostId, PostRef>,
    nodes: BTreeMap<PostId, Vec<CausalNode>>,
}

impl InMemoryNodeSource {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an article.
    pub fn add_post(&mut self, post: PostRef) {
        self.nodes.entry(post.id).or_default();
        self.posts.insert(post.id, post);
    }

    /// Append a node to an article's graph.
    pub fn add_node(&mut self, post_id: PostId, node: CausalNode) -> Result<(), InMemoryError> {
        if !self.posts.contains_key(&post_id) {
            return Err(InMemoryError::PostNotFound(post_id));
        }
        self.nodes.entry(post_id).or_default().push(node);
        Ok(())
    }
}

#[async_trait]
impl NodeSource for InMemoryNodeSource {
    type Error = InMemoryError;

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostRef>, Self::Error> {
        Ok(self.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn get_nodes(&self, post_id: &PostId) -> Result<Vec<CausalNode>, Self::Error> {
        Ok(self.nodes.get(post_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;
    use uuid::Uuid;

    fn post(n: u128, slug: &str) -> PostRef {
        PostRef {
            id: PostId::new(Uuid::from_u128(n)),
            slug: slug.to_string(),
            title: format!("Post {}", n),
            is_premium: false,
        }
    }

    #[tokio::test]
    async fn test_nodes_keep_insertion_order() {
        let mut store = InMemoryNodeSource::new();
        let p = post(1, "ai-power");
        store.add_post(p.clone());
        store.add_node(p.id, CausalNode::new("z", "Z", NodeKind::Root)).unwrap();
        store.add_node(p.id, CausalNode::new("a", "A", NodeKind::Root)).unwrap();

        let nodes = store.get_nodes(&p.id).await.unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[tokio::test]
    async fn test_lookup_by_slug() {
        let mut store = InMemoryNodeSource::new();
        store.add_post(post(1, "ai-power"));
        store.add_post(post(2, "rates"));

        let found = store.get_post_by_slug("rates").await.unwrap().unwrap();
        assert_eq!(found.id, PostId::new(Uuid::from_u128(2)));
        assert!(store.get_post_by_slug("missing").await.unwrap().is_none());
        assert!(store.is_healthy().await);
    }

    #[test]
    fn test_add_node_requires_post() {
        let mut store = InMemoryNodeSource::new();
        let err = store
            .add_node(PostId::new(Uuid::from_u128(9)), CausalNode::new("a", "A", NodeKind::Root))
            .unwrap_err();
        assert!(matches!(err, InMemoryError::PostNotFound(_)));
    }
}

//! Service state management.

use std::sync::Arc;

use crate::layering::LayoutEngine;
use crate::policy::GridPolicy;
use crate::store::NodeSource;

/// Shared service state.
///
/// Holds the node source and the layout engine configured for this process.
pub struct ServiceState<S: NodeSource + 'static> {
    /// The content store for article/node lookups.
    pub store: Arc<S>,
    engine: Arc<LayoutEngine>,
}

impl<S: NodeSource + 'static> ServiceState<S> {
    /// Create service state with the default grid.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, GridPolicy::default())
    }

    /// Create service state with a custom grid policy.
    pub fn with_policy(store: S, policy: GridPolicy) -> Self {
        Self {
            store: Arc::new(store),
            engine: Arc::new(LayoutEngine::new(policy)),
        }
    }

    /// Create service state with the grid read from `LAYOUT_*` variables.
    pub fn from_env(store: S) -> Self {
        let policy = GridPolicy::from_env();
        if policy != GridPolicy::default() {
            tracing::info!(
                origin_x = policy.origin_x,
                origin_y = policy.origin_y,
                column_spacing = policy.column_spacing,
                row_spacing = policy.row_spacing,
                "Using non-default grid policy from environment"
            );
        }
        Self::with_policy(store, policy)
    }

    /// The layout engine.
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// The grid policy in use.
    pub fn policy(&self) -> &GridPolicy {
        self.engine.policy()
    }
}

impl<S: NodeSource + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine: Arc::clone(&self.engine),
        }
    }
}

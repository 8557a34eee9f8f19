//! # causal-layout
//!
//! Deterministic layered layout for causal node forests.
//!
//! The content store hands over a flat, unordered list of causal nodes, each
//! naming an optional parent. This crate rebuilds the forest, ranks nodes by
//! breadth-first depth, places them on a left-to-right grid, classifies them
//! for rendering, and pulls ticker symbols out of instrument labels.
//!
//! ## Core Contract
//!
//! 1. [`build_layout`]: flat nodes → positioned nodes + parent/child edges
//! 2. [`extract_ticker`]: free-text label → optional ticker symbol
//!
//! Both are pure and never fail. Dangling parents become extra roots, nodes
//! no root reaches land at depth 0, and every input node gets exactly one
//! position.
//!
//! ## Architecture
//!
//! ```text
//! NodeSource → CausalNode[] → LayoutEngine (GridPolicy) → FlowGraph → renderer
//!                                  ↓
//!                           extract_ticker (ticker nodes)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same input (same order) → byte-identical output and equal fingerprints
//! - Roots keep input order; same-depth nodes are ordered by label (code points)
//! - Edges follow input order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod layering;
pub mod relayout;
pub mod ticker;
pub mod canonical;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    NodeId, NodeKind, CausalNode,
    RenderKind, Position, RenderData, LayoutNode, LayoutEdge, FlowGraph,
    PostId, PostRef,
};
pub use policy::GridPolicy;
pub use store::{NodeSource, InMemoryNodeSource, PoolStats};
#[cfg(feature = "postgres")]
pub use store::PostgresNodeSource;
pub use layering::{build_layout, assign_depths, LayoutEngine, Layering};
pub use relayout::auto_layout;
pub use ticker::extract_ticker;
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version of the layout output.
/// Increment on breaking changes to any output type.
pub const LAYOUT_SCHEMA_VERSION: &str = "1.0.0";

/// Default grid policy version identifier.
pub const DEFAULT_GRID_POLICY_VERSION: &str = "grid_policy_v1";

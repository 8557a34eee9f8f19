//! Output types: positioned nodes and edges ready for a rendering surface.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::{NodeId, NodeKind};
use crate::canonical::canonical_hash_hex;

/// Visual category used purely for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    /// Causes and intermediate events.
    Trigger,
    /// Consequences.
    Impact,
    /// Tradable instruments.
    Ticker,
}

impl RenderKind {
    /// Map a domain kind to its render kind.
    ///
    /// Total: anything that is not `ticker` or `impact` renders as `trigger`.
    pub fn from_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Ticker => Self::Ticker,
            NodeKind::Impact => Self::Impact,
            NodeKind::Root | NodeKind::Event | NodeKind::Unknown => Self::Trigger,
        }
    }
}

impl From<NodeKind> for RenderKind {
    fn from(kind: NodeKind) -> Self {
        Self::from_kind(kind)
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Impact => write!(f, "impact"),
            Self::Ticker => write!(f, "ticker"),
        }
    }
}

/// Absolute canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate (columns grow to the right).
    pub x: f64,
    /// Vertical coordinate (rows grow downward).
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Payload handed to the renderer with each node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderData {
    /// Display label.
    pub label: String,
    /// Ticker symbol, set only on ticker nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Identifier copied from the input node.
    pub id: NodeId,
    /// Visual category.
    #[serde(rename = "type")]
    pub render_kind: RenderKind,
    /// Absolute position.
    pub position: Position,
    /// Renderer payload.
    pub data: RenderData,
}

/// A parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// Stable identifier `e-{source}-{target}`.
    pub id: String,
    /// Parent node.
    pub source: NodeId,
    /// Child node.
    pub target: NodeId,
    /// Whether the renderer animates the edge.
    #[serde(default)]
    pub animated: bool,
}

impl LayoutEdge {
    /// Create the edge from `source` to `target`.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: format!("e-{}-{}", source, target),
            source,
            target,
            animated: true,
        }
    }
}

/// Complete layout result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Positioned nodes, ordered by depth then by label.
    pub nodes: Vec<LayoutNode>,
    /// Edges in input order.
    pub edges: Vec<LayoutEdge>,
}

impl FlowGraph {
    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Content fingerprint of the whole layout.
    ///
    /// Equal fingerprints mean byte-identical serialized output.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

//! Core types for the layout engine.

pub mod node;
pub mod layout;
pub mod post;

pub use node::{NodeId, NodeKind, CausalNode};
pub use layout::{RenderKind, Position, RenderData, LayoutNode, LayoutEdge, FlowGraph};
pub use post::{PostId, PostRef};

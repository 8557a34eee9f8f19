//! Re-applying the grid to an already positioned node set.
//!
//! After nodes have been dragged around or added on the canvas, each node is
//! snapped to its nearest column, every column is re-sorted by label and the
//! rows are re-packed from the top. Edges are not consulted.

use std::collections::BTreeMap;

use crate::policy::GridPolicy;
use crate::types::{LayoutNode, Position};

/// Snap nodes back onto the grid.
///
/// Columns left of the origin stay negative. Output is ordered by column,
/// then by label; every other node field is preserved.
pub fn auto_layout(nodes: &[LayoutNode], policy: &GridPolicy) -> Vec<LayoutNode> {
    let mut columns: BTreeMap<i64, Vec<&LayoutNode>> = BTreeMap::new();
    for node in nodes {
        columns
            .entry(policy.column_of(node.position.x))
            .or_default()
            .push(node);
    }

    let mut placed = Vec::with_capacity(nodes.len());
    for (column, mut group) in columns {
        if group.len() > 1 {
            group.sort_by(|a, b| a.data.label.cmp(&b.data.label));
        }
        for (row, node) in group.into_iter().enumerate() {
            placed.push(LayoutNode {
                position: Position::new(policy.column_x(column), policy.row_y(row)),
                ..node.clone()
            });
        }
    }

    tracing::debug!(
        node_count = placed.len(),
        policy_id = policy.policy_id(),
        "auto layout applied"
    );

    placed
}

//! Deterministic layered layout for causal node forests.
//!
//! The engine rebuilds the parent → children forest from a flat node list,
//! ranks every node by breadth-first distance from a root, and places the
//! ranks as left-to-right columns on a fixed grid.
//!
//! ## Algorithm
//!
//! 1. Index nodes by id; bucket children under their parent id, keeping input order
//! 2. Roots are nodes with no parent or a parent id missing from the input
//!    (dangling), collected in input order
//! 3. BFS from all roots at depth 0; a depth is fixed on first assignment
//! 4. Nodes no root reaches (isolated cycles) fall back to depth 0
//! 5. Group by depth; groups with more than one node are sorted by label
//!    (code-point order, stable)
//! 6. Place each group in its column, one row per node
//!
//! Every step is O(N) apart from the per-group sort, so the whole pass is
//! O(N log N) in the worst case. Malformed topology never fails: output
//! always holds exactly one node per input node.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::policy::GridPolicy;
use crate::ticker::extract_ticker;
use crate::types::{CausalNode, FlowGraph, LayoutEdge, LayoutNode, Position, RenderData, RenderKind};

/// Depth assignment for one input collection.
///
/// `depths[i]` is the depth of `nodes[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layering {
    /// Depth per input index.
    pub depths: Vec<u32>,
    /// Input indices of the roots, in input order.
    pub roots: Vec<usize>,
    /// Input indices no root reaches, in input order.
    pub unreachable: Vec<usize>,
}

impl Layering {
    /// Input indices grouped by depth, ascending. Groups keep input order.
    pub fn groups(&self) -> BTreeMap<u32, Vec<usize>> {
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, &depth) in self.depths.iter().enumerate() {
            groups.entry(depth).or_default().push(index);
        }
        groups
    }

    /// Deepest assigned depth, or `None` for empty input.
    pub fn max_depth(&self) -> Option<u32> {
        self.depths.iter().copied().max()
    }
}

/// Assign a breadth-first depth to every node.
pub fn assign_depths(nodes: &[CausalNode]) -> Layering {
    let mut present: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();

    for (index, node) in nodes.iter().enumerate() {
        present.insert(node.id.as_str());
        if let Some(parent) = node.parent() {
            children.entry(parent.as_str()).or_default().push(index);
        }
    }

    let roots: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| match n.parent() {
            None => true,
            Some(parent) => !present.contains(parent.as_str()),
        })
        .map(|(index, _)| index)
        .collect();

    // Depth is tracked per id so duplicate ids share one rank.
    let mut depth_by_id: HashMap<&str, u32> = HashMap::with_capacity(nodes.len());
    let mut queue: VecDeque<&str> = VecDeque::with_capacity(nodes.len());

    for &root in &roots {
        let id = nodes[root].id.as_str();
        depth_by_id.insert(id, 0);
        queue.push_back(id);
    }

    while let Some(current) = queue.pop_front() {
        let current_depth = depth_by_id.get(current).copied().unwrap_or(0);
        let Some(kids) = children.get(current) else {
            continue;
        };
        for &child in kids {
            let child_id = nodes[child].id.as_str();
            if depth_by_id.contains_key(child_id) {
                continue;
            }
            depth_by_id.insert(child_id, current_depth + 1);
            queue.push_back(child_id);
        }
    }

    let mut unreachable = Vec::new();
    let depths = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| match depth_by_id.get(node.id.as_str()) {
            Some(&depth) => depth,
            None => {
                unreachable.push(index);
                0
            }
        })
        .collect();

    Layering { depths, roots, unreachable }
}

/// Layered layout engine.
///
/// Stateless apart from its grid policy; every call recomputes from scratch.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    policy: GridPolicy,
}

impl LayoutEngine {
    /// Create an engine with a grid policy.
    pub fn new(policy: GridPolicy) -> Self {
        Self { policy }
    }

    /// Get the policy.
    pub fn policy(&self) -> &GridPolicy {
        &self.policy
    }

    /// Lay out a flat node collection.
    pub fn layout(&self, nodes: &[CausalNode]) -> FlowGraph {
        let layering = assign_depths(nodes);

        let mut positioned = Vec::with_capacity(nodes.len());
        for (depth, mut group) in layering.groups() {
            if group.len() > 1 {
                group.sort_by(|&a, &b| nodes[a].label.cmp(&nodes[b].label));
            }
            for (row, &index) in group.iter().enumerate() {
                let node = &nodes[index];
                let position = Position::new(self.policy.column_x(i64::from(depth)), self.policy.row_y(row));
                positioned.push(layout_node(node, position));
            }
        }

        let edges = build_edges(nodes);

        tracing::debug!(
            node_count = positioned.len(),
            edge_count = edges.len(),
            root_count = layering.roots.len(),
            unreachable_count = layering.unreachable.len(),
            max_depth = layering.max_depth().unwrap_or(0),
            "causal layout computed"
        );

        FlowGraph { nodes: positioned, edges }
    }
}

/// Lay out a flat node collection on the default grid.
///
/// ```
/// use causal_layout::{build_layout, CausalNode, NodeKind};
///
/// let nodes = vec![
///     CausalNode::new("a", "AI Compute Demand", NodeKind::Root),
///     CausalNode::new("b", "VST (Vistra)", NodeKind::Ticker).with_parent("a"),
/// ];
/// let graph = build_layout(&nodes);
///
/// assert_eq!(graph.nodes[1].position.x, 440.0);
/// assert_eq!(graph.nodes[1].data.ticker.as_deref(), Some("VST"));
/// assert_eq!(graph.edges[0].id, "e-a-b");
/// ```
pub fn build_layout(nodes: &[CausalNode]) -> FlowGraph {
    LayoutEngine::default().layout(nodes)
}

fn layout_node(node: &CausalNode, position: Position) -> LayoutNode {
    let render_kind = RenderKind::from_kind(node.kind);
    let ticker = match render_kind {
        RenderKind::Ticker => Some(extract_ticker(&node.label).unwrap_or_else(|| node.label.clone())),
        RenderKind::Trigger | RenderKind::Impact => None,
    };

    LayoutNode {
        id: node.id.clone(),
        render_kind,
        position,
        data: RenderData {
            label: node.label.clone(),
            ticker,
        },
    }
}

/// One edge per node whose parent id is present in the input, in input order.
fn build_edges(nodes: &[CausalNode]) -> Vec<LayoutEdge> {
    let present: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    nodes
        .iter()
        .filter_map(|node| {
            let parent = node.parent()?;
            present
                .contains(parent.as_str())
                .then(|| LayoutEdge::new(parent.clone(), node.id.clone()))
        })
        .collect()
}

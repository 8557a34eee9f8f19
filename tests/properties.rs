//! Property tests for the layout engine.
//!
//! Inputs include dangling parents, self-parents, cycles and duplicate labels.

use std::collections::{BTreeSet, HashMap};

use causal_layout::{assign_depths, build_layout, extract_ticker, CausalNode, NodeKind};
use proptest::prelude::*;

/// How a generated node refers to its parent.
#[derive(Debug, Clone)]
enum ParentRef {
    None,
    Dangling,
    Index(usize),
}

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Root),
        Just(NodeKind::Event),
        Just(NodeKind::Impact),
        Just(NodeKind::Ticker),
        Just(NodeKind::Unknown),
    ]
}

fn label_strategy() -> impl Strategy<Value = String> {
    // Small alphabet so same-depth groups hit duplicate labels.
    prop_oneof![
        Just("Alpha".to_string()),
        Just("beta".to_string()),
        Just("VST (Vistra)".to_string()),
        Just("Vistra (VST)".to_string()),
        "[A-Za-z ()]{0,12}",
    ]
}

fn materialize(entries: Vec<(NodeKind, String, ParentRef)>) -> Vec<CausalNode> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (kind, label, parent))| {
            let node = CausalNode::new(format!("n{}", i), label, kind);
            match parent {
                ParentRef::None => node,
                ParentRef::Dangling => node.with_parent(format!("ghost{}", i)),
                ParentRef::Index(j) => node.with_parent(format!("n{}", j)),
            }
        })
        .collect()
}

/// Any topology, cycles included.
fn arbitrary_nodes() -> impl Strategy<Value = Vec<CausalNode>> {
    (0usize..48).prop_flat_map(|n| {
        let parent = prop_oneof![
            Just(ParentRef::None),
            Just(ParentRef::Dangling),
            (0..n.max(1)).prop_map(ParentRef::Index),
        ];
        prop::collection::vec((kind_strategy(), label_strategy(), parent), n).prop_map(materialize)
    })
}

/// Forests only: parents always precede children, then the order is shuffled.
fn forest_nodes() -> impl Strategy<Value = Vec<CausalNode>> {
    (1usize..48)
        .prop_flat_map(|n| {
            let parents: Vec<_> = (0..n)
                .map(|i| {
                    if i == 0 {
                        Just(ParentRef::None).boxed()
                    } else {
                        prop_oneof![
                            1 => Just(ParentRef::None),
                            1 => Just(ParentRef::Dangling),
                            4 => (0..i).prop_map(ParentRef::Index),
                        ]
                        .boxed()
                    }
                })
                .collect();
            (prop::collection::vec((kind_strategy(), label_strategy()), n), parents)
        })
        .prop_map(|(payloads, parents)| {
            materialize(
                payloads
                    .into_iter()
                    .zip(parents)
                    .map(|((kind, label), parent)| (kind, label, parent))
                    .collect(),
            )
        })
        .prop_shuffle()
}

fn resolvable_parent_count(nodes: &[CausalNode]) -> usize {
    let ids: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    nodes
        .iter()
        .filter(|n| n.parent().is_some_and(|p| ids.contains(p.as_str())))
        .count()
}

proptest! {
    #[test]
    fn prop_every_node_placed_once(nodes in arbitrary_nodes()) {
        let graph = build_layout(&nodes);
        prop_assert_eq!(graph.num_nodes(), nodes.len());

        let input: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let output: BTreeSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn prop_edge_count_matches_resolvable_parents(nodes in arbitrary_nodes()) {
        let graph = build_layout(&nodes);
        prop_assert_eq!(graph.num_edges(), resolvable_parent_count(&nodes));
    }

    #[test]
    fn prop_layout_is_deterministic(nodes in arbitrary_nodes()) {
        let a = build_layout(&nodes);
        let b = build_layout(&nodes);
        prop_assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
    }

    #[test]
    fn prop_no_two_nodes_share_a_position(nodes in arbitrary_nodes()) {
        let graph = build_layout(&nodes);
        let cells: BTreeSet<(i64, i64)> = graph
            .nodes
            .iter()
            .map(|n| (n.position.x as i64, n.position.y as i64))
            .collect();
        prop_assert_eq!(cells.len(), graph.num_nodes());
    }

    #[test]
    fn prop_edges_span_exactly_one_column(nodes in forest_nodes()) {
        let graph = build_layout(&nodes);
        let x_by_id: HashMap<&str, f64> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n.position.x)).collect();

        for edge in &graph.edges {
            let source = x_by_id[edge.source.as_str()];
            let target = x_by_id[edge.target.as_str()];
            prop_assert_eq!(target, source + 320.0);
        }

        let layering = assign_depths(&nodes);
        prop_assert!(layering.unreachable.is_empty());
    }

    #[test]
    fn prop_ticker_nodes_always_carry_a_ticker(nodes in arbitrary_nodes()) {
        let graph = build_layout(&nodes);
        for node in &graph.nodes {
            let is_ticker = node.render_kind == causal_layout::RenderKind::Ticker;
            prop_assert_eq!(node.data.ticker.is_some(), is_ticker);
        }
    }

    #[test]
    fn prop_extracted_tickers_are_short_capitals(label in ".{0,40}") {
        if let Some(ticker) = extract_ticker(&label) {
            prop_assert!((1..=5).contains(&ticker.len()));
            prop_assert!(ticker.chars().all(|c| c.is_ascii_uppercase()));
            prop_assert!(label.contains(ticker.as_str()));
        }
    }
}

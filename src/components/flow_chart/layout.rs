//! Layered auto-layout for the flowchart.
//!
//! Thin adapter over the `dugong` dagre port: every call builds a fresh graph
//! with one fixed-size label per node, runs the layered layout and copies the
//! resulting centers back onto the nodes.

use std::collections::HashSet;

use dugong::graphlib::{Graph, GraphOptions};
use dugong::{EdgeLabel, GraphLabel, NodeLabel, RankDir};
use log::info;

use super::geometry::{NODE_HEIGHT, NODE_WIDTH};
use super::types::{Edge, LayoutDirection, Node, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub node_width: f64,
	pub node_height: f64,
	/// Gap between neighboring nodes in one rank.
	pub node_sep: f64,
	/// Gap reserved for edges passing through a rank.
	pub edge_sep: f64,
	/// Gap between ranks.
	pub rank_sep: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_width: NODE_WIDTH,
			node_height: NODE_HEIGHT,
			node_sep: 50.0,
			edge_sep: 10.0,
			rank_sep: 50.0,
		}
	}
}

fn rank_dir(direction: LayoutDirection) -> RankDir {
	match direction {
		LayoutDirection::TopToBottom => RankDir::TB,
		LayoutDirection::LeftToRight => RankDir::LR,
	}
}

/// Builds the layout graph. Self-loops and edges to unknown nodes are left out
/// since they carry no ranking information.
fn build_graph(
	config: &LayoutConfig,
	nodes: &[Node],
	edges: &[Edge],
	direction: LayoutDirection,
) -> Graph<NodeLabel, EdgeLabel, GraphLabel> {
	let mut graph = Graph::<NodeLabel, EdgeLabel, GraphLabel>::new(GraphOptions {
		directed: true,
		multigraph: true,
		compound: false,
	});
	graph.set_graph(GraphLabel {
		rankdir: rank_dir(direction),
		nodesep: config.node_sep,
		edgesep: config.edge_sep,
		ranksep: config.rank_sep,
		..Default::default()
	});

	let mut known = HashSet::new();
	for node in nodes {
		if known.insert(node.id.as_str()) {
			graph.set_node(
				node.id.clone(),
				NodeLabel {
					width: config.node_width,
					height: config.node_height,
					..Default::default()
				},
			);
		}
	}

	for edge in edges {
		if edge.source == edge.target || !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
			continue;
		}
		graph.set_edge_named(
			edge.source.clone(),
			edge.target.clone(),
			Some(edge.id.clone()),
			Some(EdgeLabel {
				minlen: 1,
				weight: 1.0,
				..Default::default()
			}),
		);
	}
	graph
}

/// Moves every node to its computed rank position and points its anchors along
/// `direction`. Edges come back untouched.
pub fn layout_with(
	config: &LayoutConfig,
	nodes: &[Node],
	edges: &[Edge],
	direction: LayoutDirection,
) -> (Vec<Node>, Vec<Edge>) {
	let mut graph = build_graph(config, nodes, edges, direction);
	dugong::layout(&mut graph);
	let (target_side, source_side) = direction.anchor_sides();

	let mut placed = 0;
	let nodes = nodes
		.iter()
		.map(|node| {
			let mut node = node.clone();
			if let Some(label) = graph.node(&node.id) {
				let center = Position::new(label.x.unwrap_or(0.0), label.y.unwrap_or(0.0));
				node.position = Position::new(
					center.x - config.node_width / 2.0,
					center.y - config.node_height / 2.0,
				);
				placed += 1;
			}
			node.target_position = target_side;
			node.source_position = source_side;
			node
		})
		.collect();

	info!("laid out {placed} node(s) {}", direction.as_str());
	(nodes, edges.to_vec())
}

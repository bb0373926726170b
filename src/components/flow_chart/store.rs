use super::types::{Edge, Node};

const NODE_ID_PREFIX: &str = "dndnode_";

/// Node and edge collections backing the canvas.
///
/// Every mutation rebuilds the affected collection from the previous one, so a
/// reader holding a snapshot never observes a half-applied change. Ids come
/// from counters that only move forward and are independent of how many nodes
/// are currently present.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	node_counter: u64,
	edge_counter: u64,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	pub fn next_node_id(&mut self) -> String {
		loop {
			self.node_counter += 1;
			let id = format!("{NODE_ID_PREFIX}{}", self.node_counter);
			if !self.contains_node(&id) {
				return id;
			}
		}
	}

	pub fn next_edge_id(&mut self, source: &str, target: &str) -> String {
		self.edge_counter += 1;
		format!("e{source}-{target}-{}", self.edge_counter)
	}

	pub fn set_nodes(&mut self, f: impl FnOnce(&[Node]) -> Vec<Node>) {
		self.nodes = f(&self.nodes);
	}

	pub fn set_edges(&mut self, f: impl FnOnce(&[Edge]) -> Vec<Edge>) {
		self.edges = f(&self.edges);
	}

	pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		self.nodes = nodes;
		self.edges = edges;
	}

	pub fn add_node(&mut self, node: Node) {
		self.set_nodes(|nodes| nodes.iter().cloned().chain(std::iter::once(node)).collect());
	}

	/// Applies `patch` to every node with the given id. Returns whether any matched.
	pub fn patch_node(&mut self, id: &str, patch: impl Fn(&mut Node)) -> bool {
		let mut matched = false;
		self.set_nodes(|nodes| {
			nodes
				.iter()
				.map(|n| {
					let mut n = n.clone();
					if n.id == id {
						patch(&mut n);
						matched = true;
					}
					n
				})
				.collect()
		});
		matched
	}

	/// Removes the node only. Edges pointing at it are left as they are.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let before = self.nodes.len();
		self.set_nodes(|nodes| nodes.iter().filter(|n| n.id != id).cloned().collect());
		self.nodes.len() != before
	}

	pub fn add_edge(&mut self, edge: Edge) {
		self.set_edges(|edges| edges.iter().cloned().chain(std::iter::once(edge)).collect());
	}

	pub fn remove_edge(&mut self, id: &str) -> bool {
		let before = self.edges.len();
		self.set_edges(|edges| edges.iter().filter(|e| e.id != id).cloned().collect());
		self.edges.len() != before
	}

	/// Removes every edge touching `node_id`, returning how many went away.
	pub fn remove_edges_of(&mut self, node_id: &str) -> usize {
		let before = self.edges.len();
		self.set_edges(|edges| {
			edges
				.iter()
				.filter(|e| e.source != node_id && e.target != node_id)
				.cloned()
				.collect()
		});
		before - self.edges.len()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;

	use super::*;
	use crate::components::flow_chart::types::{EdgeType, NodeKind, Position};

	fn node(id: &str) -> Node {
		Node::new(id, NodeKind::Intermediate, id, Position::default())
	}

	fn edge(id: &str, source: &str, target: &str) -> Edge {
		Edge {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			edge_type: EdgeType::SmoothStep,
			animated: true,
		}
	}

	#[test]
	fn ids_do_not_collide_after_removal() {
		let mut store = GraphStore::new();
		for _ in 0..3 {
			let id = store.next_node_id();
			store.add_node(node(&id));
		}
		store.remove_node("dndnode_1");
		let id = store.next_node_id();
		assert_eq!(id, "dndnode_4");
		assert!(!store.contains_node(&id));
	}

	#[test]
	fn generator_skips_ids_inserted_by_hand() {
		let mut store = GraphStore::new();
		store.add_node(node("dndnode_1"));
		store.add_node(node("dndnode_2"));
		assert_eq!(store.next_node_id(), "dndnode_3");
	}

	#[test]
	fn patch_reports_missing_id() {
		let mut store = GraphStore::new();
		store.add_node(node("a"));
		assert!(!store.patch_node("zzz", |n| n.label = "x".into()));
		assert!(store.patch_node("a", |n| n.label = "x".into()));
		assert_eq!(store.node("a").map(|n| n.label.as_str()), Some("x"));
	}

	#[test]
	fn removing_a_node_keeps_its_edges() {
		let mut store = GraphStore::new();
		store.add_node(node("a"));
		store.add_node(node("b"));
		store.add_edge(edge("e1", "a", "b"));
		assert!(store.remove_node("a"));
		assert!(!store.remove_node("a"));
		assert_eq!(store.edges().len(), 1);
		assert_eq!(store.remove_edges_of("a"), 1);
		assert!(store.edges().is_empty());
	}

	#[test]
	fn edge_ids_are_distinct_for_parallel_edges() {
		let mut store = GraphStore::new();
		let first = store.next_edge_id("a", "b");
		let second = store.next_edge_id("a", "b");
		assert_ne!(first, second);
	}

	proptest! {
		#[test]
		fn node_ids_stay_unique(ops in proptest::collection::vec(any::<(bool, u8)>(), 0..64)) {
			let mut store = GraphStore::new();
			for (add, pick) in ops {
				if add || store.nodes().is_empty() {
					let id = store.next_node_id();
					store.add_node(node(&id));
				} else {
					let idx = pick as usize % store.nodes().len();
					let id = store.nodes()[idx].id.clone();
					store.remove_node(&id);
				}
				let ids: HashSet<_> = store.nodes().iter().map(|n| n.id.as_str()).collect();
				prop_assert_eq!(ids.len(), store.nodes().len());
			}
		}
	}
}

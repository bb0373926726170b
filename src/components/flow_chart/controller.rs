use log::debug;

use super::state::Selection;
use super::store::GraphStore;
use super::types::{Edge, EdgeType, Node, NodeKind, NodeStats, Position};

/// Source of the counters shown when hovering a node.
pub trait StatsProvider {
	fn stats_for(&self, node: &Node) -> NodeStats;
}

/// Fixed counters per node kind, used until a real analytics source is wired in.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderStats;

impl StatsProvider for PlaceholderStats {
	fn stats_for(&self, node: &Node) -> NodeStats {
		let (views, clicks, conversions) = match node.kind {
			NodeKind::Source => (100, 20, 5),
			NodeKind::Intermediate => (80, 10, 2),
			NodeKind::Sink => (120, 30, 8),
		};
		NodeStats {
			views,
			clicks,
			conversions,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelFields {
	pub source: String,
	pub intermediate: String,
	pub sink: String,
}

impl LabelFields {
	pub fn get(&self, kind: NodeKind) -> &str {
		match kind {
			NodeKind::Source => &self.source,
			NodeKind::Intermediate => &self.intermediate,
			NodeKind::Sink => &self.sink,
		}
	}

	pub fn set(&mut self, kind: NodeKind, value: String) {
		match kind {
			NodeKind::Source => self.source = value,
			NodeKind::Intermediate => self.intermediate = value,
			NodeKind::Sink => self.sink = value,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverState {
	pub node_id: String,
	pub stats: NodeStats,
}

/// Turns canvas gestures into store mutations.
pub struct InteractionController<S = PlaceholderStats> {
	labels: LabelFields,
	background: String,
	hover: Option<HoverState>,
	stats: S,
}

impl Default for InteractionController<PlaceholderStats> {
	fn default() -> Self {
		Self::with_stats(PlaceholderStats)
	}
}

impl<S: StatsProvider> InteractionController<S> {
	pub fn with_stats(stats: S) -> Self {
		Self {
			labels: LabelFields::default(),
			background: String::new(),
			hover: None,
			stats,
		}
	}

	pub fn set_label(&mut self, kind: NodeKind, value: String) {
		self.labels.set(kind, value);
	}

	pub fn hover(&self) -> Option<&HoverState> {
		self.hover.as_ref()
	}

	pub fn on_connect(&self, store: &mut GraphStore, source: &str, target: &str) {
		let id = store.next_edge_id(source, target);
		debug!("connect {source} -> {target} as {id}");
		store.add_edge(Edge {
			id,
			source: source.to_string(),
			target: target.to_string(),
			edge_type: EdgeType::SmoothStep,
			animated: true,
		});
	}

	/// Relabels the node from the field matching its kind. Returns whether a node matched.
	pub fn on_node_double_click(&self, store: &mut GraphStore, node_id: &str) -> bool {
		let Some(kind) = store.node(node_id).map(|n| n.kind) else {
			return false;
		};
		let label = self.labels.get(kind).to_string();
		store.patch_node(node_id, |n| n.label = label.clone())
	}

	/// Creates a node of `kind` at `position` and returns its id.
	pub fn on_drop(&self, store: &mut GraphStore, position: Position, kind: NodeKind) -> String {
		let id = store.next_node_id();
		debug!("drop {kind} at ({}, {}) as {id}", position.x, position.y);
		store.add_node(Node::new(id.clone(), kind, self.labels.get(kind), position));
		id
	}

	/// Like [`Self::on_drop`], but starts from the raw drag payload. Unknown payloads are ignored.
	pub fn on_drop_payload(&self, store: &mut GraphStore, position: Position, payload: &str) -> Option<String> {
		match NodeKind::from_drag_payload(payload) {
			Ok(kind) => Some(self.on_drop(store, position, kind)),
			Err(err) => {
				debug!("ignoring drop: {err}");
				None
			}
		}
	}

	pub fn on_node_mouse_enter(&mut self, store: &mut GraphStore, node_id: &str) {
		let Some(node) = store.node(node_id) else {
			return;
		};
		self.hover = Some(HoverState {
			node_id: node.id.clone(),
			stats: self.stats.stats_for(node),
		});
		self.sync_background(store);
	}

	pub fn on_node_mouse_leave(&mut self, store: &mut GraphStore) {
		self.hover = None;
		self.sync_background(store);
	}

	pub fn set_background(&mut self, store: &mut GraphStore, value: String) {
		self.background = value;
		self.sync_background(store);
	}

	/// Applies the color field to the hovered node; an empty field clears the override.
	pub fn sync_background(&self, store: &mut GraphStore) {
		let Some(hover) = &self.hover else {
			return;
		};
		let color = self.background.trim();
		let background = (!color.is_empty()).then(|| color.to_string());
		store.patch_node(&hover.node_id, |n| n.style.background = background.clone());
	}

	pub fn on_node_drag(&self, store: &mut GraphStore, node_id: &str, position: Position) -> bool {
		store.patch_node(node_id, |n| n.position = position)
	}

	/// Deletes the selection. A node takes its incident edges with it.
	pub fn on_delete(&mut self, store: &mut GraphStore, selection: &Selection) -> bool {
		match selection {
			Selection::None => false,
			Selection::Node(id) => {
				if self.hover.as_ref().is_some_and(|h| &h.node_id == id) {
					self.hover = None;
				}
				let removed = store.remove_node(id);
				if removed {
					let edges = store.remove_edges_of(id);
					debug!("deleted node {id} and {edges} edge(s)");
				}
				removed
			}
			Selection::Edge(id) => store.remove_edge(id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn controller() -> InteractionController {
		InteractionController::default()
	}

	#[test]
	fn drop_uses_label_of_dropped_kind() {
		let (mut ctl, mut store) = (controller(), GraphStore::new());
		ctl.set_label(NodeKind::Source, "Start".into());
		let id = ctl
			.on_drop_payload(&mut store, Position::new(100.0, 50.0), "input")
			.expect("input is a known template");
		let node = store.node(&id).expect("node was added");
		assert_eq!(node.kind, NodeKind::Source);
		assert_eq!(node.position, Position::new(100.0, 50.0));
		assert_eq!(node.label, "Start");
	}

	#[test]
	fn drop_without_payload_is_ignored() {
		let (ctl, mut store) = (controller(), GraphStore::new());
		assert_eq!(ctl.on_drop_payload(&mut store, Position::default(), ""), None);
		assert!(store.nodes().is_empty());
	}

	#[test]
	fn duplicate_connections_are_kept() {
		let (ctl, mut store) = (controller(), GraphStore::new());
		ctl.on_connect(&mut store, "a", "b");
		ctl.on_connect(&mut store, "a", "b");
		assert_eq!(store.edges().len(), 2);
		for edge in store.edges() {
			assert_eq!((edge.source.as_str(), edge.target.as_str()), ("a", "b"));
			assert_eq!(edge.edge_type, EdgeType::SmoothStep);
			assert!(edge.animated);
		}
	}

	#[test]
	fn double_click_relabels_by_kind() {
		let (mut ctl, mut store) = (controller(), GraphStore::new());
		let src = ctl.on_drop(&mut store, Position::default(), NodeKind::Source);
		let sink = ctl.on_drop(&mut store, Position::default(), NodeKind::Sink);
		ctl.set_label(NodeKind::Source, "Begin".into());
		ctl.set_label(NodeKind::Sink, "End".into());
		assert!(ctl.on_node_double_click(&mut store, &sink));
		assert_eq!(store.node(&sink).map(|n| n.label.as_str()), Some("End"));
		assert_eq!(store.node(&src).map(|n| n.label.as_str()), Some(""));
		assert!(!ctl.on_node_double_click(&mut store, "missing"));
	}

	#[test]
	fn hover_reports_placeholder_stats() {
		let (mut ctl, mut store) = (controller(), GraphStore::new());
		let id = ctl.on_drop(&mut store, Position::default(), NodeKind::Sink);
		ctl.on_node_mouse_enter(&mut store, &id);
		let hover = ctl.hover().expect("hovering");
		assert_eq!(hover.node_id, id);
		assert_eq!(
			hover.stats,
			NodeStats {
				views: 120,
				clicks: 30,
				conversions: 8
			}
		);
		ctl.on_node_mouse_leave(&mut store);
		assert!(ctl.hover().is_none());
	}

	#[test]
	fn hover_recolors_and_empty_field_clears() {
		let (mut ctl, mut store) = (controller(), GraphStore::new());
		let a = ctl.on_drop(&mut store, Position::default(), NodeKind::Intermediate);
		let b = ctl.on_drop(&mut store, Position::default(), NodeKind::Intermediate);
		ctl.set_background(&mut store, "tomato".into());
		assert_eq!(store.node(&a).and_then(|n| n.style.background.clone()), None);

		ctl.on_node_mouse_enter(&mut store, &a);
		assert_eq!(store.node(&a).and_then(|n| n.style.background.clone()), Some("tomato".into()));
		assert_eq!(store.node(&b).and_then(|n| n.style.background.clone()), None);

		ctl.set_background(&mut store, String::new());
		assert_eq!(store.node(&a).and_then(|n| n.style.background.clone()), None);
	}

	struct Fixed;

	impl StatsProvider for Fixed {
		fn stats_for(&self, _: &Node) -> NodeStats {
			NodeStats {
				views: 1,
				clicks: 2,
				conversions: 3,
			}
		}
	}

	#[test]
	fn stats_provider_is_injectable() {
		let (mut ctl, mut store) = (InteractionController::with_stats(Fixed), GraphStore::new());
		let id = ctl.on_drop(&mut store, Position::default(), NodeKind::Source);
		ctl.on_node_mouse_enter(&mut store, &id);
		assert_eq!(ctl.hover().map(|h| h.stats.views), Some(1));
	}

	#[test]
	fn deleting_a_node_drops_its_edges() {
		let (mut ctl, mut store) = (controller(), GraphStore::new());
		let a = ctl.on_drop(&mut store, Position::default(), NodeKind::Source);
		let b = ctl.on_drop(&mut store, Position::default(), NodeKind::Sink);
		ctl.on_connect(&mut store, &a, &b);
		ctl.on_node_mouse_enter(&mut store, &a);
		assert!(ctl.on_delete(&mut store, &Selection::Node(a.clone())));
		assert!(store.edges().is_empty());
		assert!(ctl.hover().is_none());
		assert!(!ctl.on_delete(&mut store, &Selection::None));
	}

	#[test]
	fn drag_moves_only_the_matching_node() {
		let (ctl, mut store) = (controller(), GraphStore::new());
		let a = ctl.on_drop(&mut store, Position::default(), NodeKind::Source);
		assert!(ctl.on_node_drag(&mut store, &a, Position::new(5.0, 6.0)));
		assert_eq!(store.node(&a).map(|n| n.position), Some(Position::new(5.0, 6.0)));
		assert!(!ctl.on_node_drag(&mut store, "nope", Position::default()));
	}
}

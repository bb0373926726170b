use super::export;
use super::geometry::{self, HANDLE_HIT_RADIUS, Rect};
use super::types::{Edge, Node, Position};

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 4.0;
/// Screen-space distance within which a click selects an edge.
const EDGE_HIT_TOLERANCE: f64 = 6.0;
const ZOOM_STEP: f64 = 1.2;
/// Room left around the nodes by fit view, as a fraction of their bounds.
const FIT_PADDING: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A connection being dragged out of a source handle.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectState {
	pub source: String,
	pub cursor: Position,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(String),
	Edge(String),
}

impl Selection {
	pub fn is_node(&self, id: &str) -> bool {
		matches!(self, Selection::Node(n) if n == id)
	}

	pub fn is_edge(&self, id: &str) -> bool {
		matches!(self, Selection::Edge(e) if e == id)
	}
}

/// Viewport and in-flight gesture state of the canvas.
#[derive(Clone, Debug, Default)]
pub struct CanvasState {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: Option<ConnectState>,
	pub selection: Selection,
	pub hovered: Option<String>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, p: Position) -> (f64, f64) {
		(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Topmost node under the screen point.
	pub fn node_at_position<'n>(&self, nodes: &'n [Node], sx: f64, sy: f64) -> Option<&'n Node> {
		let p = self.screen_to_graph(sx, sy);
		nodes.iter().rev().find(|n| Rect::of_node(n).contains(p))
	}

	/// Node whose source handle is under the screen point.
	pub fn source_handle_at<'n>(&self, nodes: &'n [Node], sx: f64, sy: f64) -> Option<&'n Node> {
		let p = self.screen_to_graph(sx, sy);
		// HANDLE_HIT_RADIUS is in world-space, scales with zoom like nodes
		nodes.iter().rev().find(|n| {
			n.kind.has_source_handle()
				&& geometry::distance(geometry::anchor_point(n, n.source_position), p) < HANDLE_HIT_RADIUS
		})
	}

	pub fn edge_at_position<'e>(
		&self,
		nodes: &[Node],
		edges: &'e [Edge],
		sx: f64,
		sy: f64,
	) -> Option<&'e Edge> {
		let p = self.screen_to_graph(sx, sy);
		let tolerance = EDGE_HIT_TOLERANCE / self.transform.k;
		edges.iter().rev().find(|e| {
			geometry::edge_route(nodes, e)
				.is_some_and(|route| geometry::distance_to_path(p, &route) <= tolerance)
		})
	}

	/// Zooms by `factor` while keeping the screen point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn zoom_in(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, 1.0 / ZOOM_STEP);
	}

	/// Centers `nodes` in the viewport at the largest zoom that fits. An empty
	/// graph resets the view.
	pub fn fit_view(&mut self, nodes: &[Node]) {
		if nodes.is_empty() {
			self.transform = ViewTransform::default();
			return;
		}
		self.transform = export::transform_for_bounds(
			&export::nodes_bounds(nodes),
			self.width,
			self.height,
			MIN_ZOOM,
			MAX_ZOOM,
			FIT_PADDING,
		);
	}

	pub fn start_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn start_drag(&mut self, node: &Node, sx: f64, sy: f64) {
		self.drag = DragState {
			node_id: Some(node.id.clone()),
			start_x: sx,
			start_y: sy,
			node_start: node.position,
		};
	}

	/// Position the dragged node should move to, if a drag is in progress.
	pub fn drag_target(&self, sx: f64, sy: f64) -> Option<(&str, Position)> {
		let id = self.drag.node_id.as_deref()?;
		let k = self.transform.k;
		Some((
			id,
			Position::new(
				self.drag.node_start.x + (sx - self.drag.start_x) / k,
				self.drag.node_start.y + (sy - self.drag.start_y) / k,
			),
		))
	}

	/// Clears the selection and returns it. A selected node that is also hovered
	/// stops being hovered, since it is about to be deleted.
	pub fn take_selection(&mut self) -> Selection {
		let selection = std::mem::take(&mut self.selection);
		if let Selection::Node(id) = &selection
			&& self.hovered.as_ref() == Some(id)
		{
			self.hovered = None;
		}
		selection
	}

	/// Ends any drag, pan or pending connection.
	pub fn release(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.connect = None;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_chart::types::{EdgeType, NodeKind};

	fn nodes() -> Vec<Node> {
		vec![
			Node::new("a", NodeKind::Source, "A", Position::new(0.0, 0.0)),
			Node::new("b", NodeKind::Sink, "B", Position::new(100.0, 10.0)),
		]
	}

	#[test]
	fn screen_and_graph_coordinates_invert() {
		let mut state = CanvasState::new(800.0, 600.0);
		state.transform = ViewTransform {
			x: 40.0,
			y: -20.0,
			k: 2.0,
		};
		let p = state.screen_to_graph(140.0, 80.0);
		assert_eq!(p, Position::new(50.0, 50.0));
		assert_eq!(state.graph_to_screen(p), (140.0, 80.0));
	}

	#[test]
	fn overlapping_nodes_resolve_to_the_topmost() {
		let state = CanvasState::new(800.0, 600.0);
		let nodes = nodes();
		assert_eq!(state.node_at_position(&nodes, 120.0, 20.0).map(|n| n.id.as_str()), Some("b"));
		assert_eq!(state.node_at_position(&nodes, 10.0, 10.0).map(|n| n.id.as_str()), Some("a"));
		assert!(state.node_at_position(&nodes, 500.0, 500.0).is_none());
	}

	#[test]
	fn only_nodes_with_outputs_expose_a_source_handle() {
		let state = CanvasState::new(800.0, 600.0);
		let nodes = nodes();
		// bottom center of `a`
		assert_eq!(state.source_handle_at(&nodes, 86.0, 37.0).map(|n| n.id.as_str()), Some("a"));
		// bottom center of `b`, a sink
		assert!(state.source_handle_at(&nodes, 186.0, 46.0).is_none());
	}

	#[test]
	fn edges_are_hit_near_their_route() {
		let state = CanvasState::new(800.0, 600.0);
		let nodes = vec![
			Node::new("a", NodeKind::Source, "", Position::new(0.0, 0.0)),
			Node::new("b", NodeKind::Sink, "", Position::new(0.0, 200.0)),
		];
		let edges = vec![Edge {
			id: "e1".into(),
			source: "a".into(),
			target: "b".into(),
			edge_type: EdgeType::SmoothStep,
			animated: true,
		}];
		assert_eq!(state.edge_at_position(&nodes, &edges, 88.0, 120.0).map(|e| e.id.as_str()), Some("e1"));
		assert!(state.edge_at_position(&nodes, &edges, 150.0, 120.0).is_none());
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed_and_clamps() {
		let mut state = CanvasState::new(800.0, 600.0);
		let before = state.screen_to_graph(200.0, 100.0);
		state.zoom_at(200.0, 100.0, 1.5);
		let after = state.screen_to_graph(200.0, 100.0);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
		for _ in 0..50 {
			state.zoom_at(0.0, 0.0, 2.0);
		}
		assert_eq!(state.transform.k, MAX_ZOOM);
	}

	#[test]
	fn fit_view_centers_every_node_inside_the_viewport() {
		let mut state = CanvasState::new(800.0, 600.0);
		state.transform = ViewTransform {
			x: -900.0,
			y: 300.0,
			k: 0.3,
		};
		let nodes = nodes();
		state.fit_view(&nodes);
		assert!((MIN_ZOOM..=MAX_ZOOM).contains(&state.transform.k));

		let center = export::nodes_bounds(&nodes).center();
		let (cx, cy) = state.graph_to_screen(center);
		assert!((cx - 400.0).abs() < 1e-9 && (cy - 300.0).abs() < 1e-9);
		for node in &nodes {
			let rect = Rect::of_node(node);
			let (left, top) = state.graph_to_screen(Position::new(rect.x, rect.y));
			let (right, bottom) = state.graph_to_screen(Position::new(rect.x + rect.width, rect.y + rect.height));
			assert!(left >= 0.0 && top >= 0.0 && right <= 800.0 && bottom <= 600.0);
		}

		state.fit_view(&[]);
		assert_eq!(state.transform, ViewTransform::default());
	}

	#[test]
	fn zoom_buttons_scale_about_the_viewport_center() {
		let mut state = CanvasState::new(800.0, 600.0);
		let center = state.screen_to_graph(400.0, 300.0);
		state.zoom_in();
		assert!((state.transform.k - ZOOM_STEP).abs() < 1e-12);
		state.zoom_out();
		state.zoom_out();
		assert!(state.transform.k < 1.0);
		let after = state.screen_to_graph(400.0, 300.0);
		assert!((center.x - after.x).abs() < 1e-9 && (center.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn drag_follows_pointer_in_graph_units() {
		let mut state = CanvasState::new(800.0, 600.0);
		state.transform.k = 2.0;
		let nodes = nodes();
		state.start_drag(&nodes[0], 10.0, 10.0);
		assert_eq!(state.drag_target(30.0, 50.0), Some(("a", Position::new(10.0, 20.0))));
		state.release();
		assert_eq!(state.drag_target(30.0, 50.0), None);
	}

	#[test]
	fn taking_a_node_selection_drops_its_hover() {
		let mut state = CanvasState::new(800.0, 600.0);
		state.selection = Selection::Node("a".into());
		state.hovered = Some("a".into());
		assert_eq!(state.take_selection(), Selection::Node("a".into()));
		assert_eq!(state.selection, Selection::None);
		assert_eq!(state.hovered, None);

		state.selection = Selection::Edge("e1".into());
		state.hovered = Some("a".into());
		assert_eq!(state.take_selection(), Selection::Edge("e1".into()));
		assert_eq!(state.hovered.as_deref(), Some("a"));
	}

	#[test]
	fn selection_matches_by_kind_and_id() {
		let selection = Selection::Node("a".into());
		assert!(selection.is_node("a"));
		assert!(!selection.is_edge("a"));
		assert!(!Selection::None.is_node("a"));
	}
}

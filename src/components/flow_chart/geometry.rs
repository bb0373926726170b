use super::types::{AnchorSide, Edge, EdgeType, Node, Position};

/// Footprint of a node on the canvas, in canvas units.
pub const NODE_WIDTH: f64 = 172.0;
pub const NODE_HEIGHT: f64 = 36.0;

pub const HANDLE_RADIUS: f64 = 4.0;
/// Hit radius around a handle; larger than the drawn circle so it is easy to grab.
pub const HANDLE_HIT_RADIUS: f64 = 9.0;
const STEP_OFFSET: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn of_node(node: &Node) -> Self {
		Self {
			x: node.position.x,
			y: node.position.y,
			width: NODE_WIDTH,
			height: NODE_HEIGHT,
		}
	}

	pub fn contains(&self, p: Position) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	pub fn center(&self) -> Position {
		Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn union(&self, other: &Self) -> Self {
		let x = self.x.min(other.x);
		let y = self.y.min(other.y);
		Self {
			x,
			y,
			width: (self.x + self.width).max(other.x + other.width) - x,
			height: (self.y + self.height).max(other.y + other.height) - y,
		}
	}
}

/// Point on the border of `node` where a handle on `side` sits.
pub fn anchor_point(node: &Node, side: AnchorSide) -> Position {
	let Position { x, y } = node.position;
	match side {
		AnchorSide::Top => Position::new(x + NODE_WIDTH / 2.0, y),
		AnchorSide::Bottom => Position::new(x + NODE_WIDTH / 2.0, y + NODE_HEIGHT),
		AnchorSide::Left => Position::new(x, y + NODE_HEIGHT / 2.0),
		AnchorSide::Right => Position::new(x + NODE_WIDTH, y + NODE_HEIGHT / 2.0),
	}
}

fn step_out(p: Position, side: AnchorSide) -> Position {
	match side {
		AnchorSide::Top => Position::new(p.x, p.y - STEP_OFFSET),
		AnchorSide::Bottom => Position::new(p.x, p.y + STEP_OFFSET),
		AnchorSide::Left => Position::new(p.x - STEP_OFFSET, p.y),
		AnchorSide::Right => Position::new(p.x + STEP_OFFSET, p.y),
	}
}

/// Orthogonal route between two handles.
///
/// The path leaves the source perpendicular to its side, turns once through the
/// midpoint between the two stubs, and enters the target perpendicular to its
/// side. Consecutive duplicate points are dropped.
pub fn smooth_step_points(
	source: Position,
	source_side: AnchorSide,
	target: Position,
	target_side: AnchorSide,
) -> Vec<Position> {
	let (s, t) = (step_out(source, source_side), step_out(target, target_side));
	let mut points = vec![source, s];
	if source_side.is_vertical() {
		let mid_y = (s.y + t.y) / 2.0;
		points.push(Position::new(s.x, mid_y));
		points.push(Position::new(t.x, mid_y));
	} else {
		let mid_x = (s.x + t.x) / 2.0;
		points.push(Position::new(mid_x, s.y));
		points.push(Position::new(mid_x, t.y));
	}
	points.push(t);
	points.push(target);
	points.dedup();
	points
}

/// Polyline drawn for `edge`, or `None` when an endpoint no longer exists.
pub fn edge_route(nodes: &[Node], edge: &Edge) -> Option<Vec<Position>> {
	let source = nodes.iter().find(|n| n.id == edge.source)?;
	let target = nodes.iter().find(|n| n.id == edge.target)?;
	let (from, to) = (
		anchor_point(source, source.source_position),
		anchor_point(target, target.target_position),
	);
	Some(match edge.edge_type {
		EdgeType::SmoothStep => {
			smooth_step_points(from, source.source_position, to, target.target_position)
		}
	})
}

pub fn distance(a: Position, b: Position) -> f64 {
	((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return distance(p, a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	distance(p, Position::new(a.x + t * dx, a.y + t * dy))
}

pub fn distance_to_path(p: Position, points: &[Position]) -> f64 {
	points
		.windows(2)
		.map(|w| distance_to_segment(p, w[0], w[1]))
		.fold(f64::INFINITY, f64::min)
}

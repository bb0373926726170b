use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// MIME type used by the palette to tag dragged node templates.
pub const DRAG_MIME: &str = "application/x-flowchart-node";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown node kind `{0}`")]
pub struct ParseKindError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Source,
	Intermediate,
	Sink,
}

impl NodeKind {
	pub const ALL: [NodeKind; 3] = [NodeKind::Source, NodeKind::Intermediate, NodeKind::Sink];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Source => "source",
			NodeKind::Intermediate => "intermediate",
			NodeKind::Sink => "sink",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			NodeKind::Source => "Source Node",
			NodeKind::Intermediate => "Intermediate Node",
			NodeKind::Sink => "Sink Node",
		}
	}

	/// Reads a kind from a drag payload. Empty payloads are rejected like unknown ones.
	pub fn from_drag_payload(payload: &str) -> Result<Self, ParseKindError> {
		payload.trim().parse()
	}

	pub fn has_source_handle(self) -> bool {
		!matches!(self, NodeKind::Sink)
	}

	pub fn has_target_handle(self) -> bool {
		!matches!(self, NodeKind::Source)
	}
}

impl FromStr for NodeKind {
	type Err = ParseKindError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"source" | "input" => Ok(NodeKind::Source),
			"intermediate" | "default" => Ok(NodeKind::Intermediate),
			"sink" | "output" => Ok(NodeKind::Sink),
			other => Err(ParseKindError(other.to_string())),
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Side of a node where an edge attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorSide {
	Top,
	Bottom,
	Left,
	Right,
}

impl AnchorSide {
	pub fn is_vertical(self) -> bool {
		matches!(self, AnchorSide::Top | AnchorSide::Bottom)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStyle {
	pub background: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub kind: NodeKind,
	pub label: String,
	pub position: Position,
	pub style: NodeStyle,
	pub source_position: AnchorSide,
	pub target_position: AnchorSide,
}

impl Node {
	pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>, position: Position) -> Self {
		Self {
			id: id.into(),
			kind,
			label: label.into(),
			position,
			style: NodeStyle::default(),
			source_position: AnchorSide::Bottom,
			target_position: AnchorSide::Top,
		}
	}
}

/// Curve style used to draw an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeType {
	#[default]
	SmoothStep,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub edge_type: EdgeType,
	pub animated: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown layout direction `{0}`")]
pub struct ParseDirectionError(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutDirection {
	#[default]
	TopToBottom,
	LeftToRight,
}

impl LayoutDirection {
	pub fn as_str(self) -> &'static str {
		match self {
			LayoutDirection::TopToBottom => "TB",
			LayoutDirection::LeftToRight => "LR",
		}
	}

	pub fn is_horizontal(self) -> bool {
		self == LayoutDirection::LeftToRight
	}

	/// Anchor sides as `(target, source)` for nodes laid out in this direction.
	pub fn anchor_sides(self) -> (AnchorSide, AnchorSide) {
		match self {
			LayoutDirection::TopToBottom => (AnchorSide::Top, AnchorSide::Bottom),
			LayoutDirection::LeftToRight => (AnchorSide::Left, AnchorSide::Right),
		}
	}
}

impl FromStr for LayoutDirection {
	type Err = ParseDirectionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"TB" => Ok(LayoutDirection::TopToBottom),
			"LR" => Ok(LayoutDirection::LeftToRight),
			other => Err(ParseDirectionError(other.to_string())),
		}
	}
}

/// Read-only counters shown in the hover tooltip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
	pub views: u32,
	pub clicks: u32,
	pub conversions: u32,
}

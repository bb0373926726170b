use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{self, HANDLE_RADIUS, NODE_HEIGHT, NODE_WIDTH};
use super::state::{CanvasState, Selection, ViewTransform};
use super::store::GraphStore;
use super::types::{Edge, Node, NodeKind, Position};

const CANVAS_BACKGROUND: &str = "#f3f4f6";
const NODE_FILL: &str = "#ffffff";
const EDGE_COLOR: &str = "#b1b1b7";
const EDGE_SELECTED_COLOR: &str = "#555555";
const HANDLE_COLOR: &str = "#1a192b";
const LABEL_COLOR: &str = "#222222";
const CORNER_RADIUS: f64 = 3.0;
const EDGE_CORNER_RADIUS: f64 = 5.0;
const DASH: f64 = 5.0;

fn border_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Source => "#0041d0",
		NodeKind::Intermediate => "#1a192b",
		NodeKind::Sink => "#ff0072",
	}
}

/// Draws the live canvas: graph, selection and any pending connection.
pub fn render(store: &GraphStore, state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(CANVAS_BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	apply_transform(ctx, &state.transform);
	draw_edges(ctx, store.nodes(), store.edges(), state.transform.k, state.flow_time, &state.selection);
	if let Some(connect) = &state.connect {
		draw_connection_line(ctx, store.nodes(), &connect.source, connect.cursor, state.transform.k);
	}
	draw_nodes(ctx, store.nodes(), state.transform.k, &state.selection);
	ctx.restore();
}

/// Draws a still image of the graph, as used for exports.
pub fn render_snapshot(
	ctx: &CanvasRenderingContext2d,
	nodes: &[Node],
	edges: &[Edge],
	transform: &ViewTransform,
	(width, height): (f64, f64),
	background: &str,
) {
	ctx.set_fill_style_str(background);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	apply_transform(ctx, transform);
	draw_edges(ctx, nodes, edges, transform.k, 0.0, &Selection::None);
	draw_nodes(ctx, nodes, transform.k, &Selection::None);
	ctx.restore();
}

fn apply_transform(ctx: &CanvasRenderingContext2d, transform: &ViewTransform) {
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
	let array = js_sys::Array::new();
	for s in segments {
		array.push(&JsValue::from_f64(*s));
	}
	let _ = ctx.set_line_dash(&array);
}

/// Strokes a polyline with its inner corners rounded off.
fn stroke_route(ctx: &CanvasRenderingContext2d, points: &[Position]) {
	let Some((first, rest)) = points.split_first() else {
		return;
	};
	ctx.begin_path();
	ctx.move_to(first.x, first.y);
	for (i, p) in rest.iter().enumerate() {
		match rest.get(i + 1) {
			Some(next) => {
				let _ = ctx.arc_to(p.x, p.y, next.x, next.y, EDGE_CORNER_RADIUS);
			}
			None => ctx.line_to(p.x, p.y),
		}
	}
	ctx.stroke();
}

fn draw_edges(
	ctx: &CanvasRenderingContext2d,
	nodes: &[Node],
	edges: &[Edge],
	k: f64,
	flow_time: f64,
	selection: &Selection,
) {
	for edge in edges {
		// Edges whose endpoints were removed are not drawn.
		let Some(route) = geometry::edge_route(nodes, edge) else {
			continue;
		};
		let selected = selection.is_edge(&edge.id);
		ctx.set_stroke_style_str(if selected { EDGE_SELECTED_COLOR } else { EDGE_COLOR });
		ctx.set_line_width((if selected { 2.0 } else { 1.0 }) / k.max(0.5));
		if edge.animated {
			set_dash(ctx, &[DASH, DASH]);
			ctx.set_line_dash_offset(-(flow_time * 30.0) % (2.0 * DASH));
		} else {
			set_dash(ctx, &[]);
		}
		stroke_route(ctx, &route);
	}
	set_dash(ctx, &[]);
}

fn draw_connection_line(ctx: &CanvasRenderingContext2d, nodes: &[Node], source: &str, cursor: Position, k: f64) {
	let Some(node) = nodes.iter().find(|n| n.id == source) else {
		return;
	};
	let from = geometry::anchor_point(node, node.source_position);
	ctx.set_stroke_style_str(EDGE_SELECTED_COLOR);
	ctx.set_line_width(1.0 / k.max(0.5));
	set_dash(ctx, &[DASH, DASH]);
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(cursor.x, cursor.y);
	ctx.stroke();
	set_dash(ctx, &[]);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, at: Position) {
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, HANDLE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(HANDLE_COLOR);
	ctx.fill();
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, nodes: &[Node], k: f64, selection: &Selection) {
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in nodes {
		let Position { x, y } = node.position;
		let selected = selection.is_node(&node.id);

		rounded_rect(ctx, x, y, NODE_WIDTH, NODE_HEIGHT, CORNER_RADIUS);
		ctx.set_fill_style_str(node.style.background.as_deref().unwrap_or(NODE_FILL));
		ctx.fill();
		ctx.set_stroke_style_str(border_color(node.kind));
		ctx.set_line_width((if selected { 2.0 } else { 1.0 }) / k.max(0.5));
		ctx.stroke();

		if !node.label.is_empty() {
			ctx.set_fill_style_str(LABEL_COLOR);
			let _ = ctx.fill_text_with_max_width(
				&node.label,
				x + NODE_WIDTH / 2.0,
				y + NODE_HEIGHT / 2.0,
				NODE_WIDTH - 12.0,
			);
		}

		if node.kind.has_target_handle() {
			draw_handle(ctx, geometry::anchor_point(node, node.target_position));
		}
		if node.kind.has_source_handle() {
			draw_handle(ctx, geometry::anchor_point(node, node.source_position));
		}
	}
}

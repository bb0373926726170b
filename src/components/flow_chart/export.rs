use log::info;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

use super::geometry::Rect;
use super::render;
use super::state::ViewTransform;
use super::types::{Edge, Node};

#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
	pub width: u32,
	pub height: u32,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Extra room around the nodes, as a fraction of their bounds.
	pub padding: f64,
	pub background: String,
	pub file_name: String,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			width: 1024,
			height: 768,
			min_zoom: 0.5,
			max_zoom: 2.0,
			padding: 0.1,
			background: "#FFFFFF".into(),
			file_name: "reactflow.png".into(),
		}
	}
}

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("no browser window")]
	NoWindow,
	#[error("window has no document")]
	NoDocument,
	#[error("2d canvas context unavailable")]
	ContextUnavailable,
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<JsValue> for ExportError {
	fn from(value: JsValue) -> Self {
		ExportError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

/// Smallest rectangle covering every node. Empty graphs give an empty rect at the origin.
pub fn nodes_bounds(nodes: &[Node]) -> Rect {
	nodes
		.iter()
		.map(Rect::of_node)
		.reduce(|acc, r| acc.union(&r))
		.unwrap_or_default()
}

/// Transform that centers `bounds` in a `width` x `height` image at the
/// largest zoom that fits, clamped to `[min_zoom, max_zoom]`.
pub fn transform_for_bounds(
	bounds: &Rect,
	width: f64,
	height: f64,
	min_zoom: f64,
	max_zoom: f64,
	padding: f64,
) -> ViewTransform {
	let x_zoom = width / (bounds.width * (1.0 + padding));
	let y_zoom = height / (bounds.height * (1.0 + padding));
	let zoom = x_zoom.min(y_zoom);
	let k = if zoom.is_nan() {
		max_zoom
	} else {
		zoom.clamp(min_zoom, max_zoom)
	};
	let center = bounds.center();
	ViewTransform {
		x: width / 2.0 - center.x * k,
		y: height / 2.0 - center.y * k,
		k,
	}
}

impl ExportConfig {
	pub fn transform_for(&self, nodes: &[Node]) -> ViewTransform {
		transform_for_bounds(
			&nodes_bounds(nodes),
			self.width as f64,
			self.height as f64,
			self.min_zoom,
			self.max_zoom,
			self.padding,
		)
	}
}

/// Renders the whole graph into a PNG and hands it to the browser as a download.
pub fn export_image(nodes: &[Node], edges: &[Edge], config: &ExportConfig) -> Result<(), ExportError> {
	let window = web_sys::window().ok_or(ExportError::NoWindow)?;
	let document = window.document().ok_or(ExportError::NoDocument)?;

	let canvas: HtmlCanvasElement = document
		.create_element("canvas")?
		.dyn_into()
		.map_err(|_| ExportError::ContextUnavailable)?;
	canvas.set_width(config.width);
	canvas.set_height(config.height);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or(ExportError::ContextUnavailable)?
		.dyn_into()
		.map_err(|_| ExportError::ContextUnavailable)?;

	let transform = config.transform_for(nodes);
	render::render_snapshot(
		&ctx,
		nodes,
		edges,
		&transform,
		(config.width as f64, config.height as f64),
		&config.background,
	);
	let data_url = canvas.to_data_url_with_type("image/png")?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|el| ExportError::Js(format!("expected an anchor, got <{}>", el.tag_name())))?;
	anchor.set_download(&config.file_name);
	anchor.set_href(&data_url);
	anchor.click();

	info!(
		"exported {} node(s) as {} at zoom {:.2}",
		nodes.len(),
		config.file_name,
		transform.k
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::flow_chart::geometry::{NODE_HEIGHT, NODE_WIDTH};
	use crate::components::flow_chart::types::{NodeKind, Position};

	fn node_at(x: f64, y: f64) -> Node {
		Node::new(format!("{x}-{y}"), NodeKind::Intermediate, "", Position::new(x, y))
	}

	#[test]
	fn default_export_is_a_1024x768_reactflow_png() {
		let config = ExportConfig::default();
		assert_eq!(config.file_name, "reactflow.png");
		assert_eq!((config.width, config.height), (1024, 768));
		assert_eq!(config.background, "#FFFFFF");
	}

	#[test]
	fn bounds_cover_node_footprints() {
		let nodes = vec![node_at(0.0, 0.0), node_at(300.0, 100.0)];
		assert_eq!(
			nodes_bounds(&nodes),
			Rect {
				x: 0.0,
				y: 0.0,
				width: 300.0 + NODE_WIDTH,
				height: 100.0 + NODE_HEIGHT,
			}
		);
		assert_eq!(nodes_bounds(&[]), Rect::default());
	}

	#[test]
	fn single_node_is_centered_at_max_zoom() {
		let config = ExportConfig::default();
		let t = config.transform_for(&[node_at(10.0, 20.0)]);
		assert_eq!(t.k, 2.0);
		let center = Position::new(10.0 + NODE_WIDTH / 2.0, 20.0 + NODE_HEIGHT / 2.0);
		assert_eq!(center.x * t.k + t.x, 512.0);
		assert_eq!(center.y * t.k + t.y, 384.0);
	}

	#[test]
	fn wide_graphs_zoom_out_to_the_floor() {
		let config = ExportConfig::default();
		let t = config.transform_for(&[node_at(0.0, 0.0), node_at(10_000.0, 0.0)]);
		assert_eq!(t.k, 0.5);
	}

	#[test]
	fn empty_graph_uses_max_zoom() {
		let t = ExportConfig::default().transform_for(&[]);
		assert_eq!(t.k, 2.0);
		assert_eq!((t.x, t.y), (512.0, 384.0));
	}

	#[test]
	fn moderate_graphs_fit_exactly() {
		let bounds = Rect {
			x: 0.0,
			y: 0.0,
			width: 1000.0,
			height: 100.0,
		};
		let t = transform_for_bounds(&bounds, 1024.0, 768.0, 0.5, 2.0, 0.1);
		assert!((t.k - 1024.0 / 1100.0).abs() < 1e-12);
	}

	proptest! {
		#[test]
		fn zoom_is_always_clamped(w in 0.0f64..1e7, h in 0.0f64..1e7, x in -1e6f64..1e6, y in -1e6f64..1e6) {
			let bounds = Rect { x, y, width: w, height: h };
			let t = transform_for_bounds(&bounds, 1024.0, 768.0, 0.5, 2.0, 0.1);
			prop_assert!((0.5..=2.0).contains(&t.k));
		}
	}
}

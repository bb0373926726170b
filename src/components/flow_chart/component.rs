use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, DragEvent, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::controller::InteractionController;
use super::export::{self, ExportConfig};
use super::layout::{self, LayoutConfig};
use super::render;
use super::state::{CanvasState, ConnectState, Selection};
use super::store::GraphStore;
use super::types::{DRAG_MIME, LayoutDirection, NodeKind, NodeStats};
use crate::components::controls::{Controls, ViewportAction};
use crate::components::sidebar::Sidebar;

/// Graph, gesture controller and viewport shared by the event handlers and the render loop.
struct Editor {
	store: GraphStore,
	controller: InteractionController,
	canvas: CanvasState,
}

/// What the hover tooltip shows, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
struct Tooltip {
	label: String,
	left: f64,
	top: f64,
	stats: NodeStats,
}

impl Editor {
	fn new() -> Self {
		Self {
			store: GraphStore::new(),
			controller: InteractionController::default(),
			canvas: CanvasState::new(800.0, 600.0),
		}
	}

	fn set_hovered(&mut self, hovered: Option<String>) {
		if self.canvas.hovered == hovered {
			return;
		}
		match &hovered {
			Some(id) => self.controller.on_node_mouse_enter(&mut self.store, id),
			None => self.controller.on_node_mouse_leave(&mut self.store),
		}
		self.canvas.hovered = hovered;
	}

	fn apply_layout(&mut self, direction: LayoutDirection, config: &LayoutConfig) {
		let (nodes, edges) = layout::layout_with(config, self.store.nodes(), self.store.edges(), direction);
		self.store.replace(nodes, edges);
		self.canvas.fit_view(self.store.nodes());
	}

	fn apply_viewport(&mut self, action: ViewportAction) {
		match action {
			ViewportAction::ZoomIn => self.canvas.zoom_in(),
			ViewportAction::ZoomOut => self.canvas.zoom_out(),
			ViewportAction::FitView => self.canvas.fit_view(self.store.nodes()),
		}
	}

	fn tooltip(&self) -> Option<Tooltip> {
		let hover = self.controller.hover()?;
		let node = self.store.node(&hover.node_id)?;
		let (left, top) = self.canvas.graph_to_screen(node.position);
		Some(Tooltip {
			label: node.label.clone(),
			left,
			top,
			stats: hover.stats,
		})
	}
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

/// Interactive flowchart canvas with its controls, tooltip and download button.
#[component]
pub fn FlowChart(
	#[prop(optional)] layout_config: LayoutConfig,
	#[prop(optional)] export_config: ExportConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let editor = Rc::new(RefCell::new(Editor::new()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let tooltip = RwSignal::new(None::<Tooltip>);
	let node_bg = RwSignal::new(String::new());

	let refresh_tooltip = move |editor: &Editor| {
		let next = editor.tooltip();
		if tooltip.get_untracked() != next {
			tooltip.set(next);
		}
	};

	let (editor_init, animate_init, resize_cb_init) = (editor.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		{
			let mut guard = editor_init.borrow_mut();
			let ed = &mut *guard;
			ed.canvas.resize(w, h);
			ed.canvas.fit_view(ed.store.nodes());
		}

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let (editor_resize, canvas_resize) = (editor_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			editor_resize.borrow_mut().canvas.resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (editor_anim, animate_inner) = (editor_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut ed = editor_anim.borrow_mut();
				ed.canvas.tick(0.016);
				render::render(&ed.store, &ed.canvas, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let editor_md = editor.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get() {
			let _ = canvas.focus();
		}
		let mut guard = editor_md.borrow_mut();
		let ed = &mut *guard;
		let nodes = ed.store.nodes();

		if let Some(source) = ed.canvas.source_handle_at(nodes, x, y).map(|n| n.id.clone()) {
			let cursor = ed.canvas.screen_to_graph(x, y);
			ed.canvas.connect = Some(ConnectState { source, cursor });
		} else if let Some(node) = ed.canvas.node_at_position(nodes, x, y) {
			ed.canvas.selection = Selection::Node(node.id.clone());
			ed.canvas.start_drag(node, x, y);
		} else if let Some(edge) = ed.canvas.edge_at_position(nodes, ed.store.edges(), x, y) {
			ed.canvas.selection = Selection::Edge(edge.id.clone());
		} else {
			ed.canvas.selection = Selection::None;
			ed.canvas.start_pan(x, y);
		}
	};

	let (editor_mm, refresh) = (editor.clone(), refresh_tooltip);
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = editor_mm.borrow_mut();
		let ed = &mut *guard;

		if ed.canvas.connect.is_some() {
			let cursor = ed.canvas.screen_to_graph(x, y);
			if let Some(connect) = ed.canvas.connect.as_mut() {
				connect.cursor = cursor;
			}
		} else if let Some((id, position)) = ed.canvas.drag_target(x, y) {
			ed.controller.on_node_drag(&mut ed.store, id, position);
		} else if ed.canvas.pan.active {
			ed.canvas.pan_to(x, y);
		} else {
			let hovered = ed.canvas.node_at_position(ed.store.nodes(), x, y).map(|n| n.id.clone());
			ed.set_hovered(hovered);
		}
		refresh(ed);
	};

	let editor_mu = editor.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = editor_mu.borrow_mut();
		let ed = &mut *guard;
		if let Some(connect) = ed.canvas.connect.take() {
			let target = ed
				.canvas
				.node_at_position(ed.store.nodes(), x, y)
				.filter(|n| n.kind.has_target_handle() && n.id != connect.source)
				.map(|n| n.id.clone());
			match target {
				Some(target) => ed.controller.on_connect(&mut ed.store, &connect.source, &target),
				None => debug!("connection from {} dropped on empty space", connect.source),
			}
		}
		ed.canvas.release();
	};

	let (editor_ml, refresh) = (editor.clone(), refresh_tooltip);
	let on_mouseleave = move |_: MouseEvent| {
		let mut guard = editor_ml.borrow_mut();
		guard.canvas.release();
		guard.set_hovered(None);
		refresh(&guard);
	};

	let (editor_dc, refresh) = (editor.clone(), refresh_tooltip);
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = editor_dc.borrow_mut();
		let ed = &mut *guard;
		if let Some(id) = ed.canvas.node_at_position(ed.store.nodes(), x, y).map(|n| n.id.clone()) {
			ed.controller.on_node_double_click(&mut ed.store, &id);
		}
		refresh(ed);
	};

	let (editor_wh, refresh) = (editor.clone(), refresh_tooltip);
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = editor_wh.borrow_mut();
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		guard.canvas.zoom_at(x, y, factor);
		refresh(&guard);
	};

	let (editor_kd, refresh) = (editor.clone(), refresh_tooltip);
	let on_keydown = move |ev: KeyboardEvent| {
		if !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		ev.prevent_default();
		let mut guard = editor_kd.borrow_mut();
		let ed = &mut *guard;
		let selection = ed.canvas.take_selection();
		ed.controller.on_delete(&mut ed.store, &selection);
		refresh(ed);
	};

	let on_dragover = move |ev: DragEvent| {
		ev.prevent_default();
		if let Some(dt) = ev.data_transfer() {
			dt.set_drop_effect("move");
		}
	};

	let editor_dr = editor.clone();
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let payload = ev
			.data_transfer()
			.and_then(|dt| dt.get_data(DRAG_MIME).ok())
			.unwrap_or_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = editor_dr.borrow_mut();
		let ed = &mut *guard;
		let position = ed.canvas.screen_to_graph(x, y);
		ed.controller.on_drop_payload(&mut ed.store, position, &payload);
	};

	let editor_dl = editor.clone();
	let on_download = move |_: MouseEvent| {
		let guard = editor_dl.borrow();
		if let Err(err) = export::export_image(guard.store.nodes(), guard.store.edges(), &export_config) {
			error!("image export failed: {err}");
		}
	};

	let label_inputs = NodeKind::ALL
		.into_iter()
		.map(|kind| {
			let editor = editor.clone();
			view! {
				<label>{format!("{} Label:", kind.title())}</label>
				<input
					type="text"
					class="controls-input"
					placeholder=format!("Enter {} Label", kind.title())
					on:input=move |ev| {
						editor.borrow_mut().controller.set_label(kind, event_target_value(&ev));
					}
				/>
			}
		})
		.collect_view();

	let editor_bg = editor.clone();

	let editor_vp = editor.clone();
	let on_viewport = move |action: ViewportAction| {
		let mut guard = editor_vp.borrow_mut();
		guard.apply_viewport(action);
		refresh_tooltip(&guard);
	};

	let layout_button = |direction: LayoutDirection, text: &'static str| {
		let (editor, config) = (editor.clone(), layout_config.clone());
		view! {
			<button
				class="layout-button"
				on:click=move |_| {
					let mut guard = editor.borrow_mut();
					guard.apply_layout(direction, &config);
					refresh_tooltip(&guard);
				}
			>
				{text}
			</button>
		}
	};

	view! {
		<div class="flowchart">
			<div class="flowchart-main">
				<div class="flowchart-canvas">
					<canvas
						node_ref=canvas_ref
						tabindex="0"
						on:mousedown=on_mousedown
						on:mousemove=on_mousemove
						on:mouseup=on_mouseup
						on:mouseleave=on_mouseleave
						on:dblclick=on_dblclick
						on:wheel=on_wheel
						on:keydown=on_keydown
						on:dragover=on_dragover
						on:drop=on_drop
						style="display: block; cursor: grab;"
					/>
					<Controls on_action=on_viewport />
					<button class="download-button" on:click=on_download>
						"Download Image"
					</button>
					{move || {
						tooltip
							.get()
							.map(|Tooltip { label, left, top, stats }| {
								view! {
									<div class="tooltip" style=format!("left: {left}px; top: {top}px;")>
										<div class="tooltip-label">{label}</div>
										<div>"Views: " {stats.views}</div>
										<div>"Clicks: " {stats.clicks}</div>
										<div>"Conversions: " {stats.conversions}</div>
									</div>
								}
							})
					}}
				</div>
				<Sidebar />
			</div>
			<div class="controls">
				{label_inputs}
				<label>"Background:"</label>
				<input
					class="controls-input"
					placeholder="Specify node color"
					prop:value=move || node_bg.get()
					style=move || format!("background-color: {}", node_bg.get())
					on:input=move |ev| {
						let value = event_target_value(&ev);
						node_bg.set(value.clone());
						let mut guard = editor_bg.borrow_mut();
						let ed = &mut *guard;
						ed.controller.set_background(&mut ed.store, value);
						refresh_tooltip(ed);
					}
				/>
				<div class="layout-buttons">
					{layout_button(LayoutDirection::TopToBottom, "Vertical Layout")}
					{layout_button(LayoutDirection::LeftToRight, "Horizontal Layout")}
				</div>
			</div>
		</div>
	}
}

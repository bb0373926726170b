use leptos::prelude::*;
use log::debug;
use web_sys::DragEvent;

use super::flow_chart::{DRAG_MIME, NodeKind};

const INSTRUCTIONS: [&str; 4] = [
	"Type a label into the field for a node's kind, then double-click the node to apply it.",
	"Drag from a node's bottom handle onto another node to connect them.",
	"Select a node or edge and press Delete or Backspace to remove it.",
	"Type a color name into the background field, then hover a node to paint it.",
];

/// Palette of draggable node templates plus usage notes.
#[component]
pub fn Sidebar() -> impl IntoView {
	let templates = NodeKind::ALL
		.into_iter()
		.map(|kind| {
			let on_dragstart = move |ev: DragEvent| {
				let Some(dt) = ev.data_transfer() else {
					return;
				};
				if dt.set_data(DRAG_MIME, kind.as_str()).is_ok() {
					dt.set_effect_allowed("move");
					debug!("dragging {kind} template");
				}
			};
			view! {
				<div class=format!("palette-node palette-node-{}", kind.as_str()) draggable="true" on:dragstart=on_dragstart>
					{kind.title()}
				</div>
			}
		})
		.collect_view();

	view! {
		<aside class="sidebar">
			<div class="sidebar-title">"Drag Nodes From Here"</div>
			{templates}
			<div class="instructions">
				<h2>"Instructions:"</h2>
				<ol>
					{INSTRUCTIONS.into_iter().map(|line| view! { <li>{line}</li> }).collect_view()}
				</ol>
			</div>
		</aside>
	}
}

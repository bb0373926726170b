use leptos::prelude::*;
use log::debug;

/// Viewport change requested from the zoom controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportAction {
	ZoomIn,
	ZoomOut,
	FitView,
}

impl ViewportAction {
	fn title(self) -> &'static str {
		match self {
			ViewportAction::ZoomIn => "zoom in",
			ViewportAction::ZoomOut => "zoom out",
			ViewportAction::FitView => "fit view",
		}
	}

	fn glyph(self) -> &'static str {
		match self {
			ViewportAction::ZoomIn => "+",
			ViewportAction::ZoomOut => "-",
			ViewportAction::FitView => "[ ]",
		}
	}
}

/// Zoom in, zoom out and fit-view buttons overlaid on the canvas.
#[component]
pub fn Controls(on_action: impl Fn(ViewportAction) + Clone + 'static) -> impl IntoView {
	let buttons = [ViewportAction::ZoomIn, ViewportAction::ZoomOut, ViewportAction::FitView]
		.into_iter()
		.map(|action| {
			let on_action = on_action.clone();
			view! {
				<button
					class="viewport-button"
					title=action.title()
					on:click=move |_| {
						debug!("viewport {}", action.title());
						on_action(action);
					}
				>
					{action.glyph()}
				</button>
			}
		})
		.collect_view();

	view! { <div class="viewport-controls">{buttons}</div> }
}

mod component;
mod controller;
mod export;
mod geometry;
mod layout;
mod render;
mod state;
mod store;
mod types;

pub use component::FlowChart;
pub use types::{DRAG_MIME, NodeKind};

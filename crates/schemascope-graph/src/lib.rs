pub mod builder;
pub mod graph;
pub mod link_router;
pub mod overlay;
pub mod query;
pub mod style;

pub use builder::GraphBuilder;
pub use graph::SchemaGraph;
pub use link_router::{CubicBezier, LinkDirection, LinkRouter, Rect, Vec2};
pub use overlay::{LayoutProvider, Link, LinkOverlay, LinkPatch, PanelSlot, VisibleItem};
pub use query::{Direction, EdgeInfo, ItemInfo, QueryService};
pub use style::{
    Color, arrow_marker_id, edge_kind_label, edge_stroke_width, gradient_id, kind_color,
    kind_label, section_label,
};

//! The only consumer-facing read interface over the graph.
//!
//! Enriches raw items and edges with the display metadata the panels,
//! floating boxes, and link overlay need, and owns the panel-mode policy
//! that decides which edge kinds drive link rendering.

use crate::style::{kind_color, kind_label, section_label, Color};
use crate::SchemaGraph;
use schemascope_core::{Edge, EdgeKind, Item, ItemId, ItemKind};

/// An item plus the display metadata UI surfaces render with.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub kind_label: &'static str,
    pub section_label: &'static str,
    pub color: Color,
    pub is_abstract: bool,
    pub description: Option<String>,
}

impl ItemInfo {
    fn from_item(item: &Item) -> Self {
        let kind = item.kind();
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            kind,
            kind_label: kind_label(kind),
            section_label: section_label(kind),
            color: kind_color(kind),
            is_abstract: item.is_abstract(),
            description: item.description().map(str::to_string),
        }
    }
}

/// Orientation of an edge relative to the queried item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    SelfLoop,
}

/// An edge annotated with both endpoints' display info.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    pub edge: Edge,
    pub source: ItemInfo,
    pub target: ItemInfo,
    pub direction: Direction,
}

/// Pure reads over the immutable graph. Unknown ids return `None` or an
/// empty list, never an error; hover previews race against filtering and
/// must tolerate items that are no longer in view.
#[derive(Debug, Clone, Copy)]
pub struct QueryService<'g> {
    graph: &'g SchemaGraph,
}

impl<'g> QueryService<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g SchemaGraph {
        self.graph
    }

    pub fn item_info(&self, id: &ItemId) -> Option<ItemInfo> {
        self.graph.item(id).map(ItemInfo::from_item)
    }

    /// All edges of the given kinds touching `id`, annotated with both
    /// endpoints.
    pub fn edges_for_item(&self, id: &ItemId, kinds: &[EdgeKind]) -> Vec<EdgeInfo> {
        self.graph
            .edges_touching(id, kinds)
            .into_iter()
            .filter_map(|edge| {
                let source = self.item_info(&edge.source)?;
                let target = self.item_info(&edge.target)?;
                let direction = if edge.is_self_reference() {
                    Direction::SelfLoop
                } else if &edge.source == id {
                    Direction::Outgoing
                } else {
                    Direction::Incoming
                };
                Some(EdgeInfo {
                    edge: edge.clone(),
                    source,
                    target,
                    direction,
                })
            })
            .collect()
    }

    /// `(incoming, outgoing)` edge counts for the relationship badge. A
    /// self-loop counts once on each side.
    pub fn edge_counts(&self, id: &ItemId, kinds: &[EdgeKind]) -> (usize, usize) {
        let mut incoming = 0;
        let mut outgoing = 0;
        for info in self.edges_for_item(id, kinds) {
            match info.direction {
                Direction::Outgoing => outgoing += 1,
                Direction::Incoming => incoming += 1,
                Direction::SelfLoop => {
                    incoming += 1;
                    outgoing += 1;
                }
            }
        }
        (incoming, outgoing)
    }

    /// The single policy point deciding one-hop vs two-hop link rendering:
    /// direct class -> range links while the middle (slot) panel is hidden,
    /// class -> slot -> range hops when it is visible.
    pub fn edge_kinds_for_links(middle_panel_visible: bool) -> Vec<EdgeKind> {
        if middle_panel_visible {
            vec![EdgeKind::ClassSlot, EdgeKind::SlotRange]
        } else {
            vec![EdgeKind::ClassRange]
        }
    }
}

//! The link overlay: projects graph edges onto the current panel layout.
//!
//! Two phases with different triggers. `rebuild` runs on structural change
//! (panel membership, expand/collapse, initial mount) and decides *which*
//! links exist. `reposition` runs on every scroll/resize frame and only
//! recomputes path data and styling from live element rects, so the caller
//! can patch SVG attributes directly without a full re-render.

use crate::link_router::{LinkDirection, LinkRouter, Rect};
use crate::query::{Direction, QueryService};
use crate::style::{arrow_marker_id, edge_stroke_width, gradient_id, LINK_HOVER_OPACITY, LINK_IDLE_OPACITY};
use schemascope_core::{Edge, ItemId, ItemKind};
use std::collections::{HashMap, HashSet};

/// Boundary interface to the rendered layout. Production backs this with
/// `getBoundingClientRect` lookups; tests use synthetic rectangles.
pub trait LayoutProvider {
    fn rect_of(&self, anchor_id: &str) -> Option<Rect>;
}

impl LayoutProvider for HashMap<String, Rect> {
    fn rect_of(&self, anchor_id: &str) -> Option<Rect> {
        self.get(anchor_id).copied()
    }
}

/// The three explorer panels, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSlot {
    Left,
    Middle,
    Right,
}

impl PanelSlot {
    /// One-based visual position. With the middle panel hidden the right
    /// panel moves up to position 2, directly adjacent to the left one.
    fn position(self, middle_visible: bool) -> u8 {
        match self {
            PanelSlot::Left => 1,
            PanelSlot::Middle => 2,
            PanelSlot::Right => {
                if middle_visible {
                    3
                } else {
                    2
                }
            }
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            PanelSlot::Left => "left",
            PanelSlot::Middle => "middle",
            PanelSlot::Right => "right",
        }
    }
}

/// An item currently rendered in a panel, identified by the stable
/// panel-contextualized anchor id carried on its element.
#[derive(Debug, Clone)]
pub struct VisibleItem {
    pub id: ItemId,
    pub panel: PanelSlot,
    pub anchor_id: String,
}

impl VisibleItem {
    pub fn new(id: ItemId, panel: PanelSlot) -> Self {
        let anchor_id = format!("{}-{}", panel.prefix(), id);
        Self {
            id,
            panel,
            anchor_id,
        }
    }
}

/// One edge projected onto a pair of panel anchors. Stored between
/// rebuilds; geometry is derived from it every reposition frame.
#[derive(Debug, Clone)]
pub struct Link {
    /// Value for the path element's `data-link-id` attribute.
    pub link_id: String,
    pub source_anchor: String,
    pub target_anchor: String,
    pub edge: Edge,
    pub source_kind: ItemKind,
    pub target_kind: ItemKind,
    pub self_reference: bool,
}

/// Per-frame output of the reposition phase, applied straight to the SVG
/// path element outside the render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPatch {
    pub link_id: String,
    pub d: String,
    pub gradient_id: String,
    pub marker_id: String,
    pub stroke_width: f32,
    pub opacity: f32,
}

#[derive(Debug, Default)]
pub struct LinkOverlay {
    router: LinkRouter,
    links: Vec<Link>,
    hovered: Option<ItemId>,
}

impl LinkOverlay {
    pub fn new() -> Self {
        Self {
            router: LinkRouter::new(),
            links: Vec::new(),
            hovered: None,
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn set_hovered_item(&mut self, item: Option<ItemId>) {
        self.hovered = item;
    }

    /// Build phase. Keeps edges whose endpoints are both visible in
    /// adjacent panels, plus self-references (drawn as loops). Links are
    /// deduplicated by undirected item pair, so a logical edge renders
    /// once even when its endpoints repeat across panels (self-loops stay
    /// per anchor); class-to-class links are not emitted from the right
    /// side of a panel pair, which would render the mirror image of a link
    /// the left side already owns.
    pub fn rebuild(
        &mut self,
        visible: &[VisibleItem],
        query: &QueryService<'_>,
        middle_panel_visible: bool,
    ) {
        let kinds = QueryService::edge_kinds_for_links(middle_panel_visible);
        let mut by_id: HashMap<&ItemId, Vec<&VisibleItem>> = HashMap::new();
        for item in visible {
            by_id.entry(&item.id).or_default().push(item);
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut links = Vec::new();

        for source in visible {
            for info in query.edges_for_item(&source.id, &kinds) {
                if info.direction == Direction::Incoming {
                    continue; // picked up from the source item's side
                }

                if info.direction == Direction::SelfLoop {
                    let key = (source.anchor_id.clone(), source.anchor_id.clone());
                    if seen.insert(key) {
                        links.push(Link {
                            link_id: format!("{}--loop", source.anchor_id),
                            source_anchor: source.anchor_id.clone(),
                            target_anchor: source.anchor_id.clone(),
                            edge: info.edge.clone(),
                            source_kind: info.source.kind,
                            target_kind: info.target.kind,
                            self_reference: true,
                        });
                    }
                    continue;
                }

                // Adjacent panels only, in either orientation. A target one
                // step to the left yields a visually reversed link; the
                // router and gradient selection handle that at reposition.
                let source_pos = source.panel.position(middle_panel_visible);
                let Some(target) = by_id.get(&info.edge.target).and_then(|candidates| {
                    candidates
                        .iter()
                        .find(|t| t.panel.position(middle_panel_visible) == source_pos + 1)
                        .or_else(|| {
                            candidates
                                .iter()
                                .find(|t| t.panel.position(middle_panel_visible) + 1 == source_pos)
                        })
                }) else {
                    continue;
                };

                // A class shown on the right links back to left-panel
                // classes through the same gap the left panel already drew
                // into; dropping the right-side copy avoids the mirrored
                // duplicate. Other kinds cannot mirror (their targets never
                // share a panel with classes on both sides).
                if info.source.kind == ItemKind::Class
                    && info.target.kind == ItemKind::Class
                    && target.panel.position(middle_panel_visible) < source_pos
                {
                    continue;
                }

                let key = undirected_key(source.id.as_str(), info.edge.target.as_str());
                if !seen.insert(key) {
                    continue;
                }
                links.push(Link {
                    link_id: format!("{}--{}", source.anchor_id, target.anchor_id),
                    source_anchor: source.anchor_id.clone(),
                    target_anchor: target.anchor_id.clone(),
                    edge: info.edge.clone(),
                    source_kind: info.source.kind,
                    target_kind: info.target.kind,
                    self_reference: false,
                });
            }
        }

        tracing::debug!(links = links.len(), "link overlay rebuilt");
        self.links = links;
    }

    /// Reposition phase. A link whose element is not currently mounted is
    /// skipped for this frame, not an error; the next structural rebuild
    /// re-evaluates it.
    pub fn reposition(&self, provider: &dyn LayoutProvider) -> Vec<LinkPatch> {
        let mut patches = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let hovered = self
                .hovered
                .as_ref()
                .is_some_and(|id| *id == link.edge.source || *id == link.edge.target);

            let (d, reversed) = if link.self_reference {
                let Some(rect) = provider.rect_of(&link.source_anchor) else {
                    continue;
                };
                (self.router.loop_path(rect), false)
            } else {
                let Some(source_rect) = provider.rect_of(&link.source_anchor) else {
                    continue;
                };
                let Some(target_rect) = provider.rect_of(&link.target_anchor) else {
                    continue;
                };
                let curve = self.router.route(source_rect, target_rect);
                let reversed =
                    self.router.direction(source_rect, target_rect) == LinkDirection::RightToLeft;
                (curve.to_svg_path(), reversed)
            };

            patches.push(LinkPatch {
                link_id: link.link_id.clone(),
                d,
                gradient_id: gradient_id(link.source_kind, link.target_kind, reversed),
                marker_id: arrow_marker_id(Some(link.target_kind), hovered),
                stroke_width: edge_stroke_width(link.edge.kind, hovered),
                opacity: if hovered {
                    LINK_HOVER_OPACITY
                } else {
                    LINK_IDLE_OPACITY
                },
            });
        }
        patches
    }
}

fn undirected_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

//! Hover tooltip for relationship links.

use crate::clock::Clock;
use schemascope_graph::{EdgeInfo, Vec2, edge_kind_label};

pub const TOOLTIP_DELAY_MS: u64 = 300;

/// What the tooltip renders: the relationship kind plus both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub relationship: &'static str,
    pub label: Option<String>,
    pub source_name: String,
    pub source_kind: &'static str,
    pub target_name: String,
    pub target_kind: &'static str,
}

impl TooltipContent {
    pub fn from_edge(info: &EdgeInfo) -> Self {
        Self {
            relationship: edge_kind_label(info.edge.kind),
            label: info.edge.label.clone(),
            source_name: info.source.name.clone(),
            source_kind: info.source.kind_label,
            target_name: info.target.name.clone(),
            target_kind: info.target.kind_label,
        }
    }
}

/// Delayed show / immediate hide tooltip state for link paths.
#[derive(Debug)]
pub struct LinkTooltip<C: Clock> {
    clock: C,
    delay_ms: u64,
    pending: Option<(TooltipContent, Vec2, u64)>,
    visible: Option<(TooltipContent, Vec2)>,
}

impl<C: Clock> LinkTooltip<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            delay_ms: TOOLTIP_DELAY_MS,
            pending: None,
            visible: None,
        }
    }

    /// Arm the tooltip for a hovered link; supersedes any pending one.
    pub fn show(&mut self, content: TooltipContent, position: Vec2) {
        let deadline = self.clock.now_ms() + self.delay_ms;
        self.pending = Some((content, position, deadline));
    }

    /// Dismiss immediately and cancel any pending show.
    pub fn hide(&mut self) {
        self.pending = None;
        self.visible = None;
    }

    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        if self.pending.as_ref().is_some_and(|(_, _, d)| *d <= now) {
            if let Some((content, position, _)) = self.pending.take() {
                self.visible = Some((content, position));
            }
        }
    }

    pub fn visible(&self) -> Option<(&TooltipContent, Vec2)> {
        self.visible.as_ref().map(|(c, p)| (c, *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    fn content() -> TooltipContent {
        TooltipContent {
            relationship: "has attribute",
            label: Some("specimen_type".to_string()),
            source_name: "Specimen".to_string(),
            source_kind: "class",
            target_name: "SpecimenTypeEnum".to_string(),
            target_kind: "enum",
        }
    }

    #[test]
    fn shows_only_after_the_delay() {
        let clock = VirtualClock::new();
        let mut tooltip = LinkTooltip::new(clock.clone());

        tooltip.show(content(), Vec2::new(10.0, 20.0));
        tooltip.tick();
        assert!(tooltip.visible().is_none());

        clock.advance(TOOLTIP_DELAY_MS);
        tooltip.tick();
        let (shown, position) = tooltip.visible().expect("tooltip after delay");
        assert_eq!(shown.relationship, "has attribute");
        assert_eq!(position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn leave_cancels_a_pending_show() {
        let clock = VirtualClock::new();
        let mut tooltip = LinkTooltip::new(clock.clone());

        tooltip.show(content(), Vec2::new(0.0, 0.0));
        tooltip.hide();
        clock.advance(1000);
        tooltip.tick();
        assert!(tooltip.visible().is_none());
    }
}

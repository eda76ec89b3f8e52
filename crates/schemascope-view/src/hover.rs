//! Hover state machine driving transitory previews and persistent boxes.
//!
//! All timing goes through explicit deadline records compared against the
//! injected [`Clock`] in `tick`; the controller never sleeps. Every hover
//! event cancels the timers it supersedes before arming new ones, so a
//! stale timer can never resurrect a box that was replaced or closed.

use crate::boxes::{BoxId, BoxStore, ContentType};
use crate::clock::Clock;
use schemascope_core::ItemId;
use schemascope_graph::Vec2;

/// Which part of an item row the pointer is over. Each zone previews a
/// different content type but shares the same timer mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverZone {
    Name,
    Badge,
}

impl HoverZone {
    pub fn content_type(self) -> ContentType {
        match self {
            HoverZone::Name => ContentType::Detail,
            HoverZone::Badge => ContentType::Relationship,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverConfig {
    /// Hover dwell before a transitory box appears.
    pub show_debounce_ms: u64,
    /// How long a transitory box outlives the pointer leaving it.
    pub linger_ms: u64,
    /// Dwell on the box itself before it self-promotes to persistent.
    pub upgrade_ms: u64,
    /// Delay before pulsing an already-open persistent box.
    pub highlight_delay_ms: u64,
    /// Window after a scroll event during which no new preview appears.
    pub scroll_settle_ms: u64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            show_debounce_ms: 300,
            linger_ms: 1500,
            upgrade_ms: 1500,
            highlight_delay_ms: 300,
            scroll_settle_ms: 150,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingShow {
    item: ItemId,
    zone: HoverZone,
    deadline: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingHighlight {
    box_id: BoxId,
    deadline: u64,
}

#[derive(Debug)]
pub struct HoverController<C: Clock> {
    clock: C,
    config: HoverConfig,
    boxes: BoxStore,
    pending_show: Option<PendingShow>,
    pending_highlight: Option<PendingHighlight>,
    linger_deadline: Option<u64>,
    upgrade_deadline: Option<u64>,
    scroll_settle_until: Option<u64>,
    highlighted: Option<BoxId>,
    hovered_item: Option<ItemId>,
}

impl<C: Clock> HoverController<C> {
    pub fn new(clock: C, viewport: Vec2) -> Self {
        Self::with_config(clock, viewport, HoverConfig::default())
    }

    pub fn with_config(clock: C, viewport: Vec2, config: HoverConfig) -> Self {
        Self {
            clock,
            config,
            boxes: BoxStore::new(viewport),
            pending_show: None,
            pending_highlight: None,
            linger_deadline: None,
            upgrade_deadline: None,
            scroll_settle_until: None,
            highlighted: None,
            hovered_item: None,
        }
    }

    pub fn boxes(&self) -> &BoxStore {
        &self.boxes
    }

    pub fn boxes_mut(&mut self) -> &mut BoxStore {
        &mut self.boxes
    }

    /// Item currently under the pointer, for link-overlay hover styling.
    pub fn hovered_item(&self) -> Option<&ItemId> {
        self.hovered_item.as_ref()
    }

    /// Persistent box currently pulsing instead of a suppressed preview.
    pub fn highlighted_box(&self) -> Option<BoxId> {
        self.highlighted
    }

    pub fn pointer_entered_item(&mut self, item: ItemId, zone: HoverZone) {
        let now = self.clock.now_ms();
        self.pending_show = None;
        self.pending_highlight = None;
        self.highlighted = None;
        self.hovered_item = Some(item.clone());

        if self.scroll_suppressed(now) {
            return;
        }
        if let Some(box_id) = self.boxes.find_persistent(&item, zone.content_type()) {
            self.pending_highlight = Some(PendingHighlight {
                box_id,
                deadline: now + self.config.highlight_delay_ms,
            });
        } else {
            self.pending_show = Some(PendingShow {
                item,
                zone,
                deadline: now + self.config.show_debounce_ms,
            });
        }
    }

    pub fn pointer_left_item(&mut self) {
        self.pending_show = None;
        self.pending_highlight = None;
        self.highlighted = None;
        self.hovered_item = None;

        // The pointer may be heading for the box; linger until it lands
        // there or the timer fires.
        if self.boxes.transitory().is_some() && self.upgrade_deadline.is_none() {
            self.linger_deadline = Some(self.clock.now_ms() + self.config.linger_ms);
        }
    }

    pub fn pointer_entered_box(&mut self, id: BoxId) {
        if self.boxes.transitory().is_some_and(|t| t.id == id) {
            self.linger_deadline = None;
            self.upgrade_deadline = Some(self.clock.now_ms() + self.config.upgrade_ms);
        }
    }

    pub fn pointer_left_box(&mut self, id: BoxId) {
        if self.boxes.transitory().is_some_and(|t| t.id == id) {
            self.upgrade_deadline = None;
            self.linger_deadline = Some(self.clock.now_ms() + self.config.linger_ms);
        }
    }

    /// Click on an item row: open (or refresh) the persistent box right
    /// away, consuming a matching transitory preview instead of leaving it
    /// behind.
    pub fn clicked_item(&mut self, item: ItemId, zone: HoverZone) -> BoxId {
        self.pending_show = None;
        self.pending_highlight = None;
        self.highlighted = None;

        let content_type = zone.content_type();
        let matching_transitory = self
            .boxes
            .transitory()
            .filter(|t| t.item == item && t.content_type == content_type)
            .map(|t| t.id);
        if let Some(id) = matching_transitory {
            self.clear_transitory_timers();
            if let Some(promoted) = self.boxes.upgrade(id) {
                return promoted;
            }
        }
        self.boxes.open_persistent(item, content_type)
    }

    /// Click on a box: promote a transitory one, raise a persistent one.
    pub fn clicked_box(&mut self, id: BoxId) {
        if self.boxes.transitory().is_some_and(|t| t.id == id) {
            self.clear_transitory_timers();
            self.boxes.upgrade(id);
        } else {
            self.boxes.bring_to_front(id);
        }
    }

    pub fn scrolled(&mut self) {
        self.scroll_settle_until = Some(self.clock.now_ms() + self.config.scroll_settle_ms);
        self.pending_show = None;
    }

    pub fn escape_pressed(&mut self) -> Option<BoxId> {
        if self.boxes.transitory().is_some() {
            self.clear_transitory_timers();
        }
        self.boxes.escape()
    }

    /// Advance the state machine to the clock's current time, firing any
    /// due timers. Call once per event-loop turn.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();

        if self.scroll_settle_until.is_some_and(|until| until <= now) {
            self.scroll_settle_until = None;
        }

        if self.pending_show.as_ref().is_some_and(|p| p.deadline <= now) {
            if let Some(pending) = self.pending_show.take() {
                self.fire_show(pending, now);
            }
        }

        if self
            .pending_highlight
            .is_some_and(|p| p.deadline <= now)
        {
            if let Some(pending) = self.pending_highlight.take() {
                if self.boxes.box_by_id(pending.box_id).is_some() {
                    self.highlighted = Some(pending.box_id);
                }
            }
        }

        if self.upgrade_deadline.is_some_and(|d| d <= now) {
            self.upgrade_deadline = None;
            self.linger_deadline = None;
            if let Some(id) = self.boxes.transitory().map(|t| t.id) {
                tracing::debug!(%id, "transitory box promoted by dwell");
                self.boxes.upgrade(id);
            }
        }

        if self.linger_deadline.is_some_and(|d| d <= now) {
            self.linger_deadline = None;
            self.upgrade_deadline = None;
            self.boxes.close_transitory();
        }
    }

    fn fire_show(&mut self, pending: PendingShow, now: u64) {
        if self.scroll_suppressed(now) {
            return;
        }
        let content_type = pending.zone.content_type();
        // Re-check: a persistent box may have opened while the debounce ran.
        if let Some(box_id) = self.boxes.find_persistent(&pending.item, content_type) {
            self.pending_highlight = Some(PendingHighlight {
                box_id,
                deadline: now + self.config.highlight_delay_ms,
            });
            return;
        }
        self.clear_transitory_timers();
        self.boxes.open_transitory(pending.item, content_type);
    }

    fn scroll_suppressed(&self, now: u64) -> bool {
        self.scroll_settle_until.is_some_and(|until| until > now)
    }

    fn clear_transitory_timers(&mut self) {
        self.linger_deadline = None;
        self.upgrade_deadline = None;
    }
}

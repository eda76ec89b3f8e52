//! Floating preview/detail boxes and their groups.
//!
//! `BoxStore` is the single owner of all box state. The hover controller
//! mutates it through the transition methods here; nothing else writes to
//! it, so every rule (one transitory box system-wide, one persistent box
//! per item and content type, MRU ordering at the group tail) lives in one
//! place.

use schemascope_core::ItemId;
use schemascope_graph::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a box displays: the item's own detail view, or its relationships.
/// Serialized into the shell's open-dialog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Detail,
    Relationship,
}

impl ContentType {
    pub fn group_title(self) -> &'static str {
        match self {
            ContentType::Detail => "Details",
            ContentType::Relationship => "Relationships",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxMode {
    /// Hover preview; at most one exists across the whole view.
    Transitory,
    /// Pinned into a group until explicitly closed.
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FloatingBox {
    pub id: BoxId,
    pub item: ItemId,
    pub content_type: ContentType,
    pub mode: BoxMode,
    pub collapsed: bool,
    /// Set once the user drags or resizes the box out of the group flow.
    pub user_rect: Option<Rect>,
    /// Content height the box would take unconstrained.
    pub natural_height: f32,
}

/// All persistent boxes of one content type. Box order is interaction
/// order; the most recently used box sits at the tail and drives z-index
/// and ESC-close order.
#[derive(Debug, Clone)]
pub struct FloatingBoxGroup {
    pub content_type: ContentType,
    pub rect: Rect,
    pub boxes: Vec<FloatingBox>,
}

// Default group placement as fractions of the viewport.
const GROUP_WIDTH_FRAC: f32 = 0.28;
const GROUP_HEIGHT_FRAC: f32 = 0.72;
const GROUP_TOP_FRAC: f32 = 0.12;
const DETAIL_LEFT_FRAC: f32 = 0.68;
const RELATIONSHIP_LEFT_FRAC: f32 = 0.38;

pub const BOX_HEIGHT_FLOOR: f32 = 64.0;
pub const DEFAULT_NATURAL_HEIGHT: f32 = 160.0;

fn default_group_rect(content_type: ContentType, viewport: Vec2) -> Rect {
    let left = match content_type {
        ContentType::Detail => DETAIL_LEFT_FRAC,
        ContentType::Relationship => RELATIONSHIP_LEFT_FRAC,
    };
    Rect::from_pos_size(
        Vec2::new(viewport.x * left, viewport.y * GROUP_TOP_FRAC),
        Vec2::new(viewport.x * GROUP_WIDTH_FRAC, viewport.y * GROUP_HEIGHT_FRAC),
    )
}

/// Split `available` vertical space among expanded boxes. Two passes:
/// boxes whose natural height fits under an equal share keep their natural
/// height, then the remaining space is split evenly among the rest, with a
/// floor per box.
pub fn distribute_heights(natural: &[f32], available: f32, floor: f32) -> Vec<f32> {
    if natural.is_empty() {
        return Vec::new();
    }
    let share = available / natural.len() as f32;
    let mut heights = vec![0.0f32; natural.len()];
    let mut remaining = available;
    let mut oversized = Vec::new();

    for (i, &height) in natural.iter().enumerate() {
        if height <= share {
            heights[i] = height;
            remaining -= height;
        } else {
            oversized.push(i);
        }
    }
    if !oversized.is_empty() {
        let each = (remaining / oversized.len() as f32).max(floor);
        for i in oversized {
            heights[i] = each;
        }
    }
    heights
}

#[derive(Debug)]
pub struct BoxStore {
    next_id: u64,
    viewport: Vec2,
    transitory: Option<FloatingBox>,
    groups: Vec<FloatingBoxGroup>,
    /// Content type of the most recently interacted group, for ESC order.
    last_group: Option<ContentType>,
}

impl BoxStore {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            next_id: 0,
            viewport,
            transitory: None,
            groups: Vec::new(),
            last_group: None,
        }
    }

    fn alloc_id(&mut self) -> BoxId {
        self.next_id += 1;
        BoxId(self.next_id)
    }

    pub fn transitory(&self) -> Option<&FloatingBox> {
        self.transitory.as_ref()
    }

    pub fn groups(&self) -> &[FloatingBoxGroup] {
        &self.groups
    }

    pub fn group(&self, content_type: ContentType) -> Option<&FloatingBoxGroup> {
        self.groups.iter().find(|g| g.content_type == content_type)
    }

    fn group_mut(&mut self, content_type: ContentType) -> Option<&mut FloatingBoxGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.content_type == content_type)
    }

    pub fn find_persistent(&self, item: &ItemId, content_type: ContentType) -> Option<BoxId> {
        self.group(content_type)?
            .boxes
            .iter()
            .find(|b| &b.item == item)
            .map(|b| b.id)
    }

    pub fn box_by_id(&self, id: BoxId) -> Option<&FloatingBox> {
        if let Some(t) = &self.transitory {
            if t.id == id {
                return Some(t);
            }
        }
        self.groups
            .iter()
            .flat_map(|g| g.boxes.iter())
            .find(|b| b.id == id)
    }

    /// Show a hover preview, replacing any current one instantly.
    pub fn open_transitory(&mut self, item: ItemId, content_type: ContentType) -> BoxId {
        let id = self.alloc_id();
        self.transitory = Some(FloatingBox {
            id,
            item,
            content_type,
            mode: BoxMode::Transitory,
            collapsed: false,
            user_rect: None,
            natural_height: DEFAULT_NATURAL_HEIGHT,
        });
        id
    }

    pub fn close_transitory(&mut self) -> Option<BoxId> {
        self.transitory.take().map(|b| b.id)
    }

    /// Pin a box for `(item, content_type)`. Reuses the existing box if one
    /// is open (no duplicate), expands it, collapses the rest, and moves it
    /// to the MRU tail; otherwise appends a fresh box, creating the group
    /// on first use.
    pub fn open_persistent(&mut self, item: ItemId, content_type: ContentType) -> BoxId {
        self.last_group = Some(content_type);

        if let Some(group) = self.group_mut(content_type) {
            if let Some(index) = group.boxes.iter().position(|b| b.item == item) {
                let mut reopened = group.boxes.remove(index);
                for b in &mut group.boxes {
                    b.collapsed = true;
                }
                reopened.collapsed = false;
                let id = reopened.id;
                group.boxes.push(reopened);
                return id;
            }
        }

        let id = self.alloc_id();
        let fresh = FloatingBox {
            id,
            item,
            content_type,
            mode: BoxMode::Persistent,
            collapsed: false,
            user_rect: None,
            natural_height: DEFAULT_NATURAL_HEIGHT,
        };
        self.append_to_group(fresh);
        id
    }

    fn append_to_group(&mut self, fresh: FloatingBox) {
        let content_type = fresh.content_type;
        if self.group(content_type).is_none() {
            self.groups.push(FloatingBoxGroup {
                content_type,
                rect: default_group_rect(content_type, self.viewport),
                boxes: Vec::new(),
            });
        }
        if let Some(group) = self.group_mut(content_type) {
            for b in &mut group.boxes {
                b.collapsed = true;
            }
            group.boxes.push(fresh);
        }
    }

    /// Promote a box to persistent. Promoting an already-persistent box is
    /// a no-op; the returned id is the surviving box (an existing
    /// persistent box for the same item and content type wins over the
    /// promoted transitory one).
    pub fn upgrade(&mut self, id: BoxId) -> Option<BoxId> {
        if let Some(mut promoted) = self.transitory.take_if(|t| t.id == id) {
            self.last_group = Some(promoted.content_type);
            if self
                .find_persistent(&promoted.item, promoted.content_type)
                .is_some()
            {
                return Some(self.open_persistent(promoted.item, promoted.content_type));
            }
            promoted.mode = BoxMode::Persistent;
            promoted.collapsed = false;
            let id = promoted.id;
            self.append_to_group(promoted);
            return Some(id);
        }
        // Already persistent: idempotent, no reorder.
        self.groups
            .iter()
            .flat_map(|g| g.boxes.iter())
            .find(|b| b.id == id)
            .map(|b| b.id)
    }

    /// Close one box; closing an unknown id is a no-op. An emptied group is
    /// removed.
    pub fn close_box(&mut self, id: BoxId) {
        if self.transitory.as_ref().is_some_and(|t| t.id == id) {
            self.transitory = None;
            return;
        }
        for group in &mut self.groups {
            if let Some(index) = group.boxes.iter().position(|b| b.id == id) {
                group.boxes.remove(index);
                break;
            }
        }
        self.prune_empty_groups();
    }

    pub fn close_group(&mut self, content_type: ContentType) {
        self.groups.retain(|g| g.content_type != content_type);
        if self.last_group == Some(content_type) {
            self.last_group = None;
        }
    }

    pub fn collapse_all(&mut self, content_type: ContentType) {
        if let Some(group) = self.group_mut(content_type) {
            for b in &mut group.boxes {
                b.collapsed = true;
            }
        }
    }

    pub fn expand_all(&mut self, content_type: ContentType) {
        if let Some(group) = self.group_mut(content_type) {
            for b in &mut group.boxes {
                b.collapsed = false;
            }
        }
    }

    pub fn toggle_collapsed(&mut self, id: BoxId) {
        let found = self
            .groups
            .iter_mut()
            .flat_map(|g| g.boxes.iter_mut())
            .find(|b| b.id == id);
        if let Some(b) = found {
            b.collapsed = !b.collapsed;
        }
    }

    /// Move a box to its group's MRU tail.
    pub fn bring_to_front(&mut self, id: BoxId) {
        for group in &mut self.groups {
            if let Some(index) = group.boxes.iter().position(|b| b.id == id) {
                let content_type = group.content_type;
                let moved = group.boxes.remove(index);
                group.boxes.push(moved);
                self.last_group = Some(content_type);
                return;
            }
        }
    }

    pub fn move_group(&mut self, content_type: ContentType, pos: Vec2) {
        if let Some(group) = self.group_mut(content_type) {
            let size = Vec2::new(group.rect.width(), group.rect.height());
            group.rect = Rect::from_pos_size(pos, size);
        }
    }

    pub fn resize_group(&mut self, content_type: ContentType, size: Vec2) {
        if let Some(group) = self.group_mut(content_type) {
            group.rect = Rect::from_pos_size(group.rect.min, size);
        }
    }

    pub fn set_box_rect(&mut self, id: BoxId, rect: Rect) {
        let found = self
            .groups
            .iter_mut()
            .flat_map(|g| g.boxes.iter_mut())
            .find(|b| b.id == id);
        if let Some(b) = found {
            b.user_rect = Some(rect);
        }
    }

    /// ESC: close the transitory box if one exists, otherwise the MRU box
    /// of the most recently interacted group. Returns the closed id.
    pub fn escape(&mut self) -> Option<BoxId> {
        if let Some(id) = self.close_transitory() {
            return Some(id);
        }
        let content_type = self
            .last_group
            .filter(|ct| self.group(*ct).is_some())
            .or_else(|| self.groups.last().map(|g| g.content_type))?;
        let group = self.group_mut(content_type)?;
        let closed = group.boxes.pop().map(|b| b.id);
        self.prune_empty_groups();
        closed
    }

    fn prune_empty_groups(&mut self) {
        let last = self.last_group;
        self.groups.retain(|g| !g.boxes.is_empty());
        if let Some(ct) = last {
            if self.group(ct).is_none() {
                self.last_group = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BoxStore {
        BoxStore::new(Vec2::new(1600.0, 900.0))
    }

    #[test]
    fn reopening_a_persistent_box_reuses_and_moves_to_tail() {
        let mut store = store();
        let x = store.open_persistent(ItemId::from("X"), ContentType::Detail);
        let y = store.open_persistent(ItemId::from("Y"), ContentType::Detail);

        let again = store.open_persistent(ItemId::from("X"), ContentType::Detail);
        assert_eq!(again, x);

        let group = store.group(ContentType::Detail).unwrap();
        assert_eq!(group.boxes.len(), 2);
        let order: Vec<_> = group.boxes.iter().map(|b| b.id).collect();
        assert_eq!(order, vec![y, x]);
        assert!(group.boxes[0].collapsed);
        assert!(!group.boxes[1].collapsed);
    }

    #[test]
    fn opening_collapses_previous_boxes() {
        let mut store = store();
        store.open_persistent(ItemId::from("X"), ContentType::Detail);
        store.open_persistent(ItemId::from("Y"), ContentType::Detail);
        let group = store.group(ContentType::Detail).unwrap();
        assert!(group.boxes[0].collapsed);
        assert!(!group.boxes[1].collapsed);
    }

    #[test]
    fn content_types_get_separate_groups() {
        let mut store = store();
        store.open_persistent(ItemId::from("X"), ContentType::Detail);
        store.open_persistent(ItemId::from("X"), ContentType::Relationship);
        assert_eq!(store.groups().len(), 2);
        assert_ne!(
            store.group(ContentType::Detail).unwrap().rect,
            store.group(ContentType::Relationship).unwrap().rect
        );
    }

    #[test]
    fn upgrade_moves_the_transitory_box_keeping_its_id() {
        let mut store = store();
        let id = store.open_transitory(ItemId::from("X"), ContentType::Detail);
        let upgraded = store.upgrade(id).unwrap();
        assert_eq!(upgraded, id);
        assert!(store.transitory().is_none());
        let b = store.box_by_id(id).unwrap();
        assert_eq!(b.mode, BoxMode::Persistent);
    }

    #[test]
    fn upgrade_of_a_persistent_box_is_idempotent() {
        let mut store = store();
        let x = store.open_persistent(ItemId::from("X"), ContentType::Detail);
        let y = store.open_persistent(ItemId::from("Y"), ContentType::Detail);

        assert_eq!(store.upgrade(x), Some(x));
        let group = store.group(ContentType::Detail).unwrap();
        let order: Vec<_> = group.boxes.iter().map(|b| b.id).collect();
        assert_eq!(order, vec![x, y]); // no reorder
    }

    #[test]
    fn new_transitory_replaces_the_old_instantly() {
        let mut store = store();
        let a = store.open_transitory(ItemId::from("A"), ContentType::Detail);
        let b = store.open_transitory(ItemId::from("B"), ContentType::Relationship);
        assert_ne!(a, b);
        assert_eq!(store.transitory().unwrap().id, b);
    }

    #[test]
    fn escape_prefers_transitory_then_mru() {
        let mut store = store();
        let x = store.open_persistent(ItemId::from("X"), ContentType::Detail);
        let y = store.open_persistent(ItemId::from("Y"), ContentType::Detail);
        let t = store.open_transitory(ItemId::from("Z"), ContentType::Detail);

        assert_eq!(store.escape(), Some(t));
        assert_eq!(store.escape(), Some(y));
        assert_eq!(store.escape(), Some(x));
        assert!(store.groups().is_empty()); // emptied group removed
        assert_eq!(store.escape(), None);
    }

    #[test]
    fn close_box_removes_emptied_group() {
        let mut store = store();
        let x = store.open_persistent(ItemId::from("X"), ContentType::Detail);
        store.close_box(x);
        assert!(store.group(ContentType::Detail).is_none());
        store.close_box(x); // unknown id: no-op
    }

    #[test]
    fn heights_return_surplus_to_oversized_boxes() {
        // Equal share is 200; the first box only needs 100, so the other
        // two split the surplus evenly.
        let heights = distribute_heights(&[100.0, 500.0, 500.0], 600.0, 40.0);
        assert_eq!(heights, vec![100.0, 250.0, 250.0]);
    }

    #[test]
    fn heights_respect_the_floor() {
        let heights = distribute_heights(&[500.0, 500.0], 50.0, 40.0);
        assert_eq!(heights, vec![40.0, 40.0]);
    }

    #[test]
    fn heights_of_nothing_is_nothing() {
        assert!(distribute_heights(&[], 600.0, 40.0).is_empty());
    }
}

//! Color and styling tokens for schema items and relationship links.
//!
//! Five item kinds map to five semantic colors; everything unknown falls
//! back to gray. Link styling (gradient ids, arrow markers, stroke widths,
//! hover opacity) is derived from these tokens.

use schemascope_core::{EdgeKind, ItemKind};

/// RGBA color token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

// Classes (blue tones)
pub const COLOR_CLASS: Color = Color::rgb(80, 130, 180);
// Enums (teal tones)
pub const COLOR_ENUM: Color = Color::rgb(80, 150, 150);
// Slots (gold tones)
pub const COLOR_SLOT: Color = Color::rgb(200, 160, 80);
// Primitive types (gray tones)
pub const COLOR_TYPE: Color = Color::rgb(120, 120, 120);
// Variables (green tones)
pub const COLOR_VARIABLE: Color = Color::rgb(80, 140, 100);
// Fallback
pub const COLOR_DEFAULT: Color = Color::rgb(100, 100, 100);

/// Non-hovered links render nearly transparent so hovered ones stand out.
pub const LINK_IDLE_OPACITY: f32 = 0.2;
pub const LINK_HOVER_OPACITY: f32 = 1.0;

pub const STROKE_WIDTH_PROPERTY: f32 = 1.5;
pub const STROKE_WIDTH_INHERITANCE: f32 = 2.5;
pub const STROKE_WIDTH_HOVER_BONUS: f32 = 1.0;

pub fn kind_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Class => COLOR_CLASS,
        ItemKind::Enum => COLOR_ENUM,
        ItemKind::Slot => COLOR_SLOT,
        ItemKind::Type => COLOR_TYPE,
        ItemKind::Variable => COLOR_VARIABLE,
    }
}

/// Human-readable singular label for an item kind.
pub fn kind_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Class => "class",
        ItemKind::Enum => "enum",
        ItemKind::Slot => "slot",
        ItemKind::Type => "type",
        ItemKind::Variable => "variable",
    }
}

/// Pluralized section heading for an item kind.
pub fn section_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Class => "Classes",
        ItemKind::Enum => "Enums",
        ItemKind::Slot => "Slots",
        ItemKind::Type => "Types",
        ItemKind::Variable => "Variables",
    }
}

pub fn edge_kind_label(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Inheritance => "inherits from",
        EdgeKind::ClassRange => "has attribute",
        EdgeKind::ClassSlot => "has slot",
        EdgeKind::SlotRange => "has range",
        EdgeKind::MapsTo => "maps to",
    }
}

/// Inheritance edges render heavier than property/slot edges.
pub fn edge_stroke_width(kind: EdgeKind, hovered: bool) -> f32 {
    let base = match kind {
        EdgeKind::Inheritance => STROKE_WIDTH_INHERITANCE,
        _ => STROKE_WIDTH_PROPERTY,
    };
    if hovered {
        base + STROKE_WIDTH_HOVER_BONUS
    } else {
        base
    }
}

fn kind_token(kind: ItemKind) -> &'static str {
    kind_label(kind)
}

/// Id of the pre-built arrowhead marker for a link ending on `target_kind`.
/// Hovered variants are larger and fully opaque.
pub fn arrow_marker_id(target_kind: Option<ItemKind>, hovered: bool) -> String {
    let token = target_kind.map(kind_token).unwrap_or("default");
    if hovered {
        format!("arrow-{token}-hover")
    } else {
        format!("arrow-{token}")
    }
}

/// Id of the pre-built linear gradient for a source-kind to target-kind
/// link. `reversed` selects the right-to-left variant, used when the visual
/// order of the endpoints opposes the logical direction.
pub fn gradient_id(source_kind: ItemKind, target_kind: ItemKind, reversed: bool) -> String {
    let base = format!("grad-{}-{}", kind_token(source_kind), kind_token(target_kind));
    if reversed {
        format!("{base}-rev")
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item_kind_strategy() -> impl Strategy<Value = ItemKind> {
        prop_oneof![
            Just(ItemKind::Class),
            Just(ItemKind::Enum),
            Just(ItemKind::Slot),
            Just(ItemKind::Type),
            Just(ItemKind::Variable),
        ]
    }

    #[test]
    fn kind_colors_are_distinct() {
        let mut colors: Vec<_> = ItemKind::ALL.iter().map(|k| kind_color(*k)).collect();
        colors.dedup();
        assert_eq!(colors.len(), ItemKind::ALL.len());
    }

    #[test]
    fn inheritance_renders_heavier_than_properties() {
        assert!(
            edge_stroke_width(EdgeKind::Inheritance, false)
                > edge_stroke_width(EdgeKind::ClassRange, false)
        );
        assert!(
            edge_stroke_width(EdgeKind::ClassRange, true)
                > edge_stroke_width(EdgeKind::ClassRange, false)
        );
    }

    #[test]
    fn marker_ids_have_hover_variants() {
        assert_eq!(arrow_marker_id(Some(ItemKind::Class), false), "arrow-class");
        assert_eq!(
            arrow_marker_id(Some(ItemKind::Class), true),
            "arrow-class-hover"
        );
        assert_eq!(arrow_marker_id(None, false), "arrow-default");
    }

    #[test]
    fn color_darken_scales_channels() {
        let color = Color::rgb(100, 100, 100);
        assert_eq!(color.darken(0.5).r, 50);
        assert_eq!(color.lighten(1.0).r, 255);
    }

    proptest! {
        /// Gradient ids are unique per ordered kind pair and direction, so
        /// a reversed visual order never reuses the forward gradient.
        #[test]
        fn prop_gradient_ids_unique_per_pair_and_direction(
            a in item_kind_strategy(),
            b in item_kind_strategy(),
        ) {
            let forward = gradient_id(a, b, false);
            let reverse = gradient_id(a, b, true);
            prop_assert_ne!(&forward, &reverse);
            if a != b {
                prop_assert_ne!(forward, gradient_id(b, a, false));
            }
        }

        /// Hover always wins on opacity and width, for every edge kind.
        #[test]
        fn prop_hover_styling_dominates(kind in prop_oneof![
            Just(EdgeKind::Inheritance),
            Just(EdgeKind::ClassRange),
            Just(EdgeKind::ClassSlot),
            Just(EdgeKind::SlotRange),
            Just(EdgeKind::MapsTo),
        ]) {
            prop_assert!(edge_stroke_width(kind, true) > edge_stroke_width(kind, false));
            prop_assert!(LINK_HOVER_OPACITY > LINK_IDLE_OPACITY);
        }
    }
}

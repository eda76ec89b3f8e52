//! Geometry for cross-panel relationship links.
//!
//! Maps pairs of on-screen rectangles to cubic bezier SVG paths. Anchor
//! sides are chosen from the actual rect positions, not from assumed panel
//! sides, so the same math serves left-to-right and right-to-left links.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by min and max corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Vec2::new(pos.x + size.x, pos.y + size.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.min.x + self.width() * 0.5,
            self.min.y + self.height() * 0.5,
        )
    }

    /// Midpoint of the left edge.
    pub fn left_center(&self) -> Vec2 {
        Vec2::new(self.min.x, self.center().y)
    }

    /// Midpoint of the right edge.
    pub fn right_center(&self) -> Vec2 {
        Vec2::new(self.max.x, self.center().y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Visual orientation of a link, from the source element to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    LeftToRight,
    RightToLeft,
}

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Sample the curve at parameter t [0, 1].
    pub fn sample(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = self.start.x * mt3
            + 3.0 * self.control1.x * mt2 * t
            + 3.0 * self.control2.x * mt * t2
            + self.end.x * t3;
        let y = self.start.y * mt3
            + 3.0 * self.control1.y * mt2 * t
            + 3.0 * self.control2.y * mt * t2
            + self.end.y * t3;

        Vec2::new(x, y)
    }

    /// SVG path data for this curve.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y,
        )
    }
}

/// Router turning rect pairs into bezier link paths.
#[derive(Debug, Clone, Copy)]
pub struct LinkRouter {
    /// Fraction of the horizontal distance used as control-point offset.
    pub curvature: f32,
    /// Contribution of the vertical distance to the offset, capped by
    /// `vertical_cap` so tall links do not overshoot.
    pub vertical_influence: f32,
    pub vertical_cap: f32,
    /// Horizontal and vertical extent of the self-reference loop.
    pub loop_extent: Vec2,
}

impl Default for LinkRouter {
    fn default() -> Self {
        Self {
            curvature: 0.25,
            vertical_influence: 0.1,
            vertical_cap: 50.0,
            loop_extent: Vec2::new(48.0, 28.0),
        }
    }
}

impl LinkRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visual direction from the source rect to the target rect, by actual
    /// positions.
    pub fn direction(&self, source: Rect, target: Rect) -> LinkDirection {
        if source.center().x <= target.center().x {
            LinkDirection::LeftToRight
        } else {
            LinkDirection::RightToLeft
        }
    }

    /// Route a non-self link between two element rects.
    ///
    /// Anchors are the facing edge midpoints; the curve bows toward the
    /// direction of travel with a horizontal control offset of
    /// `|dx| * curvature` plus a capped vertical influence term.
    pub fn route(&self, source: Rect, target: Rect) -> CubicBezier {
        let direction = self.direction(source, target);
        let (start, end, sign) = match direction {
            LinkDirection::LeftToRight => (source.right_center(), target.left_center(), 1.0),
            LinkDirection::RightToLeft => (source.left_center(), target.right_center(), -1.0),
        };

        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        let offset = dx * self.curvature + (dy * self.vertical_influence).min(self.vertical_cap);

        CubicBezier {
            start,
            control1: Vec2::new(start.x + sign * offset, start.y),
            control2: Vec2::new(end.x - sign * offset, end.y),
            end,
        }
    }

    /// Fixed loop-path generator for self-reference edges, parameterized by
    /// the single element's rect. Leaves and re-enters the right edge.
    pub fn loop_path(&self, rect: Rect) -> String {
        let anchor = rect.right_center();
        let ext = self.loop_extent;
        CubicBezier {
            start: anchor,
            control1: Vec2::new(anchor.x + ext.x, anchor.y - ext.y),
            control2: Vec2::new(anchor.x + ext.x, anchor.y + ext.y),
            end: Vec2::new(anchor.x, anchor.y + 1.0),
        }
        .to_svg_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn distance(a: Vec2, b: Vec2) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            0.0f32..2000.0,
            0.0f32..2000.0,
            20.0f32..300.0,
            10.0f32..60.0,
        )
            .prop_map(|(x, y, w, h)| Rect::from_pos_size(Vec2::new(x, y), Vec2::new(w, h)))
    }

    #[test]
    fn anchors_face_each_other() {
        let router = LinkRouter::new();
        let left = Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 20.0));
        let right = Rect::from_pos_size(Vec2::new(400.0, 100.0), Vec2::new(100.0, 20.0));

        let curve = router.route(left, right);
        assert_eq!(curve.start, left.right_center());
        assert_eq!(curve.end, right.left_center());

        // Swapped order flips both anchors, not just the path direction.
        let curve = router.route(right, left);
        assert_eq!(curve.start, right.left_center());
        assert_eq!(curve.end, left.right_center());
    }

    #[test]
    fn vertical_influence_is_capped() {
        let router = LinkRouter::new();
        let top = Rect::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(100.0, 20.0));
        let bottom = Rect::from_pos_size(Vec2::new(200.0, 10_000.0), Vec2::new(100.0, 20.0));

        let curve = router.route(top, bottom);
        let dx = (curve.end.x - curve.start.x).abs();
        let max_offset = dx * router.curvature + router.vertical_cap;
        assert!((curve.control1.x - curve.start.x).abs() <= max_offset + 0.001);
    }

    #[test]
    fn svg_path_is_a_single_cubic_segment() {
        let curve = CubicBezier {
            start: Vec2::new(1.0, 2.0),
            control1: Vec2::new(3.0, 4.0),
            control2: Vec2::new(5.0, 6.0),
            end: Vec2::new(7.0, 8.0),
        };
        assert_eq!(curve.to_svg_path(), "M 1.0 2.0 C 3.0 4.0, 5.0 6.0, 7.0 8.0");
    }

    #[test]
    fn loop_path_starts_and_ends_at_the_same_element() {
        let router = LinkRouter::new();
        let rect = Rect::from_pos_size(Vec2::new(10.0, 20.0), Vec2::new(100.0, 20.0));
        let path = router.loop_path(rect);
        assert!(path.starts_with(&format!(
            "M {:.1} {:.1}",
            rect.right_center().x,
            rect.right_center().y
        )));
    }

    proptest! {
        /// The curve always starts and ends exactly on the facing edge
        /// midpoints of the two rects.
        #[test]
        fn prop_curve_endpoints_are_facing_midpoints(
            source in rect_strategy(),
            target in rect_strategy(),
        ) {
            let router = LinkRouter::new();
            let curve = router.route(source, target);

            let (expected_start, expected_end) = match router.direction(source, target) {
                LinkDirection::LeftToRight => (source.right_center(), target.left_center()),
                LinkDirection::RightToLeft => (source.left_center(), target.right_center()),
            };
            prop_assert!(distance(curve.start, expected_start) < 0.001);
            prop_assert!(distance(curve.end, expected_end) < 0.001);
        }

        /// The curve bows toward the direction of travel: control points
        /// sit on the travel side of their anchors.
        #[test]
        fn prop_curve_bows_with_travel_direction(
            source in rect_strategy(),
            target in rect_strategy(),
        ) {
            prop_assume!((source.center().x - target.center().x).abs() > 1.0);
            let router = LinkRouter::new();
            let curve = router.route(source, target);

            match router.direction(source, target) {
                LinkDirection::LeftToRight => {
                    prop_assert!(curve.control1.x >= curve.start.x);
                    prop_assert!(curve.control2.x <= curve.end.x);
                }
                LinkDirection::RightToLeft => {
                    prop_assert!(curve.control1.x <= curve.start.x);
                    prop_assert!(curve.control2.x >= curve.end.x);
                }
            }
        }

        /// Sampling at t=0 and t=1 reproduces the endpoints.
        #[test]
        fn prop_sampling_hits_endpoints(
            source in rect_strategy(),
            target in rect_strategy(),
        ) {
            let router = LinkRouter::new();
            let curve = router.route(source, target);
            prop_assert!(distance(curve.sample(0.0), curve.start) < 0.001);
            prop_assert!(distance(curve.sample(1.0), curve.end) < 0.001);
        }
    }
}

//! Folds the unbounded walked distance onto the inside border of the screen.
//!
//! The four edges form one unrolled line: bottom (left to right), right
//! (bottom to top), top (right to left), left (top to bottom). Every length
//! here is in fixed-point sub-units, [`SUBUNITS_PER_PIXEL`] to the pixel.
//!
//! Screen coordinates are relative to the bottom-left rest position of the
//! window: `x` grows rightward, `y` is zero on the bottom edge and goes
//! negative upward, so the window's top-left pixel is
//! `(x / 16, y / 16 + screen_h - window_h)`.

use crate::error::ConfigError;

/// Fixed-point scale of every motion quantity.
pub const SUBUNITS_PER_PIXEL: i64 = 16;

/// Which screen border the mascot is walking on, in clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Edge {
    Bottom = 0,
    Right = 1,
    Top = 2,
    Left = 3,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Right, Edge::Top, Edge::Left];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Wraps any index into 0..4.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(4) as usize]
    }

    /// Next edge clockwise.
    pub fn next(self) -> Self {
        Self::from_index(self as i64 + 1)
    }

    /// Bottom and top run along the screen width.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Bottom | Edge::Top)
    }
}

/// Segment lengths for one screen/window size pair.
///
/// Only constructible through [`PerimeterBounds::new`], so both spans are
/// always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerimeterBounds {
    span_w: i64,
    span_h: i64,
}

impl PerimeterBounds {
    pub fn new(
        screen_w: u32,
        screen_h: u32,
        footprint_w: u32,
        footprint_h: u32,
    ) -> Result<Self, ConfigError> {
        if screen_w <= footprint_w {
            return Err(ConfigError::ScreenTooSmall {
                axis: "width",
                screen: screen_w,
                window: footprint_w,
            });
        }
        if screen_h <= footprint_h {
            return Err(ConfigError::ScreenTooSmall {
                axis: "height",
                screen: screen_h,
                window: footprint_h,
            });
        }
        Ok(Self {
            span_w: (screen_w - footprint_w) as i64 * SUBUNITS_PER_PIXEL,
            span_h: (screen_h - footprint_h) as i64 * SUBUNITS_PER_PIXEL,
        })
    }

    /// Walkable length of `edge` in sub-units.
    pub fn span(&self, edge: Edge) -> i64 {
        if edge.is_horizontal() {
            self.span_w
        } else {
            self.span_h
        }
    }

    pub fn shortest_span(&self) -> i64 {
        self.span_w.min(self.span_h)
    }

    /// One full lap.
    pub fn perimeter(&self) -> i64 {
        2 * (self.span_w + self.span_h)
    }

    /// Reduce a virtual position to an edge and an offset along it.
    ///
    /// Segments are half-open, `[0, span)`: a corner belongs to the edge
    /// that starts there. Negative positions wrap backward through the left
    /// edge. After the lap reduction at most three edges are crossed, so the
    /// cost does not depend on how far the mascot has walked.
    pub fn fold(&self, virtual_x: i64) -> (Edge, i64) {
        let mut along = virtual_x.rem_euclid(self.perimeter());
        let mut edge = Edge::Bottom;
        while along >= self.span(edge) {
            along -= self.span(edge);
            edge = edge.next();
        }
        (edge, along)
    }

    /// Map walked distance, height above the rest line and walking
    /// direction to a screen position on the border.
    pub fn map(&self, virtual_x: i64, virtual_y: i64, velocity_x: i64) -> PerimeterState {
        let (edge, along) = self.fold(virtual_x);

        // Lifting moves the mascot onto a rectangle inset by `lift` from the
        // rest line. Clamping `along` to that rectangle keeps both axes
        // continuous through a corner taken mid-air.
        let lift = virtual_y.clamp(0, self.shortest_span() / 2);
        let inset = |span: i64| along.clamp(lift, span - lift);
        let (screen_x, screen_y) = match edge {
            Edge::Bottom => (inset(self.span_w), -lift),
            Edge::Right => (self.span_w - lift, -inset(self.span_h)),
            Edge::Top => (self.span_w - inset(self.span_w), -self.span_h + lift),
            Edge::Left => (lift, -self.span_h + inset(self.span_h)),
        };

        PerimeterState {
            edge,
            screen_x,
            screen_y,
            facing_reversed: velocity_x < 0,
        }
    }
}

/// Where the mascot is on screen this tick. Derived fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerimeterState {
    pub edge: Edge,
    /// Sub-units from the left of the screen to the window's left side.
    pub screen_x: i64,
    /// Sub-units from the bottom rest line, negative upward.
    pub screen_y: i64,
    pub facing_reversed: bool,
}

impl PerimeterState {
    pub fn edge_index(&self) -> u8 {
        self.edge.index()
    }

    /// Top-left pixel of a `window_h` tall window on a `screen_h` tall screen.
    pub fn window_position(&self, screen_h: u32, window_h: u32) -> (i32, i32) {
        let x = self.screen_x.div_euclid(SUBUNITS_PER_PIXEL);
        let y = self.screen_y.div_euclid(SUBUNITS_PER_PIXEL) + screen_h as i64 - window_h as i64;
        (x as i32, y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hd() -> PerimeterBounds {
        PerimeterBounds::new(1920, 1080, 200, 200).unwrap()
    }

    #[test]
    fn rejects_footprint_that_fills_the_screen() {
        assert!(matches!(
            PerimeterBounds::new(200, 1080, 200, 200),
            Err(ConfigError::ScreenTooSmall { axis: "width", .. })
        ));
        assert!(matches!(
            PerimeterBounds::new(1920, 100, 200, 200),
            Err(ConfigError::ScreenTooSmall { axis: "height", .. })
        ));
    }

    #[test]
    fn spans_alternate_between_width_and_height() {
        let b = hd();
        assert_eq!(b.span(Edge::Bottom), 1720 * 16);
        assert_eq!(b.span(Edge::Right), 880 * 16);
        assert_eq!(b.span(Edge::Top), 1720 * 16);
        assert_eq!(b.span(Edge::Left), 880 * 16);
        assert_eq!(b.perimeter(), 2 * (1720 + 880) * 16);
    }

    #[test]
    fn corners_are_continuous() {
        let b = hd();
        let mut x = 0;
        for edge in Edge::ALL {
            let end = b.map(x + b.span(edge) - 1, 0, 1);
            let start = b.map(x + b.span(edge), 0, 1);
            assert_eq!(end.edge, edge);
            assert_eq!(start.edge, edge.next());
            assert!((end.screen_x - start.screen_x).abs() <= 1);
            assert!((end.screen_y - start.screen_y).abs() <= 1);
            x += b.span(edge);
        }
    }

    #[test]
    fn corner_anchors_match_the_screen_corners() {
        let b = hd();
        let w = b.span(Edge::Bottom);
        let h = b.span(Edge::Right);

        let s = b.map(0, 0, 1);
        assert_eq!((s.edge, s.screen_x, s.screen_y), (Edge::Bottom, 0, 0));
        let s = b.map(w, 0, 1);
        assert_eq!((s.edge, s.screen_x, s.screen_y), (Edge::Right, w, 0));
        let s = b.map(w + h, 0, 1);
        assert_eq!((s.edge, s.screen_x, s.screen_y), (Edge::Top, w, -h));
        let s = b.map(2 * w + h, 0, 1);
        assert_eq!((s.edge, s.screen_x, s.screen_y), (Edge::Left, 0, -h));
        let s = b.map(b.perimeter(), 0, 1);
        assert_eq!((s.edge, s.screen_x, s.screen_y), (Edge::Bottom, 0, 0));
    }

    #[test]
    fn window_sits_flush_against_each_edge() {
        let b = hd();
        let w = b.span(Edge::Bottom);
        let h = b.span(Edge::Right);

        // Middle of each edge.
        assert_eq!(b.map(w / 2, 0, 1).window_position(1080, 200).1, 880);
        assert_eq!(b.map(w + h / 2, 0, 1).window_position(1080, 200).0, 1720);
        assert_eq!(b.map(w + h + w / 2, 0, 1).window_position(1080, 200).1, 0);
        assert_eq!(b.map(2 * w + h + h / 2, 0, 1).window_position(1080, 200).0, 0);
    }

    #[test]
    fn negative_positions_wrap_backward_onto_the_left_edge() {
        let b = hd();
        let s = b.map(-16, 0, -64);
        assert_eq!(s.edge, Edge::Left);
        assert_eq!(s.screen_x, 0);
        assert_eq!(s.screen_y, -16);
        assert!(s.facing_reversed);

        let s = b.map(-b.span(Edge::Left) - 16, 0, -64);
        assert_eq!(s.edge, Edge::Top);
        assert_eq!(s.screen_x, 16);
    }

    #[test]
    fn every_mapped_point_stays_on_its_segment() {
        let b = PerimeterBounds::new(1280, 720, 240, 280).unwrap();
        let w = b.span(Edge::Bottom);
        let h = b.span(Edge::Right);
        let mut x = -3 * b.perimeter();
        while x < 3 * b.perimeter() {
            let s = b.map(x, 0, 1);
            assert!((0..=w).contains(&s.screen_x), "x={x} -> {s:?}");
            assert!((-h..=0).contains(&s.screen_y), "x={x} -> {s:?}");
            match s.edge {
                Edge::Bottom => assert_eq!(s.screen_y, 0),
                Edge::Right => assert_eq!(s.screen_x, w),
                Edge::Top => assert_eq!(s.screen_y, -h),
                Edge::Left => assert_eq!(s.screen_x, 0),
            }
            x += 997;
        }
    }

    #[test]
    fn huge_positions_fold_in_constant_time() {
        let b = hd();
        let laps = 1_000_000_007i64;
        let far = b.map(laps * b.perimeter() + 123, 0, 1);
        let near = b.map(123, 0, 1);
        assert_eq!(far, near);
    }

    #[test]
    fn vertical_offset_points_away_from_the_edge() {
        let b = hd();
        let w = b.span(Edge::Bottom);
        let h = b.span(Edge::Right);
        let lift = 160;

        let s = b.map(w / 2, lift, 1);
        assert_eq!(s.screen_y, -lift);
        let s = b.map(w + h / 2, lift, 1);
        assert_eq!(s.screen_x, w - lift);
        let s = b.map(w + h + w / 2, lift, 1);
        assert_eq!(s.screen_y, -h + lift);
        let s = b.map(2 * w + h + h / 2, lift, 1);
        assert_eq!(s.screen_x, lift);
    }

    #[test]
    fn corners_stay_continuous_in_the_air() {
        let b = hd();
        let mut x = 0;
        for edge in Edge::ALL {
            x += b.span(edge);
            for lift in [0, 16, 1600, 3600] {
                for dx in -200..200 {
                    let a = b.map(x + dx, lift, 64);
                    let c = b.map(x + dx + 1, lift, 64);
                    assert!((a.screen_x - c.screen_x).abs() <= 1, "{edge:?} lift={lift} dx={dx}");
                    assert!((a.screen_y - c.screen_y).abs() <= 1, "{edge:?} lift={lift} dx={dx}");
                }
            }
        }
    }

    #[test]
    fn lift_moves_at_most_its_own_change() {
        let b = hd();
        let w = b.span(Edge::Bottom);
        for x in [w - 40, w, w + 40] {
            for lift in 0..400 {
                let a = b.map(x, lift, 64);
                let c = b.map(x, lift + 1, 64);
                assert!((a.screen_x - c.screen_x).abs() <= 1);
                assert!((a.screen_y - c.screen_y).abs() <= 1);
            }
        }
    }

    #[test]
    fn lift_is_capped_to_half_the_shortest_span() {
        let b = PerimeterBounds::new(1920, 300, 200, 200).unwrap();
        let s = b.map(b.span(Edge::Bottom) / 2, i64::MAX / 4, 64);
        assert_eq!(s.screen_y, -b.shortest_span() / 2);
    }

    #[test]
    fn edge_index_wraps() {
        assert_eq!(Edge::from_index(-1), Edge::Left);
        assert_eq!(Edge::from_index(5), Edge::Right);
        assert_eq!(Edge::Left.next(), Edge::Bottom);
    }
}

//! Single cell evaluation for the marching squares algorithm.
//!
//! A [`Square`] holds the four samples at the corners of a cell. For a given
//! level it yields the segments where the linearly interpolated surface
//! crosses that level, and [`Square::process`] drives a whole level range,
//! no-data handling and border emission for polygonization.
//!
//! ```text
//!  upper_left ── UPPER ── upper_right
//!      │                      │
//!    LEFT                   RIGHT
//!      │                      │
//!  lower_left ── LOWER ── lower_right
//! ```

use crate::error::Result;
use crate::geometry::{Point, Segment, ValuedPoint};
use crate::level_generator::LevelGenerator;
use crate::utility::fudge;
use crate::writer::SegmentWriter;

/// Border bits, set for edges that abut no data.
pub mod borders {
    pub const NONE: u8 = 0;
    pub const LEFT: u8 = 1 << 0;
    pub const LOWER: u8 = 1 << 1;
    pub const RIGHT: u8 = 1 << 2;
    pub const UPPER: u8 = 1 << 3;
}

// Marching case bits, set for corners at or above the level.
const ALL_LOW: u8 = 0;
const UPPER_LEFT: u8 = 1 << 0;
const LOWER_LEFT: u8 = 1 << 1;
const LOWER_RIGHT: u8 = 1 << 2;
const UPPER_RIGHT: u8 = 1 << 3;
const ALL_HIGH: u8 = UPPER_LEFT | LOWER_LEFT | LOWER_RIGHT | UPPER_RIGHT;
const SADDLE_NW: u8 = UPPER_LEFT | LOWER_RIGHT;
const SADDLE_NE: u8 = UPPER_RIGHT | LOWER_LEFT;

/// Up to two segments produced by a square for one level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segments {
    items: [Option<Segment>; 2],
}

impl Segments {
    fn none() -> Self {
        Self::default()
    }

    fn one(s: Segment) -> Self {
        Self {
            items: [Some(s), None],
        }
    }

    fn two(a: Segment, b: Segment) -> Self {
        Self {
            items: [Some(a), Some(b)],
        }
    }

    pub fn len(&self) -> usize {
        self.items.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items[0].is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.items.iter().flatten()
    }
}

/// A cell with four valued corners.
#[derive(Debug, Clone, Copy)]
pub struct Square {
    pub upper_left: ValuedPoint,
    pub upper_right: ValuedPoint,
    pub lower_left: ValuedPoint,
    pub lower_right: ValuedPoint,
    /// Edges abutting no data, see [`borders`].
    pub borders: u8,
    /// Set on quadrant sub-squares, which are never subdivided again.
    pub split: bool,
    nan_count: u8,
}

impl Square {
    pub fn new(
        upper_left: ValuedPoint,
        upper_right: ValuedPoint,
        lower_left: ValuedPoint,
        lower_right: ValuedPoint,
        borders: u8,
        split: bool,
    ) -> Self {
        debug_assert_eq!(upper_left.y, upper_right.y);
        debug_assert_eq!(lower_left.y, lower_right.y);
        debug_assert_eq!(upper_left.x, lower_left.x);
        debug_assert_eq!(upper_right.x, lower_right.x);
        let nan_count = [upper_left, upper_right, lower_left, lower_right]
            .iter()
            .filter(|p| p.value.is_nan())
            .count() as u8;
        Self {
            upper_left,
            upper_right,
            lower_left,
            lower_right,
            borders,
            split,
            nan_count,
        }
    }

    /// Number of no-data corners.
    pub fn nan_count(&self) -> u8 {
        self.nan_count
    }

    fn corners(&self) -> [f64; 4] {
        [
            self.upper_left.value,
            self.upper_right.value,
            self.lower_left.value,
            self.lower_right.value,
        ]
    }

    /// Smallest and largest finite corner values.
    pub fn min_max(&self) -> (f64, f64) {
        self.corners()
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    // ------------------------------------------------------------------
    // Sub-squares
    // ------------------------------------------------------------------

    /// Center of the square, valued with the mean of the finite corners.
    pub fn center(&self) -> ValuedPoint {
        let (sum, count) = self
            .corners()
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0u8), |(sum, count), v| (sum + v, count + 1));
        let value = if count == 0 {
            f64::NAN
        } else {
            sum / f64::from(count)
        };
        ValuedPoint::new(
            0.5 * (self.upper_left.x + self.lower_right.x),
            0.5 * (self.upper_left.y + self.lower_right.y),
            value,
        )
    }

    pub fn left_center(&self) -> ValuedPoint {
        ValuedPoint::new(
            self.upper_left.x,
            0.5 * (self.upper_left.y + self.lower_left.y),
            edge_mean(self.upper_left.value, self.lower_left.value),
        )
    }

    pub fn lower_center(&self) -> ValuedPoint {
        ValuedPoint::new(
            0.5 * (self.lower_left.x + self.lower_right.x),
            self.lower_left.y,
            edge_mean(self.lower_left.value, self.lower_right.value),
        )
    }

    pub fn right_center(&self) -> ValuedPoint {
        ValuedPoint::new(
            self.upper_right.x,
            0.5 * (self.upper_right.y + self.lower_right.y),
            edge_mean(self.upper_right.value, self.lower_right.value),
        )
    }

    pub fn upper_center(&self) -> ValuedPoint {
        ValuedPoint::new(
            0.5 * (self.upper_left.x + self.upper_right.x),
            self.upper_left.y,
            edge_mean(self.upper_left.value, self.upper_right.value),
        )
    }

    pub fn upper_left_square(&self) -> Square {
        Square::new(
            self.upper_left,
            self.upper_center(),
            self.left_center(),
            self.center(),
            (self.borders & (borders::UPPER | borders::LEFT))
                | nan_border(self.upper_right.value, borders::RIGHT)
                | nan_border(self.lower_left.value, borders::LOWER),
            true,
        )
    }

    pub fn upper_right_square(&self) -> Square {
        Square::new(
            self.upper_center(),
            self.upper_right,
            self.center(),
            self.right_center(),
            (self.borders & (borders::UPPER | borders::RIGHT))
                | nan_border(self.lower_right.value, borders::LOWER)
                | nan_border(self.upper_left.value, borders::LEFT),
            true,
        )
    }

    pub fn lower_left_square(&self) -> Square {
        Square::new(
            self.left_center(),
            self.center(),
            self.lower_left,
            self.lower_center(),
            (self.borders & (borders::LOWER | borders::LEFT))
                | nan_border(self.upper_left.value, borders::UPPER)
                | nan_border(self.lower_right.value, borders::RIGHT),
            true,
        )
    }

    pub fn lower_right_square(&self) -> Square {
        Square::new(
            self.center(),
            self.right_center(),
            self.lower_center(),
            self.lower_right,
            (self.borders & (borders::LOWER | borders::RIGHT))
                | nan_border(self.lower_left.value, borders::LEFT)
                | nan_border(self.upper_right.value, borders::UPPER),
            true,
        )
    }

    // ------------------------------------------------------------------
    // Level crossing
    // ------------------------------------------------------------------

    /// Which corners are at or above `level`.
    pub fn marching_case(&self, level: f64, min_level: f64) -> u8 {
        let bit = |v: f64, b: u8| if fudge(v, min_level, level) > level { b } else { ALL_LOW };
        bit(self.upper_left.value, UPPER_LEFT)
            | bit(self.lower_left.value, LOWER_LEFT)
            | bit(self.lower_right.value, LOWER_RIGHT)
            | bit(self.upper_right.value, UPPER_RIGHT)
    }

    fn is_saddle(&self, level: f64, min_level: f64) -> bool {
        matches!(self.marching_case(level, min_level), SADDLE_NW | SADDLE_NE)
    }

    /// Where `level` crosses one of the square edges.
    ///
    /// Each edge is always evaluated from its lower (or left) end, and whole
    /// edges are cut at their midpoint first, so two squares sharing an edge
    /// compute the same point even when only one of them is split.
    pub fn interpolate(&self, border: u8, level: f64, min_level: f64) -> Point {
        let whole = !self.split;
        let (a, b) = match border {
            borders::LEFT => (self.lower_left, self.upper_left),
            borders::LOWER => (self.lower_left, self.lower_right),
            borders::RIGHT => (self.lower_right, self.upper_right),
            _ => (self.upper_left, self.upper_right),
        };
        if border == borders::LEFT || border == borders::RIGHT {
            Point::new(
                a.x,
                lerp(level, min_level, (a.y, a.value), (b.y, b.value), whole),
            )
        } else {
            Point::new(
                lerp(level, min_level, (a.x, a.value), (b.x, b.value), whole),
                a.y,
            )
        }
    }

    /// Segments where the square crosses `level`.
    ///
    /// Every segment keeps the corners at or above `level` on the positive
    /// side of `cross(end - start, p - start)`.
    pub fn segments(&self, level: f64, min_level: f64) -> Segments {
        use borders::{LEFT, LOWER, RIGHT, UPPER};
        let seg = |from: u8, to: u8| {
            Segment::new(
                self.interpolate(from, level, min_level),
                self.interpolate(to, level, min_level),
            )
        };
        match self.marching_case(level, min_level) {
            ALL_LOW | ALL_HIGH => Segments::none(),
            UPPER_LEFT => Segments::one(seg(UPPER, LEFT)),
            LOWER_LEFT => Segments::one(seg(LEFT, LOWER)),
            LOWER_RIGHT => Segments::one(seg(LOWER, RIGHT)),
            UPPER_RIGHT => Segments::one(seg(RIGHT, UPPER)),
            c if c == UPPER_LEFT | LOWER_LEFT => Segments::one(seg(UPPER, LOWER)),
            c if c == LOWER_LEFT | LOWER_RIGHT => Segments::one(seg(LEFT, RIGHT)),
            c if c == LOWER_RIGHT | UPPER_RIGHT => Segments::one(seg(LOWER, UPPER)),
            c if c == UPPER_RIGHT | UPPER_LEFT => Segments::one(seg(RIGHT, LEFT)),
            c if c == ALL_HIGH & !UPPER_LEFT => Segments::one(seg(LEFT, UPPER)),
            c if c == ALL_HIGH & !LOWER_LEFT => Segments::one(seg(LOWER, LEFT)),
            c if c == ALL_HIGH & !LOWER_RIGHT => Segments::one(seg(RIGHT, LOWER)),
            c if c == ALL_HIGH & !UPPER_RIGHT => Segments::one(seg(UPPER, RIGHT)),
            SADDLE_NW => {
                if self.center_is_high(level, min_level) {
                    // upper-left and lower-right joined through the center
                    Segments::two(seg(UPPER, RIGHT), seg(LOWER, LEFT))
                } else {
                    Segments::two(seg(UPPER, LEFT), seg(LOWER, RIGHT))
                }
            }
            SADDLE_NE => {
                if self.center_is_high(level, min_level) {
                    Segments::two(seg(LEFT, UPPER), seg(RIGHT, LOWER))
                } else {
                    Segments::two(seg(RIGHT, UPPER), seg(LEFT, LOWER))
                }
            }
            _ => Segments::none(),
        }
    }

    fn center_is_high(&self, level: f64, min_level: f64) -> bool {
        fudge(self.center().value, min_level, level) > level
    }

    /// Canonical edge, oriented so the square interior is on its positive side.
    fn edge(&self, border: u8) -> (ValuedPoint, ValuedPoint) {
        match border {
            borders::UPPER => (self.upper_left, self.upper_right),
            borders::RIGHT => (self.upper_right, self.lower_right),
            borders::LOWER => (self.lower_right, self.lower_left),
            _ => (self.lower_left, self.upper_left),
        }
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Emit all the segments of this square to `writer`.
    pub fn process<G, W>(&self, levels: &G, writer: &mut W) -> Result<()>
    where
        G: LevelGenerator + ?Sized,
        W: SegmentWriter + ?Sized,
    {
        if self.nan_count == 4 {
            return Ok(());
        }

        if self.nan_count > 0 {
            if !self.upper_left.value.is_nan() {
                self.upper_left_square().process(levels, writer)?;
            }
            if !self.upper_right.value.is_nan() {
                self.upper_right_square().process(levels, writer)?;
            }
            if !self.lower_left.value.is_nan() {
                self.lower_left_square().process(levels, writer)?;
            }
            if !self.lower_right.value.is_nan() {
                self.lower_right_square().process(levels, writer)?;
            }
            return Ok(());
        }

        let min_level = levels.min_level();
        let (min, max) = self.min_max();
        let range = levels.range(min, max)?;

        if !self.split && range.len() > 1 {
            let ambiguous = range
                .iter(levels)
                .any(|(_, level)| self.is_saddle(level, min_level));
            if ambiguous {
                // several levels through an ambiguous cell, refine it
                self.upper_left_square().process(levels, writer)?;
                self.upper_right_square().process(levels, writer)?;
                self.lower_left_square().process(levels, writer)?;
                self.lower_right_square().process(levels, writer)?;
                return Ok(());
            }
        }

        let polygonize = writer.polygonize();
        if polygonize && self.borders != borders::NONE {
            for border in [borders::UPPER, borders::LEFT, borders::RIGHT, borders::LOWER] {
                if self.borders & border != 0 {
                    self.process_border(border, levels, writer)?;
                }
            }
        }

        for (idx, level) in range.iter(levels) {
            for s in self.segments(level, min_level).iter() {
                if polygonize {
                    // the band below the level keeps its area on the
                    // positive side of the reversed segment
                    writer.add_segment(idx, s.end, s.start);
                    writer.add_segment(idx + 1, s.start, s.end);
                } else {
                    writer.add_segment(idx, s.start, s.end);
                }
            }
        }
        Ok(())
    }

    /// Split a border edge at every level crossing and hand each piece to
    /// the band it bounds.
    fn process_border<G, W>(&self, border: u8, levels: &G, writer: &mut W) -> Result<()>
    where
        G: LevelGenerator + ?Sized,
        W: SegmentWriter + ?Sized,
    {
        let min_level = levels.min_level();
        let (a, b) = self.edge(border);
        let ascending = a.value <= b.value;
        let (low, high) = if ascending { (a, b) } else { (b, a) };
        let range = levels.range(low.value, high.value)?;

        // points from the low end to the high end, each with the band of the
        // piece that ends there
        let mut last = low.point();
        for (idx, level) in range.iter(levels) {
            let next = self.interpolate(border, level, min_level);
            emit_border_piece(writer, idx, last, next, ascending);
            last = next;
        }
        emit_border_piece(writer, range.end, last, high.point(), ascending);
        Ok(())
    }
}

fn emit_border_piece<W: SegmentWriter + ?Sized>(
    writer: &mut W,
    level_idx: i32,
    low: Point,
    high: Point,
    ascending: bool,
) {
    if ascending {
        writer.add_border_segment(level_idx, low, high);
    } else {
        writer.add_border_segment(level_idx, high, low);
    }
}

/// Mean of two edge samples, ignoring a no-data end.
fn edge_mean(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        0.5 * (a + b)
    }
}

fn nan_border(value: f64, border: u8) -> u8 {
    if value.is_nan() {
        border
    } else {
        borders::NONE
    }
}

/// Coordinate where `level` sits between `(x1, v1)` and `(x2, v2)`.
///
/// With `whole` set only the half edge holding the crossing is used, the
/// midpoint value being the one a split square assigns to it.
fn lerp(
    level: f64,
    min_level: f64,
    (mut x1, mut v1): (f64, f64),
    (mut x2, mut v2): (f64, f64),
    whole: bool,
) -> f64 {
    let f = |v: f64| fudge(v, min_level, level);
    if whole {
        let xm = 0.5 * (x1 + x2);
        let vm = edge_mean(v1, v2);
        let (f1, fm) = (f(v1), f(vm));
        if (f1 <= level && level < fm) || (f1 >= level && level > fm) {
            x2 = xm;
            v2 = vm;
        } else {
            x1 = xm;
            v1 = vm;
        }
    }
    let f1 = f(v1);
    let ratio = (level - f1) / (f(v2) - f1);
    x1 * (1.0 - ratio) + x2 * ratio
}

//! Points, segments and line strings in pixel space.
//!
//! Pixel `(col, row)` has its center at `(col + 0.5, row + 0.5)`; `y` grows
//! downwards.

use serde::{Deserialize, Serialize};

use crate::utility::EPSILON;

/// A point in 2D pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Equality within [`EPSILON`] on both axes.
    #[inline]
    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

/// A point carrying a sampled value (NaN for no data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuedPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl ValuedPoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A directed segment.
///
/// Values at or above the segment level lie on the side where
/// `cross(end - start, p - start) > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Ordered sequence of points; a ring repeats its first point at the end.
pub type LineString = Vec<Point>;

/// Twice the signed area of a ring (shoelace formula).
///
/// Positive for rings whose interior is on the positive side of each edge,
/// which is how the merger orients exterior rings.
pub fn signed_area2(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for w in ring.windows(2) {
        sum += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    let (first, last) = (ring[0], ring[ring.len() - 1]);
    if !first.approx_eq(&last) {
        sum += last.x * first.y - first.x * last.y;
    }
    sum
}

/// Axis-aligned bounds of a point set: `(min_x, min_y, max_x, max_y)`.
pub fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    )
}

/// Even-odd ray casting test.
pub fn ring_contains(ring: &[Point], p: &Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Rotate a closed ring so that it starts at its smallest `(y, x)` vertex.
///
/// The closing point is rebuilt, so the result is again a closed ring.
pub fn normalize_ring(ring: &mut LineString) {
    if ring.len() < 2 {
        return;
    }
    if ring[0].approx_eq(&ring[ring.len() - 1]) {
        ring.pop();
    }
    let start = ring
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    ring.rotate_left(start);
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
}

/// Whether two rings describe the same closed path, whatever their
/// starting vertex and direction.
pub fn rings_equal(a: &[Point], b: &[Point]) -> bool {
    let open = |r: &[Point]| -> Vec<Point> {
        let mut v = r.to_vec();
        if v.len() > 1 && v[0].approx_eq(&v[v.len() - 1]) {
            v.pop();
        }
        v
    };
    let (a, b) = (open(a), open(b));
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    let n = a.len();
    let Some(offset) = b.iter().position(|p| p.approx_eq(&a[0])) else {
        return false;
    };
    let forward = (0..n).all(|i| a[i].approx_eq(&b[(offset + i) % n]));
    let backward = (0..n).all(|i| a[i].approx_eq(&b[(offset + n - i) % n]));
    forward || backward
}

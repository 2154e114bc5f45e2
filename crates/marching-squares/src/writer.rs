//! Capability traits connecting the pipeline stages.
//!
//! ```text
//! ContourGenerator ──► SegmentWriter ──► LineWriter ──► PolygonWriter
//!   (rows, squares)    (SegmentMerger)   (collector or PolygonRingAppender)
//! ```

use crate::geometry::{LineString, Point};

/// Receives the raw segments produced by squares, keyed by level index.
pub trait SegmentWriter {
    /// Whether border segments are wanted, producing closed isoband rings.
    fn polygonize(&self) -> bool;

    /// A crossing of the level at `level_idx`.
    fn add_segment(&mut self, level_idx: i32, start: Point, end: Point);

    /// A piece of no-data or raster edge bounding the band at `level_idx`.
    fn add_border_segment(&mut self, level_idx: i32, start: Point, end: Point);

    /// Called before the squares of a raster row are processed.
    fn beginning_of_line(&mut self) {}

    /// Called once the squares of a raster row have been processed.
    fn end_of_line(&mut self) {}
}

/// Receives stitched line strings.
pub trait LineWriter {
    /// `closed` is set when `line` is a ring (first point repeated at the end).
    fn add_line(&mut self, level: f64, line: LineString, closed: bool);

    /// A closed ring bounding the band between `min_level` and `level`.
    ///
    /// Sent instead of [`add_line`](Self::add_line) for isoband rings.
    fn add_band_ring(&mut self, min_level: f64, level: f64, ring: LineString) {
        let _ = min_level;
        self.add_line(level, ring, true);
    }
}

/// Receives polygons assembled per level.
///
/// Calls always come bracketed: `start_polygon`, then for each part one
/// `add_part` followed by its `add_interior_ring`s, then `end_polygon`.
pub trait PolygonWriter {
    fn start_polygon(&mut self, level: f64);

    /// Opens the polygon of the band between `min_level` and `level`.
    fn start_band(&mut self, min_level: f64, level: f64) {
        let _ = min_level;
        self.start_polygon(level);
    }

    fn add_part(&mut self, ring: &LineString);
    fn add_interior_ring(&mut self, ring: &LineString);
    fn end_polygon(&mut self);
}

impl<W: SegmentWriter + ?Sized> SegmentWriter for &mut W {
    fn polygonize(&self) -> bool {
        (**self).polygonize()
    }

    fn add_segment(&mut self, level_idx: i32, start: Point, end: Point) {
        (**self).add_segment(level_idx, start, end)
    }

    fn add_border_segment(&mut self, level_idx: i32, start: Point, end: Point) {
        (**self).add_border_segment(level_idx, start, end)
    }

    fn beginning_of_line(&mut self) {
        (**self).beginning_of_line()
    }

    fn end_of_line(&mut self) {
        (**self).end_of_line()
    }
}

impl<W: LineWriter + ?Sized> LineWriter for &mut W {
    fn add_line(&mut self, level: f64, line: LineString, closed: bool) {
        (**self).add_line(level, line, closed)
    }

    fn add_band_ring(&mut self, min_level: f64, level: f64, ring: LineString) {
        (**self).add_band_ring(min_level, level, ring)
    }
}

impl<W: PolygonWriter + ?Sized> PolygonWriter for &mut W {
    fn start_polygon(&mut self, level: f64) {
        (**self).start_polygon(level)
    }

    fn start_band(&mut self, min_level: f64, level: f64) {
        (**self).start_band(min_level, level)
    }

    fn add_part(&mut self, ring: &LineString) {
        (**self).add_part(ring)
    }

    fn add_interior_ring(&mut self, ring: &LineString) {
        (**self).add_interior_ring(ring)
    }

    fn end_polygon(&mut self) {
        (**self).end_polygon()
    }
}

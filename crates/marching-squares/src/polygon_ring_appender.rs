//! Groups closed isoband rings into polygons with holes.
//!
//! Rings coming out of the merger in polygonize mode are oriented: exterior
//! rings have a positive signed area and holes a negative one. Each hole is
//! attached to the smallest exterior ring of the same level that contains it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::geometry::{bounds, ring_contains, signed_area2, LineString};
use crate::writer::{LineWriter, PolygonWriter};

/// Level value usable as an ordered map key.
#[derive(Debug, Clone, Copy)]
struct LevelKey(f64);

impl PartialEq for LevelKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LevelKey {}

impl PartialOrd for LevelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LevelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

struct Ring {
    points: LineString,
    area: f64,
    bounds: (f64, f64, f64, f64),
}

impl Ring {
    fn new(points: LineString, area: f64) -> Self {
        let bounds = bounds(&points);
        Self {
            points,
            area,
            bounds,
        }
    }

    fn covers_bounds(&self, other: &Ring) -> bool {
        let (a, b) = (self.bounds, other.bounds);
        a.0 <= b.0 && a.1 <= b.1 && a.2 >= b.2 && a.3 >= b.3
    }

    /// Whether most of `other`'s vertices fall inside this ring.
    ///
    /// Vertices shared with this ring (rings may touch at pixel corners) make
    /// a single-point test unreliable.
    fn contains(&self, other: &Ring) -> bool {
        if !self.covers_bounds(other) {
            return false;
        }
        let inside = other
            .points
            .iter()
            .filter(|p| ring_contains(&self.points, p))
            .count();
        inside * 2 > other.points.len()
    }
}

/// An exterior ring and the holes assigned to it.
struct Part {
    exterior: Ring,
    holes: Vec<Ring>,
}

/// Closed rings of one band.
struct Band {
    floor: f64,
    rings: Vec<LineString>,
}

/// Line writer assembling closed rings into per-level polygons.
pub struct PolygonRingAppender<P> {
    writer: P,
    bands: BTreeMap<LevelKey, Band>,
}

impl<P: PolygonWriter> PolygonRingAppender<P> {
    pub fn new(writer: P) -> Self {
        Self {
            writer,
            bands: BTreeMap::new(),
        }
    }

    /// Number of rings received so far.
    pub fn ring_count(&self) -> usize {
        self.bands.values().map(|band| band.rings.len()).sum()
    }

    /// Emit one polygon per level, in ascending level order, and return the writer.
    pub fn finish(mut self) -> P {
        let bands = std::mem::take(&mut self.bands);
        for (LevelKey(level), band) in bands {
            let parts = assemble_parts(level, band.rings);
            if parts.is_empty() {
                continue;
            }
            self.writer.start_band(band.floor, level);
            for part in &parts {
                self.writer.add_part(&part.exterior.points);
                for hole in &part.holes {
                    self.writer.add_interior_ring(&hole.points);
                }
            }
            self.writer.end_polygon();
        }
        self.writer
    }
}

fn assemble_parts(level: f64, rings: Vec<LineString>) -> Vec<Part> {
    let mut exteriors = Vec::new();
    let mut holes = Vec::new();
    for points in rings {
        let area = signed_area2(&points);
        if area > 0.0 {
            exteriors.push(Ring::new(points, area));
        } else if area < 0.0 {
            holes.push(Ring::new(points, area));
        } else {
            debug!(level = level, points = points.len(), "dropping zero-area ring");
        }
    }

    // scan order depends on how rows were fed, sort by starting vertex
    let by_start = |a: &Ring, b: &Ring| {
        let (p, q) = (a.points[0], b.points[0]);
        p.y.total_cmp(&q.y).then(p.x.total_cmp(&q.x))
    };
    exteriors.sort_by(by_start);
    holes.sort_by(by_start);

    let mut parts: Vec<Part> = exteriors
        .into_iter()
        .map(|exterior| Part {
            exterior,
            holes: Vec::new(),
        })
        .collect();

    for hole in holes {
        let owner = parts
            .iter()
            .enumerate()
            .filter(|(_, part)| part.exterior.contains(&hole))
            .min_by(|(_, a), (_, b)| a.exterior.area.total_cmp(&b.exterior.area))
            .map(|(i, _)| i);
        match owner {
            Some(i) => parts[i].holes.push(hole),
            None => debug!(
                level = level,
                area = hole.area / 2.0,
                "hole without enclosing ring"
            ),
        }
    }

    parts
}

impl<P: PolygonWriter> LineWriter for PolygonRingAppender<P> {
    fn add_line(&mut self, level: f64, line: LineString, closed: bool) {
        if !closed {
            debug!(level = level, points = line.len(), "ignoring open line");
            return;
        }
        self.add_band_ring(f64::NEG_INFINITY, level, line);
    }

    fn add_band_ring(&mut self, min_level: f64, level: f64, ring: LineString) {
        self.bands
            .entry(LevelKey(level))
            .or_insert_with(|| Band {
                floor: min_level,
                rings: Vec::new(),
            })
            .rings
            .push(ring);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[derive(Debug, Default)]
    struct Polygons {
        calls: Vec<String>,
        polygons: Vec<(f64, Vec<Vec<LineString>>)>,
        floors: Vec<f64>,
    }

    impl PolygonWriter for Polygons {
        fn start_band(&mut self, min_level: f64, level: f64) {
            self.floors.push(min_level);
            self.start_polygon(level);
        }

        fn start_polygon(&mut self, level: f64) {
            self.calls.push("start".into());
            self.polygons.push((level, Vec::new()));
        }

        fn add_part(&mut self, ring: &LineString) {
            self.calls.push("part".into());
            if let Some((_, parts)) = self.polygons.last_mut() {
                parts.push(vec![ring.clone()]);
            }
        }

        fn add_interior_ring(&mut self, ring: &LineString) {
            self.calls.push("hole".into());
            if let Some(part) = self.polygons.last_mut().and_then(|(_, p)| p.last_mut()) {
                part.push(ring.clone());
            }
        }

        fn end_polygon(&mut self) {
            self.calls.push("end".into());
        }
    }

    /// Closed axis-aligned box, positively oriented unless `hole`.
    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, hole: bool) -> LineString {
        let mut ring = vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
            Point::new(x0, y0),
        ];
        if hole {
            ring.reverse();
        }
        ring
    }

    #[test]
    fn test_single_exterior() {
        let mut appender = PolygonRingAppender::new(Polygons::default());
        appender.add_line(1.0, rect(0.0, 0.0, 2.0, 2.0, false), true);
        let out = appender.finish();
        assert_eq!(out.calls, vec!["start", "part", "end"]);
        assert_eq!(out.polygons[0].0, 1.0);
    }

    #[test]
    fn test_hole_goes_to_smallest_container() {
        let mut appender = PolygonRingAppender::new(Polygons::default());
        // outer box, an island inside a lake, and the lake itself
        appender.add_line(1.0, rect(0.0, 0.0, 10.0, 10.0, false), true);
        appender.add_line(1.0, rect(4.0, 4.0, 6.0, 6.0, false), true);
        appender.add_line(1.0, rect(1.0, 1.0, 9.0, 9.0, true), true);
        appender.add_line(1.0, rect(4.5, 4.5, 5.5, 5.5, true), true);
        assert_eq!(appender.ring_count(), 4);

        let out = appender.finish();
        assert_eq!(out.calls, vec!["start", "part", "hole", "part", "hole", "end"]);
        let parts = &out.polygons[0].1;
        assert_eq!(parts[0][0], rect(0.0, 0.0, 10.0, 10.0, false));
        assert_eq!(parts[0][1], rect(1.0, 1.0, 9.0, 9.0, true));
        assert_eq!(parts[1][0], rect(4.0, 4.0, 6.0, 6.0, false));
        assert_eq!(parts[1][1], rect(4.5, 4.5, 5.5, 5.5, true));
    }

    #[test]
    fn test_levels_emitted_in_order() {
        let mut appender = PolygonRingAppender::new(Polygons::default());
        appender.add_line(5.0, rect(0.0, 0.0, 1.0, 1.0, false), true);
        appender.add_line(-2.0, rect(0.0, 0.0, 1.0, 1.0, false), true);
        appender.add_line(3.0, rect(0.0, 0.0, 1.0, 1.0, false), true);
        let out = appender.finish();
        let levels: Vec<f64> = out.polygons.iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![-2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_band_bounds_passed_through() {
        let mut appender = PolygonRingAppender::new(Polygons::default());
        appender.add_band_ring(3.0, 5.0, rect(0.0, 0.0, 1.0, 1.0, false));
        appender.add_band_ring(f64::NEG_INFINITY, 3.0, rect(2.0, 0.0, 3.0, 1.0, false));
        let out = appender.finish();
        assert_eq!(out.floors, vec![f64::NEG_INFINITY, 3.0]);
        let levels: Vec<f64> = out.polygons.iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![3.0, 5.0]);
    }

    #[test]
    fn test_open_lines_and_orphan_holes_ignored() {
        let mut appender = PolygonRingAppender::new(Polygons::default());
        appender.add_line(1.0, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], false);
        appender.add_line(2.0, rect(0.0, 0.0, 1.0, 1.0, true), true);
        let out = appender.finish();
        assert!(out.calls.is_empty());
    }
}

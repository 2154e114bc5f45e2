//! High-level contour and isoband generation over in-memory grids.
//!
//! These wrap the streaming pipeline:
//!
//! ```text
//! rows ─► ContourGenerator ─► SegmentMerger ─► ContourCollector          (lines)
//!                                          └─► PolygonRingAppender ─► PolygonCollector (bands)
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ContourOptions;
use crate::contour_generator::ContourGenerator;
use crate::error::{ContourError, Result};
use crate::geometry::{LineString, Point};
use crate::level_generator::{IntervalLevelRangeIterator, LevelGenerator};
use crate::polygon_ring_appender::PolygonRingAppender;
use crate::segment_merger::SegmentMerger;
use crate::writer::{LineWriter, PolygonWriter};

/// A complete contour line (polyline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// All the polygons of one band, labelled by its upper level.
///
/// The band holds the values between `min_level` (the level below, `-inf`
/// under the first one) and `level`. Ring 0 of every part is the exterior,
/// the others are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isoband {
    pub min_level: f64,
    pub level: f64,
    pub parts: Vec<Vec<LineString>>,
}

/// Affine pixel to world transform.
///
/// `x = gt[0] + px * gt[1] + py * gt[2]`, `y = gt[3] + px * gt[4] + py * gt[5]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl Default for GeoTransform {
    fn default() -> Self {
        Self([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }
}

impl GeoTransform {
    pub fn apply(&self, p: Point) -> Point {
        let gt = &self.0;
        Point::new(
            gt[0] + p.x * gt[1] + p.y * gt[2],
            gt[3] + p.x * gt[4] + p.y * gt[5],
        )
    }

    fn apply_all(&self, points: &[Point]) -> LineString {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

/// Collects contour lines in world coordinates.
#[derive(Debug, Default)]
pub struct ContourCollector {
    transform: GeoTransform,
    contours: Vec<Contour>,
}

impl ContourCollector {
    pub fn new(transform: GeoTransform) -> Self {
        Self {
            transform,
            contours: Vec::new(),
        }
    }

    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }
}

impl LineWriter for ContourCollector {
    fn add_line(&mut self, level: f64, line: LineString, closed: bool) {
        let points = if self.transform == GeoTransform::default() {
            line
        } else {
            self.transform.apply_all(&line)
        };
        self.contours.push(Contour {
            level,
            points,
            closed,
        });
    }
}

/// Collects isoband polygons in world coordinates.
#[derive(Debug, Default)]
pub struct PolygonCollector {
    transform: GeoTransform,
    isobands: Vec<Isoband>,
    current: Option<Isoband>,
}

impl PolygonCollector {
    pub fn new(transform: GeoTransform) -> Self {
        Self {
            transform,
            isobands: Vec::new(),
            current: None,
        }
    }

    pub fn into_isobands(self) -> Vec<Isoband> {
        self.isobands
    }
}

impl PolygonWriter for PolygonCollector {
    fn start_polygon(&mut self, level: f64) {
        self.start_band(f64::NEG_INFINITY, level);
    }

    fn start_band(&mut self, min_level: f64, level: f64) {
        self.current = Some(Isoband {
            min_level,
            level,
            parts: Vec::new(),
        });
    }

    fn add_part(&mut self, ring: &LineString) {
        let ring = self.transform.apply_all(ring);
        if let Some(band) = self.current.as_mut() {
            band.parts.push(vec![ring]);
        }
    }

    fn add_interior_ring(&mut self, ring: &LineString) {
        let ring = self.transform.apply_all(ring);
        if let Some(part) = self.current.as_mut().and_then(|b| b.parts.last_mut()) {
            part.push(ring);
        }
    }

    fn end_polygon(&mut self) {
        if let Some(band) = self.current.take() {
            self.isobands.push(band);
        }
    }
}

/// A row-major grid borrowed for contouring.
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    pub data: &'a [f64],
    pub width: usize,
    pub height: usize,
}

impl<'a> Grid<'a> {
    pub fn new(data: &'a [f64], width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

fn check_grid(data: &[f64], width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || data.len() != width * height {
        return Err(ContourError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn transform_of(options: &ContourOptions) -> GeoTransform {
    options.geo_transform.map(GeoTransform).unwrap_or_default()
}

/// Generate contour lines for every configured level crossed by the data.
pub fn generate_contours(
    data: &[f64],
    width: usize,
    height: usize,
    options: &ContourOptions,
) -> Result<Vec<Contour>> {
    check_grid(data, width, height)?;
    let levels = options.build_levels()?;

    let collector = ContourCollector::new(transform_of(options));
    let merger = SegmentMerger::new(collector, &levels, false);
    let mut generator = ContourGenerator::new(width, height, options.no_data, merger, &levels)?;
    for row in data.chunks_exact(width) {
        generator.feed_line(row)?;
    }
    let contours = generator.finish()?.finish().into_contours();

    debug!(
        width = width,
        height = height,
        contours = contours.len(),
        closed = contours.iter().filter(|c| c.closed).count(),
        "generated contours"
    );
    Ok(contours)
}

/// Generate isoband polygons, one [`Isoband`] per band with data in it.
pub fn generate_isobands(
    data: &[f64],
    width: usize,
    height: usize,
    options: &ContourOptions,
) -> Result<Vec<Isoband>> {
    check_grid(data, width, height)?;
    let levels = options.build_levels()?;

    let collector = PolygonCollector::new(transform_of(options));
    let appender = PolygonRingAppender::new(collector);
    let merger = SegmentMerger::new(appender, &levels, true);
    let mut generator = ContourGenerator::new(width, height, options.no_data, merger, &levels)?;
    for row in data.chunks_exact(width) {
        generator.feed_line(row)?;
    }
    let isobands = generator.finish()?.finish().finish().into_isobands();

    debug!(
        width = width,
        height = height,
        bands = isobands.len(),
        rings = isobands
            .iter()
            .flat_map(|b| b.parts.iter())
            .map(Vec::len)
            .sum::<usize>(),
        "generated isobands"
    );
    Ok(isobands)
}

/// Contour independent grids in parallel, one generator per grid.
///
/// Results come back in the order of `grids`.
pub fn generate_contours_batch(
    grids: &[Grid<'_>],
    options: &ContourOptions,
) -> Vec<Result<Vec<Contour>>> {
    grids
        .par_iter()
        .map(|grid| generate_contours(grid.data, grid.width, grid.height, options))
        .collect()
}

/// Generate contour levels automatically based on data range and interval.
///
/// Returns every multiple of `interval` in `[min_value, max_value]`. Fails
/// with `IndexOverflow` when the multiples leave the `i32` index range.
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Result<Vec<f64>> {
    if max_value < min_value {
        return Ok(vec![]);
    }
    let levels = IntervalLevelRangeIterator::new(0.0, interval, None)?;
    let range = levels.range(min_value, max_value)?;
    // the range starts above `min_value`, keep a level sitting right on it
    let on_min = range
        .begin
        .checked_sub(1)
        .map(|idx| levels.level(idx))
        .filter(|&l| l >= min_value);
    Ok(on_min
        .into_iter()
        .chain(range.iter(&levels).map(|(_, l)| l))
        .filter(|&l| l >= min_value && l <= max_value)
        .collect())
}

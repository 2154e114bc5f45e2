//! Streaming marching squares: contour lines and isobands from raster rows.
//!
//! The pipeline is built from small stages connected by writer traits:
//! - [`ContourGenerator`] turns pairs of rows into [`Square`]s
//! - [`SegmentMerger`] stitches square segments into lines and rings
//! - [`PolygonRingAppender`] nests isoband rings into polygons with holes
//!
//! [`generate_contours`] and [`generate_isobands`] wire the stages together
//! for in-memory grids.

pub mod config;
pub mod contour;
pub mod contour_generator;
pub mod error;
pub mod geometry;
pub mod level_generator;
pub mod polygon_ring_appender;
pub mod segment_merger;
pub mod square;
pub mod utility;
pub mod writer;

pub use config::{ContourOptions, LevelConfig, Levels};
pub use contour::{
    generate_contour_levels, generate_contours, generate_contours_batch, generate_isobands,
    Contour, ContourCollector, GeoTransform, Grid, Isoband, PolygonCollector,
};
pub use contour_generator::ContourGenerator;
pub use error::{ContourError, Result};
pub use geometry::{LineString, Point, Segment, ValuedPoint};
pub use level_generator::{
    ExponentialLevelRangeIterator, FixedLevelRangeIterator, IntervalLevelRangeIterator,
    LevelGenerator, LevelRange,
};
pub use polygon_ring_appender::PolygonRingAppender;
pub use segment_merger::SegmentMerger;
pub use square::Square;
pub use writer::{LineWriter, PolygonWriter, SegmentWriter};

//! Error types for contour generation.

use thiserror::Error;

/// Errors that can occur while generating contours or isobands.
#[derive(Error, Debug)]
pub enum ContourError {
    /// A level range would enumerate more levels than allowed.
    #[error("too many levels: {count} levels requested (maximum is {max})")]
    TooManyLevels { count: i64, max: i64 },

    /// A level index does not fit in a 32-bit signed integer.
    #[error("level index overflow for value {0}")]
    IndexOverflow(f64),

    /// Invalid level configuration (non-positive interval, unsorted levels...).
    #[error("invalid levels: {0}")]
    InvalidLevels(String),

    /// The raster has a zero dimension.
    #[error("invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A fed row does not have the raster width.
    #[error("row has {actual} samples, expected {expected}")]
    RowWidthMismatch { expected: usize, actual: usize },

    /// More rows were fed than the raster height.
    #[error("all {height} rows have already been fed")]
    TooManyRows { height: usize },

    /// The generator was finished before every row was fed.
    #[error("generator finished after {fed} of {expected} rows")]
    MissingRows { expected: usize, fed: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ContourError {
    /// Create an InvalidLevels error.
    pub fn invalid_levels(msg: impl Into<String>) -> Self {
        Self::InvalidLevels(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is the level-count resource guard.
    ///
    /// Callers should abort the whole request on these, retrying with the
    /// same configuration fails the same way.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::TooManyLevels { .. } | Self::IndexOverflow(_))
    }
}

impl From<std::io::Error> for ContourError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ContourError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {}", err))
    }
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;

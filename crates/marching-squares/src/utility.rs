//! Numeric constants and the tie-break helper shared by every component.

/// Sentinel used as the level past the last configured one.
pub const INF: f64 = f64::INFINITY;

/// Relative tolerance under which a sample is considered to sit on a level.
pub const EPSILON: f64 = 1e-7;

/// Upper bound on the number of levels a single range may enumerate.
pub const MAX_NUMBER_LEVELS: i64 = 100_000;

/// Tolerance used around `level`.
///
/// Scaled by the distance to the lowest level (or by the level magnitude
/// when there is no finite lowest level) so that large elevations are not
/// compared below their float resolution.
#[inline]
pub fn tolerance(min_level: f64, level: f64) -> f64 {
    let span = if min_level.is_finite() {
        (level - min_level).abs()
    } else {
        level.abs()
    };
    if span.is_finite() {
        EPSILON * span.max(1.0)
    } else {
        EPSILON
    }
}

/// Nudge `value` above `level` when it sits within tolerance of it.
///
/// A sample equal to a level is treated as being on the high side of that
/// level, which keeps crossings off the square corners. The lowest level is
/// exempt: a sample sitting on it stays below, so the contour of the raster
/// floor runs through those samples instead of vanishing.
#[inline]
pub fn fudge(value: f64, min_level: f64, level: f64) -> f64 {
    if level == min_level {
        return value;
    }
    let tol = tolerance(min_level, level);
    if (level - value).abs() < tol {
        value + tol
    } else {
        value
    }
}

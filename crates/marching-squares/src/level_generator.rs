//! Level generators: map a continuous value range to the discrete levels it
//! crosses.
//!
//! Three strategies share the [`LevelGenerator`] contract:
//!
//! - [`FixedLevelRangeIterator`]: an explicit sorted list of levels
//! - [`IntervalLevelRangeIterator`]: `level(i) = i * interval + offset`
//! - [`ExponentialLevelRangeIterator`]: `level(i) = base^(i - 1)` for `i > 0`
//!
//! A range `[begin, end)` returned by `range(min, max)` holds the indices of
//! the levels `L` with `min < L <= max`, where a value equal to a level
//! counts as being above it (see [`fudge`]). The lowest level is the
//! exception: a value equal to it stays below, so `min == min_level` crosses
//! it.

use crate::error::{ContourError, Result};
use crate::utility::{fudge, INF, MAX_NUMBER_LEVELS};

/// A source of discrete, monotonically non-decreasing levels.
pub trait LevelGenerator {
    /// Level value at `idx`.
    fn level(&self, idx: i32) -> f64;

    /// Indices of the levels crossed by the value interval `[min, max]`.
    fn range(&self, min: f64, max: f64) -> Result<LevelRange>;

    /// Lowest configured level. Values equal to it are not nudged above it,
    /// and it scales the fudge tolerance of the other levels.
    fn min_level(&self) -> f64;

    /// Lower bound of the band whose upper level sits at `idx`.
    ///
    /// This is the level below `idx`, or `-inf` for the band under the first
    /// level.
    fn band_floor(&self, idx: i32) -> f64 {
        let level = self.level(idx);
        match idx.checked_sub(1).map(|below| self.level(below)) {
            Some(below) if below < level => below,
            _ => -INF,
        }
    }
}

impl<G: LevelGenerator + ?Sized> LevelGenerator for &G {
    fn level(&self, idx: i32) -> f64 {
        (**self).level(idx)
    }

    fn range(&self, min: f64, max: f64) -> Result<LevelRange> {
        (**self).range(min, max)
    }

    fn min_level(&self) -> f64 {
        (**self).min_level()
    }

    fn band_floor(&self, idx: i32) -> f64 {
        (**self).band_floor(idx)
    }
}

/// Half-open range of level indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub begin: i32,
    pub end: i32,
}

impl LevelRange {
    pub fn new(begin: i32, end: i32) -> Self {
        Self { begin, end }
    }

    /// Empty range positioned at `idx`.
    pub fn empty_at(idx: i32) -> Self {
        Self { begin: idx, end: idx }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    pub fn len(&self) -> usize {
        (self.end - self.begin).max(0) as usize
    }

    /// Lazily yields `(idx, level)` pairs. Can be called any number of times.
    pub fn iter<'a, G: LevelGenerator + ?Sized>(&self, levels: &'a G) -> LevelRangeIter<'a, G> {
        LevelRangeIter {
            levels,
            idx: self.begin,
            end: self.end,
        }
    }
}

/// Iterator over the `(idx, level)` pairs of a [`LevelRange`].
pub struct LevelRangeIter<'a, G: ?Sized> {
    levels: &'a G,
    idx: i32,
    end: i32,
}

impl<G: LevelGenerator + ?Sized> Iterator for LevelRangeIter<'_, G> {
    type Item = (i32, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.end {
            return None;
        }
        let idx = self.idx;
        self.idx += 1;
        Some((idx, self.levels.level(idx)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.idx).max(0) as usize;
        (n, Some(n))
    }
}

impl<G: LevelGenerator + ?Sized> ExactSizeIterator for LevelRangeIter<'_, G> {}

/// Convert a floating index to `i32`, failing outside the representable range.
fn to_index(value: f64) -> Result<i32> {
    if value.is_nan() || value <= i32::MIN as f64 || value >= i32::MAX as f64 {
        return Err(ContourError::IndexOverflow(value));
    }
    Ok(value as i32)
}

fn check_count(begin: i32, end: i32) -> Result<()> {
    let count = end as i64 - begin as i64;
    if count > MAX_NUMBER_LEVELS {
        return Err(ContourError::TooManyLevels {
            count,
            max: MAX_NUMBER_LEVELS,
        });
    }
    Ok(())
}

/// Shared range computation, given index lookups for "first level >= v"
/// and "first level > v".
fn fudged_range<G, A, B>(
    levels: &G,
    min: f64,
    max: f64,
    first_at_or_above: A,
    first_above: B,
) -> Result<LevelRange>
where
    G: LevelGenerator + ?Sized,
    A: Fn(f64) -> Result<i32>,
    B: Fn(f64) -> Result<i32>,
{
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    let min_level = levels.min_level();

    // a level equal to `min` is not crossed, skip it (fudge keeps the
    // lowest level)
    let mut begin = first_at_or_above(min)?;
    let fudged = fudge(min, min_level, levels.level(begin));
    if fudged > min {
        begin = first_at_or_above(fudged)?;
    }

    if min == max {
        return Ok(LevelRange::empty_at(begin));
    }

    // a level just above `max` but within tolerance is crossed, include it
    let mut end = first_above(max)?;
    let fudged = fudge(max, min_level, levels.level(end));
    if fudged > max {
        end = first_above(fudged)?;
    }

    check_count(begin, end)?;
    Ok(LevelRange::new(begin, end.max(begin)))
}

// ============================================================================
// Fixed levels
// ============================================================================

/// Explicit sorted list of levels.
#[derive(Debug, Clone)]
pub struct FixedLevelRangeIterator {
    levels: Vec<f64>,
    min_level: f64,
    max_level: f64,
}

impl FixedLevelRangeIterator {
    /// Create from a sorted list of levels.
    ///
    /// `min_level` defaults to `-inf` and `max_level` (returned past the last
    /// level) to `+inf`.
    pub fn new(levels: Vec<f64>, min_level: Option<f64>, max_level: Option<f64>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ContourError::invalid_levels("at least one fixed level is required"));
        }
        if levels.iter().any(|l| !l.is_finite()) {
            return Err(ContourError::invalid_levels("fixed levels must be finite"));
        }
        if levels.windows(2).any(|w| w[0] > w[1]) {
            return Err(ContourError::invalid_levels(
                "fixed levels must be sorted in increasing order",
            ));
        }
        if levels.len() as i64 > MAX_NUMBER_LEVELS {
            return Err(ContourError::TooManyLevels {
                count: levels.len() as i64,
                max: MAX_NUMBER_LEVELS,
            });
        }
        let max_level = max_level.unwrap_or(INF);
        if let Some(&last) = levels.last() {
            if max_level < last {
                return Err(ContourError::invalid_levels(format!(
                    "max level {} is below the last fixed level {}",
                    max_level, last
                )));
            }
        }
        Ok(Self {
            levels,
            min_level: min_level.unwrap_or(-INF),
            max_level,
        })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn max_level(&self) -> f64 {
        self.max_level
    }

    fn count(&self) -> i32 {
        self.levels.len() as i32
    }
}

impl LevelGenerator for FixedLevelRangeIterator {
    fn level(&self, idx: i32) -> f64 {
        if idx < 0 {
            return self.levels.first().copied().unwrap_or(self.max_level);
        }
        self.levels
            .get(idx as usize)
            .copied()
            .unwrap_or(self.max_level)
    }

    fn range(&self, min: f64, max: f64) -> Result<LevelRange> {
        fudged_range(
            self,
            min,
            max,
            |v| Ok(self.levels.partition_point(|&l| l < v) as i32),
            |v| Ok(self.levels.partition_point(|&l| l <= v) as i32),
        )
        .map(|r| LevelRange::new(r.begin.min(self.count()), r.end.min(self.count())))
    }

    fn min_level(&self) -> f64 {
        self.min_level
    }
}

// ============================================================================
// Regular interval
// ============================================================================

/// Levels regularly spaced by `interval`, shifted by `offset`.
#[derive(Debug, Clone, Copy)]
pub struct IntervalLevelRangeIterator {
    offset: f64,
    interval: f64,
    min_level: f64,
}

impl IntervalLevelRangeIterator {
    pub fn new(offset: f64, interval: f64, min_level: Option<f64>) -> Result<Self> {
        if !(interval > 0.0) || !interval.is_finite() {
            return Err(ContourError::invalid_levels(format!(
                "interval must be positive and finite, got {}",
                interval
            )));
        }
        if !offset.is_finite() {
            return Err(ContourError::invalid_levels("offset must be finite"));
        }
        Ok(Self {
            offset,
            interval,
            min_level: min_level.unwrap_or(-INF),
        })
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn first_at_or_above(&self, v: f64) -> Result<i32> {
        let mut i = to_index(((v - self.offset) / self.interval).ceil())?;
        // the division may round across a level
        if i > i32::MIN && self.level(i - 1) >= v {
            i -= 1;
        } else if i < i32::MAX && self.level(i) < v {
            i += 1;
        }
        Ok(i)
    }

    fn first_above(&self, v: f64) -> Result<i32> {
        let mut i = to_index(((v - self.offset) / self.interval).floor() + 1.0)?;
        if i > i32::MIN && self.level(i - 1) > v {
            i -= 1;
        } else if i < i32::MAX && self.level(i) <= v {
            i += 1;
        }
        Ok(i)
    }
}

impl LevelGenerator for IntervalLevelRangeIterator {
    fn level(&self, idx: i32) -> f64 {
        idx as f64 * self.interval + self.offset
    }

    fn range(&self, min: f64, max: f64) -> Result<LevelRange> {
        fudged_range(
            self,
            min,
            max,
            |v| self.first_at_or_above(v),
            |v| self.first_above(v),
        )
    }

    fn min_level(&self) -> f64 {
        self.min_level
    }
}

// ============================================================================
// Exponential
// ============================================================================

/// Levels `0, 1, base, base^2, ...`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialLevelRangeIterator {
    base: f64,
    ln_base: f64,
    min_level: f64,
}

impl ExponentialLevelRangeIterator {
    pub fn new(base: f64, min_level: Option<f64>) -> Result<Self> {
        if !(base > 1.0) || !base.is_finite() {
            return Err(ContourError::invalid_levels(format!(
                "exponential base must be finite and greater than 1, got {}",
                base
            )));
        }
        Ok(Self {
            base,
            ln_base: base.ln(),
            min_level: min_level.unwrap_or(0.0),
        })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Exponent index of `v >= 1`, `log_base(v) + 1`.
    fn raw_index(&self, v: f64) -> f64 {
        v.ln() / self.ln_base + 1.0
    }

    fn first_at_or_above(&self, v: f64) -> Result<i32> {
        if v <= 0.0 {
            return Ok(0);
        }
        if v <= 1.0 {
            return Ok(1);
        }
        let mut i = to_index(self.raw_index(v).ceil())?;
        if i > 1 && self.level(i - 1) >= v {
            i -= 1;
        } else if i < i32::MAX && self.level(i) < v {
            i += 1;
        }
        Ok(i)
    }

    fn first_above(&self, v: f64) -> Result<i32> {
        if v < 0.0 {
            return Ok(0);
        }
        if v < 1.0 {
            return Ok(1);
        }
        let mut i = to_index(self.raw_index(v).floor() + 1.0)?;
        if i > 1 && self.level(i - 1) > v {
            i -= 1;
        } else if i < i32::MAX && self.level(i) <= v {
            i += 1;
        }
        Ok(i)
    }
}

impl LevelGenerator for ExponentialLevelRangeIterator {
    fn level(&self, idx: i32) -> f64 {
        if idx <= 0 {
            0.0
        } else {
            self.base.powi(idx - 1)
        }
    }

    fn range(&self, min: f64, max: f64) -> Result<LevelRange> {
        fudged_range(
            self,
            min,
            max,
            |v| self.first_at_or_above(v),
            |v| self.first_above(v),
        )
    }

    fn min_level(&self) -> f64 {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<G: LevelGenerator>(g: &G, min: f64, max: f64) -> Vec<(i32, f64)> {
        g.range(min, max).unwrap().iter(g).collect()
    }

    #[test]
    fn test_fixed_levels() {
        let levels = FixedLevelRangeIterator::new(vec![3.0, 5.0, 7.0], None, None).unwrap();
        assert_eq!(levels.level(0), 3.0);
        assert_eq!(levels.level(2), 7.0);
        assert_eq!(levels.level(3), f64::INFINITY);
        assert_eq!(collect(&levels, 1.0, 6.0), vec![(0, 3.0), (1, 5.0)]);
        assert_eq!(collect(&levels, 6.0, 1.0), vec![(0, 3.0), (1, 5.0)]);
        // a level equal to max is crossed, one equal to min is not
        assert_eq!(collect(&levels, 3.0, 5.0), vec![(1, 5.0)]);
        assert!(collect(&levels, 8.0, 9.0).is_empty());
    }

    #[test]
    fn test_fixed_max_level() {
        let levels = FixedLevelRangeIterator::new(vec![1.0, 2.0], None, Some(10.0)).unwrap();
        assert_eq!(levels.level(5), 10.0);
        assert!(FixedLevelRangeIterator::new(vec![1.0, 20.0], None, Some(10.0)).is_err());
    }

    #[test]
    fn test_fixed_degenerate_range() {
        let levels = FixedLevelRangeIterator::new(vec![3.0, 5.0, 7.0], None, None).unwrap();
        assert_eq!(levels.range(4.0, 4.0).unwrap(), LevelRange::empty_at(1));
        assert_eq!(levels.range(5.0, 5.0).unwrap(), LevelRange::empty_at(2));
        assert_eq!(levels.range(9.0, 9.0).unwrap(), LevelRange::empty_at(3));
    }

    #[test]
    fn test_fixed_rejects_unsorted() {
        assert!(FixedLevelRangeIterator::new(vec![3.0, 1.0], None, None).is_err());
        assert!(FixedLevelRangeIterator::new(vec![f64::NAN], None, None).is_err());
    }

    #[test]
    fn test_interval_levels() {
        let levels = IntervalLevelRangeIterator::new(0.0, 10.0, None).unwrap();
        assert_eq!(levels.level(0), 0.0);
        assert_eq!(levels.level(-2), -20.0);
        assert_eq!(
            collect(&levels, -5.0, 25.0),
            vec![(0, 0.0), (1, 10.0), (2, 20.0)]
        );
        assert_eq!(collect(&levels, 0.0, 10.0), vec![(1, 10.0)]);
        assert_eq!(levels.range(2.0, 2.0).unwrap(), LevelRange::empty_at(1));
    }

    #[test]
    fn test_interval_offset() {
        let levels = IntervalLevelRangeIterator::new(8.0, 10.0, None).unwrap();
        assert_eq!(collect(&levels, 5.0, 10.0), vec![(0, 8.0)]);
        assert_eq!(levels.range(5.0, 5.0).unwrap(), LevelRange::empty_at(0));
        assert_eq!(levels.range(10.0, 10.0).unwrap(), LevelRange::empty_at(1));
        assert_eq!(levels.level(1), 18.0);
    }

    #[test]
    fn test_interval_fudge_near_level() {
        let levels = IntervalLevelRangeIterator::new(0.0, 10.0, None).unwrap();
        // slightly below a level is treated as sitting on it
        assert_eq!(collect(&levels, 5.0, 10.0 - 1e-9), vec![(1, 10.0)]);
        // slightly above a level as min does not cross it
        assert!(collect(&levels, 10.0 - 1e-9, 15.0).is_empty());
    }

    #[test]
    fn test_interval_rejects_bad_config() {
        assert!(IntervalLevelRangeIterator::new(0.0, 0.0, None).is_err());
        assert!(IntervalLevelRangeIterator::new(0.0, -1.0, None).is_err());
        assert!(IntervalLevelRangeIterator::new(f64::NAN, 1.0, None).is_err());
    }

    #[test]
    fn test_interval_too_many_levels() {
        let levels = IntervalLevelRangeIterator::new(0.0, 1.0, None).unwrap();
        let r = levels.range(0.5, 100_000.5).unwrap();
        assert_eq!(r.len(), 100_000);
        let err = levels.range(0.5, 100_001.5).unwrap_err();
        assert!(matches!(err, ContourError::TooManyLevels { count: 100_001, .. }));
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn test_interval_index_overflow() {
        let levels = IntervalLevelRangeIterator::new(0.0, 1e-3, None).unwrap();
        let err = levels.range(0.0, 1e12).unwrap_err();
        assert!(matches!(err, ContourError::IndexOverflow(_)));
    }

    #[test]
    fn test_exponential_levels() {
        let levels = ExponentialLevelRangeIterator::new(10.0, None).unwrap();
        assert_eq!(levels.level(-3), 0.0);
        assert_eq!(levels.level(0), 0.0);
        assert_eq!(levels.level(1), 1.0);
        assert_eq!(levels.level(2), 10.0);
        assert_eq!(levels.level(4), 1000.0);
        assert_eq!(
            collect(&levels, -1.0, 150.0),
            vec![(0, 0.0), (1, 1.0), (2, 10.0), (3, 100.0)]
        );
        assert_eq!(collect(&levels, 10.0, 100.0), vec![(3, 100.0)]);
        assert_eq!(levels.range(50.0, 50.0).unwrap(), LevelRange::empty_at(3));
    }

    #[test]
    fn test_exponential_too_many_levels() {
        let levels = ExponentialLevelRangeIterator::new(1.00001, None).unwrap();
        // 1.00001^200000 is about e^2, far beyond 100,000 levels above 1
        let err = levels.range(0.5, 7.5).unwrap_err();
        assert!(matches!(err, ContourError::TooManyLevels { .. }));
        assert!(levels.range(0.5, 1.5).is_ok());
    }

    #[test]
    fn test_band_floor() {
        let fixed = FixedLevelRangeIterator::new(vec![3.0, 5.0], None, None).unwrap();
        assert_eq!(fixed.band_floor(0), f64::NEG_INFINITY);
        assert_eq!(fixed.band_floor(1), 3.0);
        // the band above the last level
        assert_eq!(fixed.band_floor(2), 5.0);

        let interval = IntervalLevelRangeIterator::new(1.0, 2.0, None).unwrap();
        assert_eq!(interval.band_floor(0), -1.0);
        assert_eq!(interval.band_floor(-3), -7.0);

        let exponential = ExponentialLevelRangeIterator::new(10.0, None).unwrap();
        assert_eq!(exponential.band_floor(0), f64::NEG_INFINITY);
        assert_eq!(exponential.band_floor(1), 0.0);
        assert_eq!(exponential.band_floor(3), 10.0);
    }

    #[test]
    fn test_exponential_exactly_max_levels() {
        let base = 1.0001;
        let levels = ExponentialLevelRangeIterator::new(base, None).unwrap();
        // halfway in log space between level 100,000 and 100,001
        let r = levels.range(0.5, base.powf(99_999.5)).unwrap();
        assert_eq!(r, LevelRange::new(1, 100_001));
        assert_eq!(r.len(), 100_000);
        let err = levels.range(0.5, base.powf(100_000.5)).unwrap_err();
        assert!(matches!(err, ContourError::TooManyLevels { count: 100_001, .. }));
    }

    #[test]
    fn test_range_includes_min_level() {
        let levels = FixedLevelRangeIterator::new(vec![0.0, 5.0, 10.0], Some(0.0), None).unwrap();
        assert_eq!(collect(&levels, 0.0, 5.0), vec![(0, 0.0), (1, 5.0)]);
        // other levels equal to min are still skipped
        assert_eq!(collect(&levels, 5.0, 10.0), vec![(2, 10.0)]);
    }

    #[test]
    fn test_range_iter_is_restartable() {
        let levels = IntervalLevelRangeIterator::new(0.0, 1.0, None).unwrap();
        let r = levels.range(0.5, 3.5).unwrap();
        let first: Vec<_> = r.iter(&levels).collect();
        let second: Vec<_> = r.iter(&levels).collect();
        assert_eq!(first, second);
        assert_eq!(r.iter(&levels).len(), 3);
    }

    #[test]
    fn test_range_monotonic_and_contained() {
        let interval = IntervalLevelRangeIterator::new(0.3, 1.7, None).unwrap();
        let exponential = ExponentialLevelRangeIterator::new(2.0, None).unwrap();
        let fixed =
            FixedLevelRangeIterator::new(vec![-4.0, -1.0, 0.5, 2.0, 9.0], None, None).unwrap();
        let generators: Vec<&dyn LevelGenerator> = vec![&interval, &exponential, &fixed];
        let bounds = [(-5.0, 10.0), (0.0, 3.0), (1.1, 1.2), (-2.0, 0.7)];
        for g in &generators {
            for &(a, b) in &bounds {
                let levels: Vec<(i32, f64)> = g.range(a, b).unwrap().iter(*g).collect();
                for w in levels.windows(2) {
                    assert_eq!(w[1].0, w[0].0 + 1);
                    assert!(w[1].1 >= w[0].1);
                }
                for (_, l) in levels {
                    // the lowest level is crossed by a range starting on it
                    let above_min = l > a || (l == a && l == g.min_level());
                    assert!(above_min && l <= b, "level {} outside ({}, {}]", l, a, b);
                }
            }
        }
    }
}

//! Contouring options, loadable from JSON.
//!
//! ```json
//! {
//!   "levels": { "type": "interval", "interval": 10.0, "offset": 0.0 },
//!   "no_data": -9999.0,
//!   "geo_transform": [440720.0, 60.0, 0.0, 3751320.0, 0.0, -60.0]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};
use crate::level_generator::{
    ExponentialLevelRangeIterator, FixedLevelRangeIterator, IntervalLevelRangeIterator,
    LevelGenerator, LevelRange,
};

/// How contour levels are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevelConfig {
    /// Explicit sorted levels.
    Fixed {
        levels: Vec<f64>,
        #[serde(default)]
        min_level: Option<f64>,
        #[serde(default)]
        max_level: Option<f64>,
    },
    /// `offset + k * interval` for every integer `k`.
    Interval {
        interval: f64,
        #[serde(default)]
        offset: f64,
        #[serde(default)]
        min_level: Option<f64>,
    },
    /// `0, 1, base, base^2, ...`
    Exponential {
        base: f64,
        #[serde(default)]
        min_level: Option<f64>,
    },
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::Interval {
            interval: 10.0,
            offset: 0.0,
            min_level: None,
        }
    }
}

/// Options shared by the contour and isoband entry points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourOptions {
    #[serde(default)]
    pub levels: LevelConfig,
    /// Sample value treated as missing data.
    #[serde(default)]
    pub no_data: Option<f64>,
    /// Affine pixel to world transform applied to output coordinates.
    #[serde(default)]
    pub geo_transform: Option<[f64; 6]>,
}

impl ContourOptions {
    /// Levels every `interval`, shifted by `offset`.
    pub fn interval(interval: f64, offset: f64) -> Self {
        Self {
            levels: LevelConfig::Interval {
                interval,
                offset,
                min_level: None,
            },
            ..Default::default()
        }
    }

    /// Explicit sorted levels.
    pub fn fixed(levels: Vec<f64>) -> Self {
        Self {
            levels: LevelConfig::Fixed {
                levels,
                min_level: None,
                max_level: None,
            },
            ..Default::default()
        }
    }

    /// Exponential levels of `base`.
    pub fn exponential(base: f64) -> Self {
        Self {
            levels: LevelConfig::Exponential {
                base,
                min_level: None,
            },
            ..Default::default()
        }
    }

    pub fn with_no_data(mut self, no_data: f64) -> Self {
        self.no_data = Some(no_data);
        self
    }

    pub fn with_geo_transform(mut self, geo_transform: [f64; 6]) -> Self {
        self.geo_transform = Some(geo_transform);
        self
    }

    /// Parse options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if let Some(gt) = &self.geo_transform {
            if gt.iter().any(|c| !c.is_finite()) {
                return Err(ContourError::config("geo_transform coefficients must be finite"));
            }
            if gt[1] * gt[5] - gt[2] * gt[4] == 0.0 {
                return Err(ContourError::config("geo_transform is not invertible"));
            }
        }
        if let Some(nd) = self.no_data {
            if nd.is_nan() {
                return Err(ContourError::config(
                    "no_data must not be NaN, NaN samples are always missing",
                ));
            }
        }
        // level constructors carry the level checks
        self.build_levels().map(|_| ())
    }

    /// Build the level generator described by these options.
    pub fn build_levels(&self) -> Result<Levels> {
        match &self.levels {
            LevelConfig::Fixed {
                levels,
                min_level,
                max_level,
            } => Ok(Levels::Fixed(FixedLevelRangeIterator::new(
                levels.clone(),
                *min_level,
                *max_level,
            )?)),
            LevelConfig::Interval {
                interval,
                offset,
                min_level,
            } => Ok(Levels::Interval(IntervalLevelRangeIterator::new(
                *offset, *interval, *min_level,
            )?)),
            LevelConfig::Exponential { base, min_level } => Ok(Levels::Exponential(
                ExponentialLevelRangeIterator::new(*base, *min_level)?,
            )),
        }
    }
}

/// Any of the level generators, chosen at runtime.
#[derive(Debug, Clone)]
pub enum Levels {
    Fixed(FixedLevelRangeIterator),
    Interval(IntervalLevelRangeIterator),
    Exponential(ExponentialLevelRangeIterator),
}

impl LevelGenerator for Levels {
    fn level(&self, idx: i32) -> f64 {
        match self {
            Levels::Fixed(g) => g.level(idx),
            Levels::Interval(g) => g.level(idx),
            Levels::Exponential(g) => g.level(idx),
        }
    }

    fn range(&self, min: f64, max: f64) -> Result<LevelRange> {
        match self {
            Levels::Fixed(g) => g.range(min, max),
            Levels::Interval(g) => g.range(min, max),
            Levels::Exponential(g) => g.range(min, max),
        }
    }

    fn min_level(&self) -> f64 {
        match self {
            Levels::Fixed(g) => g.min_level(),
            Levels::Interval(g) => g.min_level(),
            Levels::Exponential(g) => g.min_level(),
        }
    }
}

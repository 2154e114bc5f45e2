//! Row-streaming driver feeding squares to a [`SegmentWriter`].
//!
//! Only the previous row is kept in memory. The raster is padded with no
//! data on every side (a NaN row above the first row and below the last,
//! a NaN column on the left and right), so the outermost squares produce
//! the border segments that close isobands along the raster edge.

use tracing::{debug, trace};

use crate::error::{ContourError, Result};
use crate::geometry::ValuedPoint;
use crate::level_generator::LevelGenerator;
use crate::square::{borders, Square};
use crate::writer::SegmentWriter;

/// Streaming marching squares over a `width` x `height` raster.
pub struct ContourGenerator<'a, W, G: ?Sized> {
    width: usize,
    height: usize,
    no_data: Option<f64>,
    previous_line: Vec<f64>,
    current_line: Vec<f64>,
    line_idx: usize,
    writer: W,
    levels: &'a G,
}

impl<'a, W: SegmentWriter, G: LevelGenerator + ?Sized> ContourGenerator<'a, W, G> {
    /// Create a generator. Samples equal to `no_data` are treated as missing.
    pub fn new(
        width: usize,
        height: usize,
        no_data: Option<f64>,
        writer: W,
        levels: &'a G,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ContourError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            no_data,
            previous_line: vec![f64::NAN; width],
            current_line: vec![f64::NAN; width],
            line_idx: 0,
            writer,
            levels,
        })
    }

    /// Number of rows fed so far.
    pub fn rows_fed(&self) -> usize {
        self.line_idx
    }

    /// Feed the next raster row, top to bottom.
    pub fn feed_line(&mut self, line: &[f64]) -> Result<()> {
        if self.line_idx >= self.height {
            return Err(ContourError::TooManyRows {
                height: self.height,
            });
        }
        if line.len() != self.width {
            return Err(ContourError::RowWidthMismatch {
                expected: self.width,
                actual: line.len(),
            });
        }

        let no_data = self.no_data;
        for (dst, &value) in self.current_line.iter_mut().zip(line) {
            *dst = match no_data {
                Some(nd) if value == nd => f64::NAN,
                _ => value,
            };
        }

        trace!(row = self.line_idx, "processing raster row");
        self.writer.beginning_of_line();
        self.process_line()?;
        self.writer.end_of_line();

        std::mem::swap(&mut self.previous_line, &mut self.current_line);
        self.line_idx += 1;

        if self.line_idx == self.height {
            // close everything against the no-data row below the raster
            self.current_line.fill(f64::NAN);
            self.writer.beginning_of_line();
            self.process_line()?;
            self.writer.end_of_line();
        }
        Ok(())
    }

    /// Return the writer once every row has been fed.
    pub fn finish(self) -> Result<W> {
        if self.line_idx < self.height {
            return Err(ContourError::MissingRows {
                expected: self.height,
                fed: self.line_idx,
            });
        }
        debug!(
            width = self.width,
            height = self.height,
            "contour generator finished"
        );
        Ok(self.writer)
    }

    /// Process the squares between `previous_line` and `current_line`.
    ///
    /// Pixel centers sit at half-integer coordinates: the previous row at
    /// `y = line_idx - 0.5`, the current one at `y = line_idx + 0.5`.
    fn process_line(&mut self) -> Result<()> {
        let Self {
            width,
            previous_line,
            current_line,
            line_idx,
            writer,
            levels,
            ..
        } = self;
        let width = *width as isize;
        let previous: &[f64] = previous_line;
        let current: &[f64] = current_line;
        let upper_y = *line_idx as f64 - 0.5;
        let lower_y = *line_idx as f64 + 0.5;
        let sample = |line: &[f64], col: isize| -> f64 {
            if col < 0 || col >= width {
                f64::NAN
            } else {
                line[col as usize]
            }
        };

        for col in -1..width {
            let ul = sample(previous, col);
            let ur = sample(previous, col + 1);
            let ll = sample(current, col);
            let lr = sample(current, col + 1);
            if ul.is_nan() && ur.is_nan() && ll.is_nan() && lr.is_nan() {
                continue;
            }
            let left_x = col as f64 + 0.5;
            let right_x = col as f64 + 1.5;
            let square = Square::new(
                ValuedPoint::new(left_x, upper_y, ul),
                ValuedPoint::new(right_x, upper_y, ur),
                ValuedPoint::new(left_x, lower_y, ll),
                ValuedPoint::new(right_x, lower_y, lr),
                borders::NONE,
                false,
            );
            square.process(*levels, writer)?;
        }
        Ok(())
    }
}

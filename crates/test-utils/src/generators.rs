//! Raster generators for contouring tests and benchmarks.
//!
//! All grids are `Vec<f64>` in row-major order (row 0 first).

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `value` - Value of every other cell
/// * `nan_positions` - List of (col, row) positions that should be NaN
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    value: f64,
    nan_positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = vec![value; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}

/// Creates a grid increasing linearly from left to right: `col * step`.
pub fn create_ramp_grid(width: usize, height: usize, step: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..height {
        for col in 0..width {
            data.push(col as f64 * step);
        }
    }
    data
}

/// Creates concentric square plateaus.
///
/// The outermost ring of cells gets `values[0]`, the next one `values[1]`
/// and so on; cells deeper than the list keep the last value.
///
/// ```
/// use test_utils::create_plateau_grid;
///
/// let grid = create_plateau_grid(5, 5, &[2.0, 4.0, 6.0]);
/// assert_eq!(grid[0], 2.0);
/// assert_eq!(grid[6], 4.0);
/// assert_eq!(grid[12], 6.0);
/// ```
pub fn create_plateau_grid(width: usize, height: usize, values: &[f64]) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let depth = row.min(col).min(height - 1 - row).min(width - 1 - col);
            let value = values
                .get(depth)
                .or(values.last())
                .copied()
                .unwrap_or(0.0);
            data.push(value);
        }
    }
    data
}

/// Creates a smooth hill peaking at `peak` in the middle of the grid.
pub fn create_hill_grid(width: usize, height: usize, peak: f64) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let sigma = (width.min(height) as f64 / 4.0).max(1.0);
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            data.push(peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp());
        }
    }
    data
}

/// Creates a wavy surface, `sin(x) * cos(y)` scaled to `amplitude`.
///
/// Produces many closed contours and saddle cells.
pub fn create_wave_grid(width: usize, height: usize, amplitude: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 * 0.3;
            let y = row as f64 * 0.3;
            data.push(amplitude * x.sin() * y.cos());
        }
    }
    data
}

/// Creates a grid with deterministic pseudo-random values in `[0, max)`.
pub fn create_noise_grid(width: usize, height: usize, max: f64, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            data.push((hash % 100_000) as f64 / 100_000.0 * max);
        }
    }
    data
}

/// Creates a grid of deterministic pseudo-random whole numbers in `0..count`.
///
/// With unit-spaced levels every sample sits exactly on a level.
pub fn create_integer_grid(width: usize, height: usize, count: u32, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(f64::from(simple_hash(col as u32, row as u32, seed) % count.max(1)));
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_constant_grid() {
        let grid = create_constant_grid(10, 10, 42.0);
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, 1.0, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan()); // (0, 0)
        assert!(grid[55].is_nan()); // (5, 5) = row 5 * 10 + col 5
        assert_eq!(grid[1], 1.0);
    }

    #[test]
    fn test_create_ramp_grid() {
        let grid = create_ramp_grid(4, 2, 0.5);
        assert_eq!(grid, vec![0.0, 0.5, 1.0, 1.5, 0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_create_plateau_grid() {
        let grid = create_plateau_grid(5, 5, &[2.0, 4.0, 6.0]);
        #[rustfmt::skip]
        let expected = vec![
            2.0, 2.0, 2.0, 2.0, 2.0,
            2.0, 4.0, 4.0, 4.0, 2.0,
            2.0, 4.0, 6.0, 4.0, 2.0,
            2.0, 4.0, 4.0, 4.0, 2.0,
            2.0, 2.0, 2.0, 2.0, 2.0,
        ];
        assert_eq!(grid, expected);
    }

    #[test]
    fn test_create_hill_grid() {
        let grid = create_hill_grid(21, 21, 100.0);
        let center = grid[10 * 21 + 10];
        assert!((center - 100.0).abs() < 1e-9);
        assert!(grid[0] < center);
    }

    #[test]
    fn test_noise_deterministic() {
        let grid1 = create_noise_grid(50, 50, 10.0, 42);
        let grid2 = create_noise_grid(50, 50, 10.0, 42);
        assert_eq!(grid1, grid2, "Same seed should produce same data");

        let grid3 = create_noise_grid(50, 50, 10.0, 43);
        assert_ne!(grid1, grid3, "Different seed should produce different data");
        assert!(grid1.iter().all(|&v| (0.0..10.0).contains(&v)));
    }

    #[test]
    fn test_create_integer_grid() {
        let grid = create_integer_grid(6, 4, 5, 1);
        assert_eq!(grid.len(), 24);
        assert!(grid.iter().all(|&v| v.fract() == 0.0 && (0.0..5.0).contains(&v)));
        assert_eq!(grid, create_integer_grid(6, 4, 5, 1));
    }
}

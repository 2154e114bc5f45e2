//! Common test fixtures for contouring tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// Small rasters with well-known contouring results.
pub mod rasters {
    /// Two high cells on one diagonal, two low ones on the other.
    ///
    /// With levels at `8 + 10k` the center average (7.5) is below 8, so the
    /// two high cells form separate rings.
    pub const SADDLE: [f64; 4] = [5.0, 10.0, 10.0, 5.0];

    /// A single cell raster.
    pub const SINGLE_PIXEL: [f64; 1] = [2.0];

    /// Outline of [`SINGLE_PIXEL`] as an isoband ring, as `(x, y)` pairs in
    /// pixel space starting from the upper left corner.
    pub const SINGLE_PIXEL_RING: [(f64, f64); 9] = [
        (0.0, 0.0),
        (0.5, 0.0),
        (1.0, 0.0),
        (1.0, 0.5),
        (1.0, 1.0),
        (0.5, 1.0),
        (0.0, 1.0),
        (0.0, 0.5),
        (0.0, 0.0),
    ];
}

/// JSON option documents.
pub mod options {
    pub const INTERVAL_10: &str = r#"{ "levels": { "type": "interval", "interval": 10.0 } }"#;

    pub const FIXED_WITH_NO_DATA: &str = r#"{
        "levels": { "type": "fixed", "levels": [1.0, 2.0, 3.0] },
        "no_data": -9999.0
    }"#;

    pub const EXPONENTIAL_GEOREFERENCED: &str = r#"{
        "levels": { "type": "exponential", "base": 10.0 },
        "geo_transform": [100.0, 2.0, 0.0, 50.0, 0.0, -2.0]
    }"#;
}

/// Write `content` to a temporary file, removed when the handle is dropped.
pub fn write_temp_file(content: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

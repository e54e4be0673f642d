//! Raster grid geometry: geographic bounds, pixel addressing, metre scale.
//! Coordinate math uses f64; band values elsewhere use f32.

use serde::{Deserialize, Serialize};

/// Metres per degree of latitude (and of longitude at the equator).
pub const METRES_PER_DEGREE: f64 = 111_320.0;

/// A row-major grid over a geographic bounding box.
///
/// Row 0 is the northernmost row, matching the scanline order of the source
/// imagery. Every raster and mask in one analysis must share the same
/// GridSpec; band math across mismatched grids is refused upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GridSpec {
    pub fn new(
        width: usize,
        height: usize,
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
    ) -> Self {
        Self { width, height, min_lon, max_lon, min_lat, max_lat }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Longitude of the centre of column `col`.
    #[inline]
    pub fn pixel_lon(&self, col: usize) -> f64 {
        self.min_lon + (col as f64 + 0.5) / self.width as f64 * (self.max_lon - self.min_lon)
    }

    /// Latitude of the centre of row `row` (row 0 = north edge).
    #[inline]
    pub fn pixel_lat(&self, row: usize) -> f64 {
        self.max_lat - (row as f64 + 0.5) / self.height as f64 * (self.max_lat - self.min_lat)
    }

    /// Grid cell containing (lon, lat), or None outside the bounds.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if lon < self.min_lon || lon > self.max_lon || lat < self.min_lat || lat > self.max_lat {
            return None;
        }
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let fx = (lon - self.min_lon) / (self.max_lon - self.min_lon) * self.width as f64;
        let fy = (self.max_lat - lat) / (self.max_lat - self.min_lat) * self.height as f64;
        let col = (fx as usize).min(self.width - 1);
        let row = (fy as usize).min(self.height - 1);
        Some((row, col))
    }

    /// Isotropic cellsize in metres derived from the geographic bounds:
    ///   cellsize_y = lat_extent / height × 111 320 m/°
    ///   cellsize_x = lon_extent / width  × 111 320 × cos(mid_lat) m/°
    ///   cellsize   = (cellsize_y + cellsize_x) / 2
    ///
    /// Falls back to 30 m when the bounds are degenerate (zero extent).
    pub fn cellsize_m(&self) -> f64 {
        let lat_extent = (self.max_lat - self.min_lat).abs();
        let lon_extent = (self.max_lon - self.min_lon).abs();
        let cy = if self.height > 0 {
            lat_extent / self.height as f64 * METRES_PER_DEGREE
        } else {
            0.0
        };
        let mid_lat = (self.min_lat + self.max_lat) / 2.0;
        let cx = if self.width > 0 {
            lon_extent / self.width as f64 * METRES_PER_DEGREE * mid_lat.to_radians().cos()
        } else {
            0.0
        };
        let avg = (cy + cx) / 2.0;
        if avg < 1e-3 { 30.0 } else { avg }
    }

}

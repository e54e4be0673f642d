//! Single-band rasters with an explicit no-data mask, and boolean masks.
//!
//! A `Raster` pairs f32 values with a per-pixel validity vector: a pixel is
//! either valid (carries a meaningful value) or no-data (excluded from every
//! aggregation). No sentinel values; undefinedness is structural.

use serde::{Deserialize, Serialize};

use crate::geometry::Region;
use crate::grid::GridSpec;

/// A single-band f32 raster, row-major, with per-pixel validity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raster {
    pub grid: GridSpec,
    /// Row-major pixel values. Meaningless where `valid` is false.
    pub data: Vec<f32>,
    /// Per-pixel no-data mask: false = no-data.
    pub valid: Vec<bool>,
}

impl Raster {
    /// A raster with every pixel set to `fill` and valid.
    pub fn filled(grid: GridSpec, fill: f32) -> Self {
        let n = grid.len();
        Self { grid, data: vec![fill; n], valid: vec![true; n] }
    }

    /// A raster with every pixel no-data.
    pub fn nodata(grid: GridSpec) -> Self {
        let n = grid.len();
        Self { grid, data: vec![0.0; n], valid: vec![false; n] }
    }

    /// Value at (row, col), or None where the pixel is no-data.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let i = self.grid.index(row, col);
        if self.valid[i] { Some(self.data[i]) } else { None }
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        let i = self.grid.index(row, col);
        self.data[i] = val;
        self.valid[i] = true;
    }

    #[inline]
    pub fn set_nodata(&mut self, row: usize, col: usize) {
        let i = self.grid.index(row, col);
        self.valid[i] = false;
    }

    /// Nearest-neighbour sample at (lon, lat).
    ///
    /// Returns None outside the grid bounds or where the containing pixel is
    /// no-data. Nearest-neighbour rather than bilinear so no-data pixels
    /// never bleed into neighbouring samples.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f32> {
        let (row, col) = self.grid.locate(lon, lat)?;
        self.get(row, col)
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    pub fn min_value(&self) -> Option<f32> {
        self.iter_valid().fold(None, |m, v| Some(m.map_or(v, |m: f32| m.min(v))))
    }

    pub fn max_value(&self) -> Option<f32> {
        self.iter_valid().fold(None, |m, v| Some(m.map_or(v, |m: f32| m.max(v))))
    }

    fn iter_valid(&self) -> impl Iterator<Item = f32> + '_ {
        self.data
            .iter()
            .zip(self.valid.iter())
            .filter_map(|(&v, &ok)| if ok { Some(v) } else { None })
    }

    /// Mark every pixel whose centre falls outside `region` as no-data.
    pub fn clip(&mut self, region: &Region) {
        for row in 0..self.grid.height {
            let lat = self.grid.pixel_lat(row);
            for col in 0..self.grid.width {
                let i = self.grid.index(row, col);
                if self.valid[i] && !region.contains(self.grid.pixel_lon(col), lat) {
                    self.valid[i] = false;
                }
            }
        }
    }
}

/// A boolean land-cover mask on the same grid family as its source rasters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mask {
    pub grid: GridSpec,
    /// Row-major membership flags.
    pub data: Vec<bool>,
}

impl Mask {
    pub fn empty(grid: GridSpec) -> Self {
        let n = grid.len();
        Self { grid, data: vec![false; n] }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[self.grid.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, member: bool) {
        let i = self.grid.index(row, col);
        self.data[i] = member;
    }

    /// Membership at (lon, lat); false outside the grid bounds.
    pub fn sample(&self, lon: f64, lat: f64) -> bool {
        match self.grid.locate(lon, lat) {
            Some((row, col)) => self.get(row, col),
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }

    /// True when no pixel belongs to both masks.
    pub fn is_disjoint(&self, other: &Mask) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(&a, &b)| !(a && b))
    }
}

//! Index-threshold land-cover classification.
//!
//! Two independent per-pixel predicates over the NDVI/NDBI pair:
//!   urban: NDBI > ndbi_urban_min AND NDVI < ndvi_urban_max
//!   rural: NDVI > ndvi_rural_min AND NDBI < ndbi_rural_max
//! Pixels failing both stay unclassified and appear in neither mask.

use serde::{Deserialize, Serialize};

use crate::raster::{Mask, Raster};

/// Classification thresholds. Defaults are the calibrated values used for
/// Landsat surface reflectance over humid tropical cities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Urban pixels require NDBI strictly above this.
    pub ndbi_urban_min: f32,
    /// Urban pixels require NDVI strictly below this.
    pub ndvi_urban_max: f32,
    /// Rural pixels require NDVI strictly above this.
    pub ndvi_rural_min: f32,
    /// Rural pixels require NDBI strictly below this.
    pub ndbi_rural_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ndbi_urban_min: 0.1,
            ndvi_urban_max: 0.2,
            ndvi_rural_min: 0.3,
            ndbi_rural_max: -0.1,
        }
    }
}

impl Thresholds {
    /// Whether the two predicates can never hold at one pixel.
    ///
    /// A pixel in both masks would need NDVI in
    /// (ndvi_rural_min, ndvi_urban_max) and NDBI in
    /// (ndbi_urban_min, ndbi_rural_max); disjointness holds as soon as
    /// either interval is empty. Checked as a configuration invariant, not
    /// per pixel.
    pub fn masks_disjoint(&self) -> bool {
        self.ndvi_rural_min >= self.ndvi_urban_max || self.ndbi_urban_min >= self.ndbi_rural_max
    }

    #[inline]
    fn is_urban(&self, ndvi: f32, ndbi: f32) -> bool {
        ndbi > self.ndbi_urban_min && ndvi < self.ndvi_urban_max
    }

    #[inline]
    fn is_rural(&self, ndvi: f32, ndbi: f32) -> bool {
        ndvi > self.ndvi_rural_min && ndbi < self.ndbi_rural_max
    }
}

/// Urban and rural masks for one classified grid.
#[derive(Debug, Clone)]
pub struct LandCover {
    pub urban: Mask,
    pub rural: Mask,
}

/// Classify every pixel where both indices are defined. No-data in either
/// index leaves the pixel out of both masks.
pub fn classify(ndvi: &Raster, ndbi: &Raster, thresholds: &Thresholds) -> LandCover {
    debug_assert_eq!(ndvi.grid, ndbi.grid);
    let grid = ndvi.grid.clone();
    let mut urban = Mask::empty(grid.clone());
    let mut rural = Mask::empty(grid.clone());

    for i in 0..grid.len() {
        if !(ndvi.valid[i] && ndbi.valid[i]) {
            continue;
        }
        let (v, b) = (ndvi.data[i], ndbi.data[i]);
        urban.data[i] = thresholds.is_urban(v, b);
        rural.data[i] = thresholds.is_rural(v, b);
    }
    LandCover { urban, rural }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn index_pair(pixels: &[(f32, f32)]) -> (Raster, Raster) {
        let grid = GridSpec::new(pixels.len(), 1, 0.0, pixels.len() as f64, 0.0, 1.0);
        let ndvi = Raster {
            grid: grid.clone(),
            data: pixels.iter().map(|p| p.0).collect(),
            valid: vec![true; pixels.len()],
        };
        let ndbi = Raster {
            grid,
            data: pixels.iter().map(|p| p.1).collect(),
            valid: vec![true; pixels.len()],
        };
        (ndvi, ndbi)
    }

    #[test]
    fn urban_rural_and_unclassified_pixels() {
        // (ndvi, ndbi): dense built-up, dense vegetation, bare mixed ground.
        let (ndvi, ndbi) = index_pair(&[(0.05, 0.3), (0.6, -0.4), (0.25, 0.0)]);
        let lc = classify(&ndvi, &ndbi, &Thresholds::default());
        assert!(lc.urban.get(0, 0) && !lc.rural.get(0, 0));
        assert!(!lc.urban.get(0, 1) && lc.rural.get(0, 1));
        assert!(!lc.urban.get(0, 2) && !lc.rural.get(0, 2));
    }

    #[test]
    fn thresholds_are_strict_inequalities() {
        let (ndvi, ndbi) = index_pair(&[(0.2, 0.1), (0.3, -0.1)]);
        let lc = classify(&ndvi, &ndbi, &Thresholds::default());
        assert_eq!(lc.urban.count(), 0);
        assert_eq!(lc.rural.count(), 0);
    }

    #[test]
    fn nodata_index_pixels_stay_unclassified() {
        let (mut ndvi, ndbi) = index_pair(&[(0.05, 0.3)]);
        ndvi.set_nodata(0, 0);
        let lc = classify(&ndvi, &ndbi, &Thresholds::default());
        assert_eq!(lc.urban.count(), 0);
        assert_eq!(lc.rural.count(), 0);
    }

    #[test]
    fn default_thresholds_are_disjoint_by_construction() {
        assert!(Thresholds::default().masks_disjoint());
    }

    #[test]
    fn disjointness_holds_when_either_interval_is_empty() {
        // NDVI intervals overlap but NDBI intervals cannot.
        let t = Thresholds {
            ndbi_urban_min: 0.0,
            ndvi_urban_max: 0.5,
            ndvi_rural_min: 0.3,
            ndbi_rural_max: 0.0,
        };
        assert!(t.masks_disjoint());
        // Both intervals non-empty: a pixel could satisfy both predicates.
        let bad = Thresholds {
            ndbi_urban_min: -0.5,
            ndvi_urban_max: 0.5,
            ndvi_rural_min: 0.3,
            ndbi_rural_max: 0.0,
        };
        assert!(!bad.masks_disjoint());
    }

    #[test]
    fn disjoint_configuration_never_produces_overlap() {
        // Sweep the index plane; no pixel may land in both masks.
        let mut pixels = Vec::new();
        for vi in -10..=10 {
            for bi in -10..=10 {
                pixels.push((vi as f32 / 10.0, bi as f32 / 10.0));
            }
        }
        let (ndvi, ndbi) = index_pair(&pixels);
        let lc = classify(&ndvi, &ndbi, &Thresholds::default());
        assert!(lc.urban.is_disjoint(&lc.rural));
    }
}

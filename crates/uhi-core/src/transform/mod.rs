//! Band transformations: LST calibration, temporal compositing, and the
//! NDVI/NDBI spectral indices.
//!
//! Pipeline order:
//!   per-scene LST → MEAN composite           (temperature path)
//!   per-band MEDIAN composite → NDVI, NDBI   (index path)
//!
//! The two paths deliberately composite differently: the temperature
//! composite is a per-pixel arithmetic mean across scenes, while the
//! reflectance composite is a per-pixel median. See DESIGN.md before
//! unifying the two.

mod composite;
mod indices;
mod lst;

pub use composite::{mean_composite, median_band_composite};
pub use indices::{ndbi, ndvi};
pub use lst::lst_scene;

use crate::raster::Raster;
use crate::scene::{Band, SourceScene};

/// Per-pixel mean LST composite (°C) over all source scenes.
///
/// With the `threading` feature, per-scene calibration fans out across a
/// rayon pool; scenes are read-only shared inputs.
pub fn lst_composite(scenes: &[SourceScene<'_>]) -> Option<Raster> {
    #[cfg(feature = "threading")]
    let per_scene: Vec<Raster> = {
        use rayon::prelude::*;
        scenes.par_iter().map(|s| lst_scene(s.scene, s.calibration)).collect()
    };
    #[cfg(not(feature = "threading"))]
    let per_scene: Vec<Raster> = scenes.iter().map(|s| lst_scene(s.scene, s.calibration)).collect();

    mean_composite(&per_scene)
}

/// Median composites of the three reflectance bands, in (red, nir, swir)
/// order. None when `scenes` is empty.
pub fn reflectance_composites(scenes: &[SourceScene<'_>]) -> Option<(Raster, Raster, Raster)> {
    let red = median_band_composite(scenes, Band::Red)?;
    let nir = median_band_composite(scenes, Band::Nir)?;
    let swir = median_band_composite(scenes, Band::Swir)?;
    Some((red, nir, swir))
}

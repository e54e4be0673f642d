//! Normalized-difference spectral indices.
//!
//! NDVI = (NIR − Red) / (NIR + Red)
//! NDBI = (SWIR − NIR) / (SWIR + NIR)
//!
//! Both are total wherever their source bands are valid and the denominator
//! is non-zero; a zero denominator marks that pixel no-data rather than
//! producing an infinity or NaN downstream.

use crate::raster::Raster;

/// Normalized Difference Vegetation Index from NIR and red composites.
pub fn ndvi(nir: &Raster, red: &Raster) -> Raster {
    normalized_difference(nir, red)
}

/// Normalized Difference Built-up Index from SWIR and NIR composites.
pub fn ndbi(swir: &Raster, nir: &Raster) -> Raster {
    normalized_difference(swir, nir)
}

/// (a − b) / (a + b) per pixel. No-data where either input is no-data,
/// the denominator is zero, or the quotient is non-finite.
fn normalized_difference(a: &Raster, b: &Raster) -> Raster {
    debug_assert_eq!(a.grid, b.grid);
    let mut out = Raster::nodata(a.grid.clone());
    for i in 0..a.grid.len() {
        if !(a.valid[i] && b.valid[i]) {
            continue;
        }
        let (x, y) = (a.data[i] as f64, b.data[i] as f64);
        let denom = x + y;
        if denom == 0.0 {
            continue;
        }
        let v = (x - y) / denom;
        if v.is_finite() {
            out.data[i] = v as f32;
            out.valid[i] = true;
        }
    }
    out
}

//! Region statistics: area-weighted means under masks, UHI intensity, and
//! per-city buffer means.
//!
//! Aggregation is a blocking scan over a sample grid. The sample budget is
//! checked BEFORE any pixel is touched: a request that would exceed the cap
//! fails with `LimitExceeded` instead of silently subsampling, because a
//! truncated scan biases the mean.

use thiserror::Error;

use crate::geometry::{CitySample, Region};
use crate::grid::METRES_PER_DEGREE;
use crate::raster::{Mask, Raster};

/// Why a single statistic could not be produced. Failures are local to the
/// statistic; unrelated statistics keep their own results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    /// The sample grid over the geometry would exceed the pixel budget.
    #[error("aggregation would sample {required} pixels, cap is {cap}")]
    LimitExceeded { required: u64, cap: u64 },
    /// No valid masked pixel intersects the geometry.
    #[error("no valid pixels under the mask within the geometry")]
    Undefined,
}

/// A scalar statistic that may individually be undefined.
pub type Stat = Result<f64, StatError>;

/// Area-weighted mean of `raster` over `region`, optionally restricted to
/// `mask`, sampled on a grid with `scale_m` metre spacing.
///
/// The required sample count is `ceil(area / scale²)` from the region's
/// approximate area; exceeding `max_pixels` is an explicit error. Samples
/// are nearest-neighbour, weighted by cos(latitude) so equirectangular
/// pixel shrinkage towards the poles does not bias the mean.
pub fn region_mean(
    raster: &Raster,
    mask: Option<&Mask>,
    region: &Region,
    scale_m: f64,
    max_pixels: u64,
) -> Stat {
    let bbox = region.bounding_rect().ok_or(StatError::Undefined)?;

    let required = (region.area_m2() / (scale_m * scale_m)).ceil() as u64;
    if required > max_pixels {
        return Err(StatError::LimitExceeded { required, cap: max_pixels });
    }

    let mid_lat = (bbox.min().y + bbox.max().y) / 2.0;
    let step_lat = scale_m / METRES_PER_DEGREE;
    let step_lon = scale_m / (METRES_PER_DEGREE * mid_lat.to_radians().cos());

    let mut weighted_sum = 0.0f64;
    let mut weight_total = 0.0f64;

    let mut lat = bbox.min().y + step_lat / 2.0;
    while lat <= bbox.max().y {
        let row_weight = lat.to_radians().cos();
        let mut lon = bbox.min().x + step_lon / 2.0;
        while lon <= bbox.max().x {
            if region.contains(lon, lat)
                && mask.map_or(true, |m| m.sample(lon, lat))
            {
                if let Some(v) = raster.sample(lon, lat) {
                    weighted_sum += v as f64 * row_weight;
                    weight_total += row_weight;
                }
            }
            lon += step_lon;
        }
        lat += step_lat;
    }

    if weight_total == 0.0 {
        Err(StatError::Undefined)
    } else {
        Ok(weighted_sum / weight_total)
    }
}

/// Urban-minus-rural mean temperature. Either operand being undefined makes
/// the intensity undefined; a missing mean is never treated as zero.
pub fn uhi_intensity(urban_mean: &Stat, rural_mean: &Stat) -> Stat {
    match (urban_mean, rural_mean) {
        (Ok(u), Ok(r)) => Ok(u - r),
        (Err(e), _) => Err(e.clone()),
        (_, Err(e)) => Err(e.clone()),
    }
}

/// Per-pixel UHI raster for visualization: `lst − rural_mean` wherever the
/// urban mask holds, no-data elsewhere.
pub fn uhi_raster(lst: &Raster, urban: &Mask, rural_mean: f64) -> Raster {
    debug_assert_eq!(lst.grid, urban.grid);
    let mut out = Raster::nodata(lst.grid.clone());
    for i in 0..lst.grid.len() {
        if urban.data[i] && lst.valid[i] {
            out.data[i] = lst.data[i] - rural_mean as f32;
            out.valid[i] = true;
        }
    }
    out
}

/// Mean of `raster` within a city's circular buffer, with no land-cover
/// mask applied. A buffer wholly outside the raster's valid data is
/// `Undefined`, never zero.
pub fn city_stat(raster: &Raster, city: &CitySample, scale_m: f64, max_pixels: u64) -> Stat {
    region_mean(raster, None, &city.buffer(), scale_m, max_pixels)
}

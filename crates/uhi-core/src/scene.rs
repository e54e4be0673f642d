//! Scene model and space/time/quality filtering.
//!
//! A `Scene` is one atmospherically-corrected satellite acquisition:
//! four co-registered bands on a shared grid plus a shared validity mask
//! (cloud/shadow pixels arrive pre-flagged as no-data). Scenes are immutable
//! once loaded. Archives from compatible satellite generations are unioned
//! into one logical collection by `load_scenes`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geometry::Region;
use crate::grid::GridSpec;

/// One multi-band acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub acquired: NaiveDate,
    /// Scene-level cloud cover, 0–100.
    pub cloud_cover_pct: f32,
    pub grid: GridSpec,
    /// Red surface reflectance, row-major.
    pub red: Vec<f32>,
    /// Near-infrared surface reflectance, row-major.
    pub nir: Vec<f32>,
    /// Short-wave-infrared surface reflectance, row-major.
    pub swir: Vec<f32>,
    /// Thermal band raw digital numbers (Kelvin-encoded), row-major.
    pub thermal: Vec<f32>,
    /// Shared per-pixel validity: false = no-data in every band.
    pub valid: Vec<bool>,
}

impl Scene {
    /// True when all band and validity vectors match the grid length.
    pub fn is_well_formed(&self) -> bool {
        let n = self.grid.len();
        self.red.len() == n
            && self.nir.len() == n
            && self.swir.len() == n
            && self.thermal.len() == n
            && self.valid.len() == n
    }
}

/// Reflectance band selector for compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Red,
    Nir,
    Swir,
}

impl Scene {
    #[inline]
    pub fn band(&self, band: Band) -> &[f32] {
        match band {
            Band::Red => &self.red,
            Band::Nir => &self.nir,
            Band::Swir => &self.swir,
        }
    }
}

/// Linear radiance-to-temperature calibration for an archive's thermal band:
/// `kelvin = dn × scale + offset`. Landsat Collection 2 surface temperature
/// uses scale 0.00341802, offset 149.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThermalCalibration {
    pub scale: f64,
    pub offset: f64,
}

impl Default for ThermalCalibration {
    fn default() -> Self {
        Self { scale: 0.003_418_02, offset: 149.0 }
    }
}

/// A named scene archive (one satellite generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneArchive {
    pub name: String,
    pub calibration: ThermalCalibration,
    pub scenes: Vec<Scene>,
}

/// Space/time/quality filter applied to every archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFilter {
    /// Inclusive start of the acquisition window.
    pub start: NaiveDate,
    /// Exclusive end of the acquisition window.
    pub end: NaiveDate,
    /// Scenes at or above this cloud cover are dropped entirely.
    pub max_cloud_pct: f32,
}

impl SceneFilter {
    fn admits(&self, scene: &Scene) -> bool {
        scene.acquired >= self.start
            && scene.acquired < self.end
            && scene.cloud_cover_pct < self.max_cloud_pct
    }
}

/// A scene together with its archive's thermal calibration.
#[derive(Debug, Clone, Copy)]
pub struct SourceScene<'a> {
    pub scene: &'a Scene,
    pub calibration: ThermalCalibration,
}

/// Select all scenes across `archives` whose footprint intersects the
/// region's bounding box and that pass the date/cloud filter. Order follows
/// archive order; downstream reducers (mean/median) are order-independent.
pub fn load_scenes<'a>(
    archives: &'a [SceneArchive],
    region: &Region,
    filter: &SceneFilter,
) -> Vec<SourceScene<'a>> {
    let bbox = region.bounding_rect();
    archives
        .iter()
        .flat_map(|archive| {
            archive.scenes.iter().filter_map(move |scene| {
                let intersects = match bbox {
                    Some(r) => {
                        let g = &scene.grid;
                        g.min_lon <= r.max().x
                            && g.max_lon >= r.min().x
                            && g.min_lat <= r.max().y
                            && g.max_lat >= r.min().y
                    }
                    None => false,
                };
                if intersects && filter.admits(scene) {
                    Some(SourceScene { scene, calibration: archive.calibration })
                } else {
                    None
                }
            })
        })
        .collect()
}

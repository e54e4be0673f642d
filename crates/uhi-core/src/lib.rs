//! Urban heat island analysis from multispectral/thermal satellite imagery.
//!
//! The library turns a stack of co-registered scenes plus an administrative
//! boundary into a land-surface-temperature composite, urban/rural land
//! cover masks, and a scalar UHI intensity (urban mean LST minus rural mean
//! LST), with per-city buffer statistics on the side.
//!
//! Everything is an explicit in-memory raster with a no-data mask; there is
//! no ambient state, and a rerun with identical inputs is bit-identical.

pub mod aggregate;
pub mod classify;
pub mod geometry;
pub mod grid;
pub mod pipeline;
pub mod raster;
pub mod scene;
pub mod transform;

pub use aggregate::{city_stat, region_mean, uhi_intensity, uhi_raster, Stat, StatError};
pub use classify::{classify, LandCover, Thresholds};
pub use geometry::{CitySample, Region};
pub use grid::GridSpec;
pub use pipeline::{run_analysis, AnalysisParams, PipelineError, UhiReport};
pub use raster::{Mask, Raster};
pub use scene::{load_scenes, Scene, SceneArchive, SceneFilter, ThermalCalibration};

//! Pipeline orchestrator: scenes in, UHI report out.
//!
//! Stage order:
//!   1. Scene selection (space/time/cloud filter, archives unioned)
//!   2. Band transforms (LST mean composite; NDVI/NDBI on median composite)
//!   3. Boundary clip
//!   4. Urban/rural classification
//!   5. Regional aggregation (means, intensity, city buffers)
//!
//! Stateless and idempotent: identical archives, boundary, and parameters
//! produce bit-identical outputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{city_stat, region_mean, uhi_intensity, uhi_raster, Stat};
use crate::classify::{classify, Thresholds};
use crate::geometry::{CitySample, Region};
use crate::raster::{Mask, Raster};
use crate::scene::{load_scenes, SceneArchive, SceneFilter};
use crate::transform::{lst_composite, ndbi, ndvi, reflectance_composites};

/// Full configuration surface of one analysis run. Everything a caller can
/// turn is here; the pipeline itself holds no ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Inclusive start of the acquisition window.
    pub date_start: NaiveDate,
    /// Exclusive end of the acquisition window.
    pub date_end: NaiveDate,
    /// Scenes at or above this cloud cover are dropped.
    pub max_cloud_pct: f32,
    pub thresholds: Thresholds,
    /// Aggregation ground sampling distance in metres.
    pub scale_m: f64,
    /// Aggregation sample budget; exceeding it fails the statistic.
    pub max_pixels: u64,
    pub cities: Vec<CitySample>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            date_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            date_end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            max_cloud_pct: 20.0,
            thresholds: Thresholds::default(),
            scale_m: 30.0,
            max_pixels: 1_000_000_000,
            cities: Vec::new(),
        }
    }
}

/// Failures that abort the whole run. Per-statistic failures do NOT appear
/// here; they live in the report so unrelated statistics survive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No scene passed the space/time/cloud filter; every downstream
    /// statistic would be undefined, so the run reports that up front.
    #[error("no scenes match the boundary, date range, and cloud filter")]
    EmptySceneSet,
    /// Selected scenes are not co-registered on one grid, so band math
    /// across them would be meaningless.
    #[error("scene {scene_id} is not co-registered with the first selected scene")]
    GridMismatch { scene_id: String },
    /// The threshold configuration admits pixels into both masks.
    #[error("classification thresholds allow urban and rural masks to overlap")]
    OverlappingThresholds,
}

/// Everything one analysis run produces. Scalars are per-statistic
/// `Result`s: a capped-out or undefined statistic stays local and leaves
/// its siblings intact.
#[derive(Debug, Clone)]
pub struct UhiReport {
    /// Mean LST composite (°C), clipped to the boundary.
    pub lst: Raster,
    /// NDVI on the median reflectance composite, clipped.
    pub ndvi: Raster,
    /// NDBI on the median reflectance composite, clipped.
    pub ndbi: Raster,
    pub urban_mask: Mask,
    pub rural_mask: Mask,
    /// LST − rural mean under the urban mask; all no-data when the rural
    /// mean is undefined.
    pub uhi: Raster,
    pub urban_mean_c: Stat,
    pub rural_mean_c: Stat,
    pub uhi_intensity_c: Stat,
    /// (city name, mean LST) for each configured city buffer.
    pub city_means_c: Vec<(String, Stat)>,
    /// Number of scenes that contributed to the composites.
    pub scene_count: usize,
}

/// Run the full analysis for one boundary.
pub fn run_analysis(
    archives: &[SceneArchive],
    boundary: &Region,
    params: &AnalysisParams,
) -> Result<UhiReport, PipelineError> {
    if !params.thresholds.masks_disjoint() {
        return Err(PipelineError::OverlappingThresholds);
    }

    // ── 1. Scene selection ──────────────────────────────────────────────
    let filter = SceneFilter {
        start: params.date_start,
        end: params.date_end,
        max_cloud_pct: params.max_cloud_pct,
    };
    let scenes = load_scenes(archives, boundary, &filter);
    if scenes.is_empty() {
        return Err(PipelineError::EmptySceneSet);
    }
    let grid = &scenes[0].scene.grid;
    for s in &scenes[1..] {
        if s.scene.grid != *grid {
            return Err(PipelineError::GridMismatch { scene_id: s.scene.id.clone() });
        }
    }

    // ── 2. Band transforms ──────────────────────────────────────────────
    // Non-empty scene set, so the composites exist.
    let mut lst = lst_composite(&scenes).ok_or(PipelineError::EmptySceneSet)?;
    let (red, nir, swir) =
        reflectance_composites(&scenes).ok_or(PipelineError::EmptySceneSet)?;
    let mut ndvi_raster = ndvi(&nir, &red);
    let mut ndbi_raster = ndbi(&swir, &nir);

    // ── 3. Boundary clip ────────────────────────────────────────────────
    lst.clip(boundary);
    ndvi_raster.clip(boundary);
    ndbi_raster.clip(boundary);

    // ── 4. Classification ───────────────────────────────────────────────
    let land_cover = classify(&ndvi_raster, &ndbi_raster, &params.thresholds);

    // ── 5. Aggregation ──────────────────────────────────────────────────
    let urban_mean_c = region_mean(
        &lst,
        Some(&land_cover.urban),
        boundary,
        params.scale_m,
        params.max_pixels,
    );
    let rural_mean_c = region_mean(
        &lst,
        Some(&land_cover.rural),
        boundary,
        params.scale_m,
        params.max_pixels,
    );
    let uhi_intensity_c = uhi_intensity(&urban_mean_c, &rural_mean_c);

    let uhi = match rural_mean_c {
        Ok(rural) => uhi_raster(&lst, &land_cover.urban, rural),
        Err(_) => Raster::nodata(lst.grid.clone()),
    };

    let city_means_c = params
        .cities
        .iter()
        .map(|city| {
            let stat = city_stat(&lst, city, params.scale_m, params.max_pixels);
            (city.name.clone(), stat)
        })
        .collect();

    Ok(UhiReport {
        lst,
        ndvi: ndvi_raster,
        ndbi: ndbi_raster,
        urban_mask: land_cover.urban,
        rural_mask: land_cover.rural,
        uhi,
        urban_mean_c,
        rural_mean_c,
        uhi_intensity_c,
        city_means_c,
        scene_count: scenes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use crate::scene::{Scene, ThermalCalibration};
    use approx::assert_relative_eq;

    /// Calibration chosen so LST °C = dn − 273.15 + 273.15 = dn; thermal
    /// digital numbers below are already Celsius plus the Kelvin offset.
    fn identity_cal() -> ThermalCalibration {
        ThermalCalibration { scale: 1.0, offset: 0.0 }
    }

    fn celsius_dn(c: f32) -> f32 {
        c + 273.15
    }

    /// 4×1 equatorial grid: columns 0–1 built-up, columns 2–3 vegetated.
    fn synthetic_scene(id: &str, temps_c: [f32; 4]) -> Scene {
        let grid = GridSpec::new(4, 1, 0.0, 4.0, 0.0, 1.0);
        Scene {
            id: id.to_string(),
            acquired: "2023-06-01".parse().unwrap(),
            cloud_cover_pct: 1.0,
            grid,
            // Urban pixels: low NIR vs red/swir → NDVI < 0.2, NDBI > 0.1.
            // Rural pixels: high NIR → NDVI > 0.3, NDBI < −0.1.
            red: vec![0.20, 0.20, 0.10, 0.10],
            nir: vec![0.22, 0.22, 0.50, 0.50],
            swir: vec![0.30, 0.30, 0.30, 0.30],
            thermal: temps_c.map(celsius_dn).to_vec(),
            valid: vec![true; 4],
        }
    }

    fn archive(scenes: Vec<Scene>) -> SceneArchive {
        SceneArchive { name: "test".to_string(), calibration: identity_cal(), scenes }
    }

    fn boundary() -> Region {
        Region::from_rings(vec![vec![
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 1.0],
            [0.0, 1.0],
            [0.0, 0.0],
        ]])
    }

    fn params() -> AnalysisParams {
        AnalysisParams {
            scale_m: 55_660.0, // half-degree sampling on the 1° synthetic grid
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn end_to_end_synthetic_uhi_is_seven_degrees() {
        let archives = vec![archive(vec![synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0])])];
        let report = run_analysis(&archives, &boundary(), &params()).unwrap();

        assert_eq!(report.scene_count, 1);
        assert_eq!(report.urban_mask.count(), 2);
        assert_eq!(report.rural_mask.count(), 2);
        assert_relative_eq!(*report.urban_mean_c.as_ref().unwrap(), 32.0, epsilon = 1e-3);
        assert_relative_eq!(*report.rural_mean_c.as_ref().unwrap(), 25.0, epsilon = 1e-3);
        assert_relative_eq!(*report.uhi_intensity_c.as_ref().unwrap(), 7.0, epsilon = 1e-3);
    }

    #[test]
    fn lst_composites_by_mean_across_scenes() {
        let archives = vec![archive(vec![
            synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0]),
            synthetic_scene("s2", [34.0, 38.0, 28.0, 30.0]),
        ])];
        let report = run_analysis(&archives, &boundary(), &params()).unwrap();
        // Scene means: urban (32+36)/2 = 34, rural (25+27)/2 = 26.
        assert_relative_eq!(*report.urban_mean_c.as_ref().unwrap(), 34.0, epsilon = 1e-3);
        assert_relative_eq!(*report.uhi_intensity_c.as_ref().unwrap(), 8.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_scene_set_aborts_up_front() {
        let archives = vec![archive(vec![])];
        let err = run_analysis(&archives, &boundary(), &params()).unwrap_err();
        assert_eq!(err, PipelineError::EmptySceneSet);
    }

    #[test]
    fn out_of_window_scenes_count_as_empty() {
        let mut scene = synthetic_scene("late", [30.0, 34.0, 24.0, 26.0]);
        scene.acquired = "2025-06-01".parse().unwrap();
        let archives = vec![archive(vec![scene])];
        assert_eq!(
            run_analysis(&archives, &boundary(), &params()).unwrap_err(),
            PipelineError::EmptySceneSet
        );
    }

    #[test]
    fn misregistered_scene_is_rejected() {
        let mut shifted = synthetic_scene("shifted", [30.0, 34.0, 24.0, 26.0]);
        shifted.grid = GridSpec::new(4, 1, 0.5, 4.5, 0.0, 1.0);
        let archives = vec![archive(vec![
            synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0]),
            shifted,
        ])];
        let err = run_analysis(&archives, &boundary(), &params()).unwrap_err();
        assert_eq!(err, PipelineError::GridMismatch { scene_id: "shifted".to_string() });
    }

    #[test]
    fn overlapping_thresholds_are_rejected() {
        let mut p = params();
        p.thresholds = Thresholds {
            ndbi_urban_min: -0.5,
            ndvi_urban_max: 0.5,
            ndvi_rural_min: 0.3,
            ndbi_rural_max: 0.0,
        };
        let archives = vec![archive(vec![synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0])])];
        assert_eq!(
            run_analysis(&archives, &boundary(), &p).unwrap_err(),
            PipelineError::OverlappingThresholds
        );
    }

    #[test]
    fn city_means_are_reported_per_city() {
        let mut p = params();
        p.scale_m = 20_000.0;
        p.cities = vec![
            CitySample::new("urban-core", 1.0, 0.5, 50_000.0),
            CitySample::new("offshore", 60.0, 0.5, 50_000.0),
        ];
        let archives = vec![archive(vec![synthetic_scene("s1", [30.0, 30.0, 24.0, 26.0])])];
        let report = run_analysis(&archives, &boundary(), &p).unwrap();

        assert_eq!(report.city_means_c.len(), 2);
        let (name, stat) = &report.city_means_c[0];
        assert_eq!(name, "urban-core");
        assert_relative_eq!(*stat.as_ref().unwrap(), 30.0, epsilon = 1e-3);
        // Buffer entirely outside the composite: undefined, not zero.
        assert!(report.city_means_c[1].1.is_err());
    }

    #[test]
    fn rerun_with_identical_inputs_is_bit_identical() {
        let archives = vec![archive(vec![
            synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0]),
            synthetic_scene("s2", [31.0, 35.0, 25.0, 27.0]),
        ])];
        let p = params();
        let a = run_analysis(&archives, &boundary(), &p).unwrap();
        let b = run_analysis(&archives, &boundary(), &p).unwrap();

        assert_eq!(a.urban_mean_c, b.urban_mean_c);
        assert_eq!(a.rural_mean_c, b.rural_mean_c);
        assert_eq!(a.uhi_intensity_c, b.uhi_intensity_c);
        assert_eq!(a.lst.data, b.lst.data);
        assert_eq!(a.uhi.data, b.uhi.data);
    }

    #[test]
    fn cloud_contaminated_scene_does_not_shift_the_median_indices() {
        // Third scene has inflated red everywhere; the median reflectance
        // composite should still classify columns 2–3 as rural.
        let mut hazy = synthetic_scene("hazy", [40.0, 44.0, 34.0, 36.0]);
        hazy.red = vec![0.6; 4];
        let archives = vec![archive(vec![
            synthetic_scene("s1", [30.0, 34.0, 24.0, 26.0]),
            synthetic_scene("s2", [30.0, 34.0, 24.0, 26.0]),
            hazy,
        ])];
        let report = run_analysis(&archives, &boundary(), &params()).unwrap();
        assert_eq!(report.rural_mask.count(), 2);
        assert_eq!(report.urban_mask.count(), 2);
    }
}

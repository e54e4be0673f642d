//! Land-surface temperature from the thermal band.

use crate::raster::Raster;
use crate::scene::{Scene, ThermalCalibration};

/// Absolute zero in °C; Kelvin-to-Celsius offset.
const KELVIN_OFFSET: f64 = 273.15;

/// LST in °C for one scene:
///
/// `lst = dn × scale + offset − 273.15`
///
/// where (scale, offset) are the archive's documented linear calibration
/// constants for the Kelvin-encoded thermal digital numbers. No-data pixels
/// in the scene stay no-data; non-finite inputs become no-data.
pub fn lst_scene(scene: &Scene, cal: ThermalCalibration) -> Raster {
    let mut out = Raster::nodata(scene.grid.clone());
    for i in 0..scene.grid.len() {
        if !scene.valid[i] {
            continue;
        }
        let dn = scene.thermal[i] as f64;
        let celsius = dn * cal.scale + cal.offset - KELVIN_OFFSET;
        if celsius.is_finite() {
            out.data[i] = celsius as f32;
            out.valid[i] = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use approx::assert_relative_eq;

    fn scene_with_thermal(thermal: Vec<f32>, valid: Vec<bool>) -> Scene {
        let grid = GridSpec::new(2, 2, 0.0, 2.0, 0.0, 2.0);
        Scene {
            id: "t".to_string(),
            acquired: "2023-06-01".parse().unwrap(),
            cloud_cover_pct: 0.0,
            grid,
            red: vec![0.0; 4],
            nir: vec![0.0; 4],
            swir: vec![0.0; 4],
            thermal,
            valid,
        }
    }

    #[test]
    fn calibration_converts_dn_to_celsius() {
        // dn 45_000 × 0.00341802 + 149.0 = 302.8109 K → 29.6609 °C.
        let scene = scene_with_thermal(vec![45_000.0; 4], vec![true; 4]);
        let lst = lst_scene(&scene, ThermalCalibration::default());
        assert_relative_eq!(lst.get(0, 0).unwrap(), 29.6609, epsilon = 1e-3);
    }

    #[test]
    fn nodata_pixels_stay_nodata() {
        let scene = scene_with_thermal(vec![45_000.0; 4], vec![true, false, true, true]);
        let lst = lst_scene(&scene, ThermalCalibration::default());
        assert_eq!(lst.valid_count(), 3);
        assert_eq!(lst.get(0, 1), None);
    }

    #[test]
    fn non_finite_dn_becomes_nodata() {
        let scene = scene_with_thermal(vec![f32::NAN, 45_000.0, 45_000.0, 45_000.0], vec![true; 4]);
        let lst = lst_scene(&scene, ThermalCalibration::default());
        assert_eq!(lst.get(0, 0), None);
        assert_eq!(lst.valid_count(), 3);
    }
}

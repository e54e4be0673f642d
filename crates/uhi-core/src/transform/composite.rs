//! Temporal compositing: reduce a stack of co-registered rasters to one.
//!
//! A composite pixel is valid when at least one contributing scene has a
//! valid value there. Accumulation runs in f64, storage is f32.

use crate::raster::Raster;
use crate::scene::{Band, SourceScene};

/// Per-pixel arithmetic mean across the stack. None for an empty stack.
///
/// All rasters must share one grid; callers enforce co-registration before
/// compositing (the pipeline refuses mismatched scenes up front).
pub fn mean_composite(stack: &[Raster]) -> Option<Raster> {
    let first = stack.first()?;
    let grid = first.grid.clone();
    let n = grid.len();
    let mut sum = vec![0.0f64; n];
    let mut count = vec![0u32; n];

    for raster in stack {
        debug_assert_eq!(raster.grid, grid);
        for i in 0..n {
            if raster.valid[i] {
                sum[i] += raster.data[i] as f64;
                count[i] += 1;
            }
        }
    }

    let mut out = Raster::nodata(grid);
    for i in 0..n {
        if count[i] > 0 {
            out.data[i] = (sum[i] / count[i] as f64) as f32;
            out.valid[i] = true;
        }
    }
    Some(out)
}

/// Per-pixel median of one reflectance band across the scene stack.
/// None for an empty stack. Even-length pixel stacks take the mean of the
/// two middle values.
pub fn median_band_composite(scenes: &[SourceScene<'_>], band: Band) -> Option<Raster> {
    let first = scenes.first()?;
    let grid = first.scene.grid.clone();
    let n = grid.len();

    let mut out = Raster::nodata(grid);
    let mut column: Vec<f32> = Vec::with_capacity(scenes.len());
    for i in 0..n {
        column.clear();
        for s in scenes {
            if s.scene.valid[i] {
                let v = s.scene.band(band)[i];
                if v.is_finite() {
                    column.push(v);
                }
            }
        }
        if let Some(m) = median(&mut column) {
            out.data[i] = m;
            out.valid[i] = true;
        }
    }
    Some(out)
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

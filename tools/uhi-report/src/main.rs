/// Offline UHI analysis runner: loads a JSON config and serialized scene
/// archives, runs the full pipeline, and prints a JSON report on stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use uhi_core::{run_analysis, AnalysisParams, Region, SceneArchive, Stat, UhiReport};

#[derive(Parser, Debug)]
#[command(name = "uhi-report", about = "Compute urban heat island statistics for a boundary")]
struct Args {
    /// Analysis config JSON (boundary rings + parameters).
    #[arg(short, long)]
    config: String,

    /// Directory of serialized SceneArchive JSON files.
    #[arg(short, long)]
    archives: String,

    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

/// On-disk config: boundary as rings of [lon, lat] pairs (first ring is the
/// exterior, the rest are holes) plus the full parameter surface.
#[derive(Debug, Deserialize)]
struct Config {
    boundary: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    params: AnalysisParams,
}

#[derive(Debug, Serialize)]
struct StatJson {
    value: Option<f64>,
    error: Option<String>,
}

impl From<&Stat> for StatJson {
    fn from(stat: &Stat) -> Self {
        match stat {
            Ok(v) => Self { value: Some(*v), error: None },
            Err(e) => Self { value: None, error: Some(e.to_string()) },
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportJson {
    scene_count: usize,
    urban_pixels: usize,
    rural_pixels: usize,
    lst_min_c: Option<f32>,
    lst_max_c: Option<f32>,
    urban_mean_c: StatJson,
    rural_mean_c: StatJson,
    uhi_intensity_c: StatJson,
    cities: Vec<CityJson>,
}

#[derive(Debug, Serialize)]
struct CityJson {
    name: String,
    mean_c: StatJson,
}

impl ReportJson {
    fn from_report(report: &UhiReport) -> Self {
        Self {
            scene_count: report.scene_count,
            urban_pixels: report.urban_mask.count(),
            rural_pixels: report.rural_mask.count(),
            lst_min_c: report.lst.min_value(),
            lst_max_c: report.lst.max_value(),
            urban_mean_c: (&report.urban_mean_c).into(),
            rural_mean_c: (&report.rural_mean_c).into(),
            uhi_intensity_c: (&report.uhi_intensity_c).into(),
            cities: report
                .city_means_c
                .iter()
                .map(|(name, stat)| CityJson { name: name.clone(), mean_c: stat.into() })
                .collect(),
        }
    }
}

fn load_archives(dir: &str) -> Result<Vec<SceneArchive>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading archive directory {dir}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut archives = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let archive: SceneArchive = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        for scene in &archive.scenes {
            if !scene.is_well_formed() {
                bail!("scene {} in {} has band/grid length mismatch", scene.id, path.display());
            }
        }
        eprintln!("loaded archive {} ({} scenes)", archive.name, archive.scenes.len());
        archives.push(archive);
    }
    Ok(archives)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_text = fs::read_to_string(&args.config)
        .with_context(|| format!("reading config {}", args.config))?;
    let config: Config =
        serde_json::from_str(&config_text).with_context(|| format!("parsing {}", args.config))?;
    if config.boundary.is_empty() {
        bail!("config boundary must contain at least one ring");
    }
    let boundary = Region::from_rings(config.boundary);

    let archives = load_archives(&args.archives)?;

    let report = run_analysis(&archives, &boundary, &config.params)
        .context("analysis failed")?;
    eprintln!(
        "composited {} scenes at ~{:.0} m resolution; urban {} px, rural {} px",
        report.scene_count,
        report.lst.grid.cellsize_m(),
        report.urban_mask.count(),
        report.rural_mask.count()
    );

    let out = ReportJson::from_report(&report);
    let json = if args.pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    println!("{json}");
    Ok(())
}

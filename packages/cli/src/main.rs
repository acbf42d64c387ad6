#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the emotion map analytics engine.
//!
//! Reads the survey CSV export, runs one analysis and prints the result
//! as JSON on stdout. Polygon results are printed as `GeoJSON` feature
//! collections. Logging goes to stderr via `pretty_env_logger` (set
//! `RUST_LOG=info` for progress).

mod csv_source;
mod error;
mod geojson_output;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use emotion_map_analytics::config::{DEFAULT_CONFIG_TOML, parse_config};
use emotion_map_analytics::interpolation::{IdwParams, KernelDensityParams};
use emotion_map_analytics::{
    accessibility, aggregate, autocorrelation, clustering, density, distribution, interpolation,
    zones,
};
use emotion_map_analytics_models::AnalysisConfig;
use emotion_map_geometry::GeoEngine;
use serde::Serialize;

use crate::error::CliError;

/// Spatial and temporal analytics over geotagged emotion observations.
#[derive(Parser)]
#[command(name = "emotion_map")]
#[command(about = "Spatial and temporal analytics over geotagged emotion observations")]
struct Cli {
    /// Path to the survey CSV export.
    #[arg(short, long, default_value = "data/emotion_data.csv")]
    input: PathBuf,

    /// TOML file overriding the default analysis parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print single-line JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Density bands plus district, time-slot and POI-type aggregates.
    Stats,

    /// Daily record count and mean emotion.
    Trend,

    /// Fixed-proportion density bands over distinct locations.
    Density,

    /// Global Moran's I on emotion values.
    MoransI,

    /// Inverse-distance-weighted emotion surface.
    Idw {
        /// Grid spacing in km.
        #[arg(long)]
        cell_size: Option<f64>,

        /// Distance exponent.
        #[arg(long)]
        power: Option<f64>,
    },

    /// Weighted-grid density surface.
    Kde {
        /// Grid spacing in km.
        #[arg(long)]
        cell_size: Option<f64>,

        /// Search radius in km.
        #[arg(long)]
        radius: Option<f64>,
    },

    /// k-means clusters of record locations.
    Clusters {
        /// Number of clusters.
        #[arg(short, long)]
        k: Option<usize>,

        /// Maximum Lloyd iterations.
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Buffer polygon around each distinct location.
    Buffers {
        /// Buffer radius in km.
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Voronoi tessellation of distinct locations.
    Voronoi,

    /// Unioned service-area coverage.
    Accessibility {
        /// Service radius in km.
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Descriptive statistics of emotion values.
    Distribution,

    /// Mean emotion per rounded-coordinate grid cell.
    Regions {
        /// Decimal places to round coordinates to.
        #[arg(long)]
        precision: Option<u32>,

        /// Report cells with more than this many records.
        #[arg(long)]
        min_count: Option<usize>,
    },

    /// Heatmap weights (emotion / 10) per record.
    Heatmap,

    /// Combined dashboard report.
    Report,

    /// Print the default configuration as TOML.
    DefaultConfig,
}

impl Commands {
    /// Folds per-command flags into the loaded configuration.
    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        match *self {
            Self::Idw { cell_size, power } => {
                if let Some(v) = cell_size {
                    config.interpolation.idw_cell_size_km = v;
                }
                if let Some(v) = power {
                    config.interpolation.idw_power = v;
                }
            }
            Self::Kde { cell_size, radius } => {
                if let Some(v) = cell_size {
                    config.interpolation.kde_cell_size_km = v;
                }
                if let Some(v) = radius {
                    config.interpolation.kde_radius_km = v;
                }
            }
            Self::Clusters { k, max_iterations } => {
                if let Some(v) = k {
                    config.clustering.k = v;
                }
                if let Some(v) = max_iterations {
                    config.clustering.max_iterations = v;
                }
            }
            Self::Buffers { radius } => {
                if let Some(v) = radius {
                    config.zones.buffer_radius_km = v;
                }
            }
            Self::Accessibility { radius } => {
                if let Some(v) = radius {
                    config.accessibility.service_radius_km = v;
                }
            }
            Self::Regions {
                precision,
                min_count,
            } => {
                if let Some(v) = precision {
                    config.regions.precision = v;
                }
                if let Some(v) = min_count {
                    config.regions.min_count = v;
                }
            }
            _ => {}
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    log::info!("using config {}", path.display());
    Ok(parse_config(&text)?)
}

fn to_json(value: &impl Serialize) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

/// Runs the selected command and returns the text to print.
fn run(cli: &Cli) -> Result<String, CliError> {
    if matches!(cli.command, Commands::DefaultConfig) {
        return Ok(DEFAULT_CONFIG_TOML.to_string());
    }

    let mut config = load_config(cli.config.as_deref())?;
    cli.command.apply_overrides(&mut config);
    config.validate()?;

    let records = csv_source::load_path(&cli.input)?;
    let engine = GeoEngine::new().with_max_grid_points(config.interpolation.max_grid_points);

    let output = match cli.command {
        Commands::Stats => to_json(&aggregate::spatial_stats(&records)),
        Commands::Trend => to_json(&aggregate::temporal_trend(&records)),
        Commands::Density => to_json(&density::classify_density(&records)),
        Commands::MoransI => to_json(&autocorrelation::morans_i(
            &records,
            &engine,
            config.autocorrelation.warn_above,
        )?),
        Commands::Idw { .. } => to_json(&interpolation::idw_interpolate(
            &records,
            &engine,
            &IdwParams {
                cell_size_km: config.interpolation.idw_cell_size_km,
                power: config.interpolation.idw_power,
            },
        )?),
        Commands::Kde { .. } => to_json(&interpolation::kernel_density_surface(
            &records,
            &engine,
            &KernelDensityParams {
                cell_size_km: config.interpolation.kde_cell_size_km,
                radius_km: config.interpolation.kde_radius_km,
            },
        )?),
        Commands::Clusters { .. } => {
            let assignment = clustering::kmeans_cluster(
                &records,
                &clustering::KmeansParams {
                    k: config.clustering.k,
                    max_iterations: config.clustering.max_iterations,
                },
            )?;
            to_json(&geojson_output::clusters(&records, &assignment)?)
        }
        Commands::Buffers { .. } => to_json(&geojson_output::buffer_zones(&zones::buffer_zones(
            &records,
            &engine,
            config.zones.buffer_radius_km,
        )?)),
        Commands::Voronoi => to_json(&geojson_output::voronoi_cells(
            &zones::voronoi_tessellation(&records, &engine, &config.zones.voronoi_clip)?,
        )),
        Commands::Accessibility { .. } => to_json(&geojson_output::accessibility(
            &accessibility::accessibility(
                &records,
                &engine,
                config.accessibility.service_radius_km,
            )?,
        )),
        Commands::Distribution => to_json(&distribution::emotion_distribution(&records)?),
        Commands::Regions { .. } => to_json(&distribution::regional_patterns(
            &records,
            config.regions.precision,
            config.regions.min_count,
        )),
        Commands::Heatmap => to_json(&distribution::heatmap_points(&records)),
        Commands::Report => to_json(&report::build(&records, &engine, &config)),
        Commands::DefaultConfig => Ok(serde_json::Value::Null),
    }?;

    Ok(if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    println!("{}", output.trim_end());

    Ok(())
}

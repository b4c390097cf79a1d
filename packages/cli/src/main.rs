#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for depth-to-water predictions.

use std::path::PathBuf;

use aquifer_map_engine::{DepthEngine, EngineConfig, PredictError, ensure_artifacts};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aquifer_map", about = "Depth-to-water prediction tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict depth-to-water at a coordinate
    Predict {
        /// Latitude (WGS84)
        #[arg(long)]
        lat: f64,
        /// Longitude (WGS84)
        #[arg(long)]
        lon: f64,
        /// Override the interpolation radius in kilometers
        #[arg(long)]
        threshold_km: Option<f64>,
        /// Engine config TOML (defaults to the embedded configuration)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print well-network statistics
    Inspect {
        /// Engine config TOML (defaults to the embedded configuration)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Download the artifact bundle if any artifact is missing
    FetchArtifacts {
        /// Engine config TOML (defaults to the embedded configuration)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::embedded_default(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            lat,
            lon,
            threshold_km,
            config,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(threshold_km) = threshold_km {
                config.interpolation.threshold_km = threshold_km;
            }
            ensure_artifacts(&config).await?;

            let engine = DepthEngine::from_config(config)?;
            match engine.predict_depth(lat, lon).await {
                Ok(result) => {
                    println!(
                        "{:.2} m ({}) at ({lat}, {lon})",
                        result.depth_m, result.provenance
                    );
                }
                Err(e) => {
                    // Each failure kind renders distinctly for the caller.
                    match &e {
                        PredictError::InvalidCoordinates(_) => {
                            eprintln!("invalid coordinates: ({lat}, {lon})");
                        }
                        PredictError::ModelUnavailable(cause) => {
                            eprintln!(
                                "no wells within threshold and the prediction \
                                 model is unavailable: {cause}"
                            );
                        }
                        PredictError::Remote(_) | PredictError::Assembly(_) => {
                            eprintln!("prediction failed: {e}");
                        }
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Inspect { config } => {
            let config = load_config(config.as_ref())?;
            let graph = aquifer_map_wells::WellGraph::load(
                &config.artifacts.well_network,
                config.graph.build_threshold_km,
            )?;
            println!("wells: {}", graph.node_count());
            println!("proximity edges: {}", graph.edge_count());
            if let Some(bbox) = graph.bounding_box() {
                println!(
                    "extent: ({}, {}) .. ({}, {})",
                    bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon
                );
            }
        }
        Commands::FetchArtifacts { config } => {
            let config = load_config(config.as_ref())?;
            if ensure_artifacts(&config).await? {
                log::info!("artifact bundle fetched");
            } else {
                log::info!("artifacts already present");
            }
        }
    }

    Ok(())
}

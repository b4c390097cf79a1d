#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The prediction orchestrator.
//!
//! `predict_depth` is the entire public contract: interpolate from nearby
//! wells when any lie within the query radius, otherwise fall back to the
//! regression forest over remotely fetched soil/climate features. Every
//! failure surfaces as a typed [`PredictError`] — the engine never
//! swallows a collaborator failure into an ambiguous empty result, and it
//! never retries one.
//!
//! The engine holds only read-only shared state (the well graph, the
//! loaded forest), so any number of predictions may run concurrently over
//! one instance.

pub mod artifacts;
pub mod config;

pub use artifacts::{ArtifactError, ensure_artifacts};
pub use config::{ConfigError, EngineConfig};

use aquifer_map_earthdata::{
    EarthDataError, FeatureAssemblyError, FeatureSource, StatisticsClient, assemble,
};
use aquifer_map_geodesy::{Coordinate, CoordinateError};
use aquifer_map_regressor::{ModelError, RegressionForest};
use aquifer_map_wells::{GraphLoadError, WellGraph, interpolate};
use std::sync::Arc;
use thiserror::Error;

/// Errors from a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The query coordinate was invalid.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordinateError),

    /// The statistics service failed or timed out.
    #[error("feature fetch failed: {0}")]
    Remote(#[from] EarthDataError),

    /// Upstream statistics were missing a required feature.
    #[error(transparent)]
    Assembly(#[from] FeatureAssemblyError),

    /// No wells in range and the regression model never loaded. Carries
    /// the startup load failure so callers can tell why.
    #[error("no wells within threshold and the regression model is unavailable: {0}")]
    ModelUnavailable(Arc<ModelError>),
}

/// Errors from engine startup.
#[derive(Debug, Error)]
pub enum EngineInitError {
    /// Well-network artifact failed to load. Fatal.
    #[error(transparent)]
    Graph(#[from] GraphLoadError),

    /// Statistics client could not be constructed. Fatal.
    #[error(transparent)]
    Provider(#[from] EarthDataError),
}

/// How an estimate was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Inverse-distance interpolation over nearby wells.
    Interpolated {
        /// How many wells contributed.
        neighbors: usize,
    },
    /// Regression-forest fallback over remote features.
    Modeled,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interpolated { neighbors } => {
                write!(f, "interpolated from {neighbors} nearby well(s)")
            }
            Self::Modeled => write!(f, "modeled from soil/climate features"),
        }
    }
}

/// A successful depth estimate with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Estimated depth-to-water in meters.
    pub depth_m: f64,
    /// How the estimate was produced.
    pub provenance: Provenance,
}

/// The depth-to-water inference engine.
pub struct DepthEngine {
    config: EngineConfig,
    graph: WellGraph,
    forest: Result<RegressionForest, Arc<ModelError>>,
    features: Box<dyn FeatureSource>,
}

impl DepthEngine {
    /// Assembles an engine from already-loaded parts.
    ///
    /// `forest` carries the model load outcome; on `Err` the engine
    /// still serves interpolated predictions and reports
    /// [`PredictError::ModelUnavailable`] with that load failure only
    /// when the fallback path is actually needed.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        graph: WellGraph,
        forest: Result<RegressionForest, ModelError>,
        features: Box<dyn FeatureSource>,
    ) -> Self {
        Self {
            config,
            graph,
            forest: forest.map_err(Arc::new),
            features,
        }
    }

    /// Loads artifacts per `config` and constructs the engine.
    ///
    /// A graph load failure is fatal. A forest load failure is logged
    /// and deferred — interpolation keeps working.
    ///
    /// # Errors
    ///
    /// Returns [`EngineInitError`] if the well network cannot be loaded
    /// or the statistics client cannot be built.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineInitError> {
        let graph = WellGraph::load(
            &config.artifacts.well_network,
            config.graph.build_threshold_km,
        )?;
        let forest = RegressionForest::load(&config.artifacts.forest);
        if let Err(e) = &forest {
            log::error!("regression model unavailable, fallback path disabled: {e}");
        }
        let client = StatisticsClient::new(&config.provider.base_url, config.provider.timeout())?;
        Ok(Self::new(config, graph, forest, Box::new(client)))
    }

    /// The well graph (read-only; exposed for diagnostics).
    #[must_use]
    pub const fn graph(&self) -> &WellGraph {
        &self.graph
    }

    /// Estimates depth-to-water at (`lat`, `lon`).
    ///
    /// Tries interpolation first; the radius check decides the path, so
    /// the fallback runs only when no well lies within
    /// `interpolation.threshold_km`. No state outlives the call.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError`] for an invalid coordinate, a remote
    /// failure, schema drift, or an unavailable model on the fallback
    /// path.
    pub async fn predict_depth(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<PredictionResult, PredictError> {
        let requested = Coordinate::new(lat, lon)?;
        let coord = self.apply_compat_shift(requested)?;

        if let Some(estimate) =
            interpolate(&self.graph, coord, self.config.interpolation.threshold_km)
        {
            log::info!(
                "interpolated {:.2} m from {} neighbor(s) at ({lat}, {lon})",
                estimate.depth_m,
                estimate.neighbor_count
            );
            return Ok(PredictionResult {
                depth_m: estimate.depth_m,
                provenance: Provenance::Interpolated {
                    neighbors: estimate.neighbor_count,
                },
            });
        }

        // Check availability before spending remote calls.
        let forest = match &self.forest {
            Ok(forest) => forest,
            Err(cause) => return Err(PredictError::ModelUnavailable(Arc::clone(cause))),
        };

        let period = self.config.provider.date_range();
        let (soil, climate) = futures::try_join!(
            self.features.soil_stats(coord),
            self.features.climate_stats(coord, period),
        )?;
        let vector = assemble(coord, &soil, &climate)?;
        let depth_m = forest.predict(&vector);
        log::info!("modeled {depth_m:.2} m at ({lat}, {lon})");

        Ok(PredictionResult {
            depth_m,
            provenance: Provenance::Modeled,
        })
    }

    fn apply_compat_shift(&self, coord: Coordinate) -> Result<Coordinate, CoordinateError> {
        match self.config.compat.training_region_shift {
            Some(shift) => {
                log::warn!(
                    "training-region compatibility shift active: \
                     ({:+}, {:+}) applied to every query",
                    shift.lat_offset,
                    shift.lon_offset
                );
                coord.shifted(shift.lat_offset, shift.lon_offset)
            }
            None => Ok(coord),
        }
    }
}

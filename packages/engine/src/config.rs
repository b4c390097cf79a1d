//! Engine configuration.
//!
//! A single TOML document covering artifact paths, graph build and query
//! thresholds, the statistics provider, and the (off-by-default)
//! training-region compatibility shift. A default configuration is
//! embedded at compile time; deployments override it with a file of the
//! same shape.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aquifer_map_earthdata::DateRange;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file missing or unreadable.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config TOML malformed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Paths to the persisted artifacts, plus an optional bundle to fetch
/// them from when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Well-network artifact (JSON).
    pub well_network: PathBuf,
    /// Regression-forest artifact (JSON).
    pub forest: PathBuf,
    /// `.tar.gz` bundle containing both artifacts.
    #[serde(default)]
    pub bundle_url: Option<String>,
}

/// Graph construction parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GraphConfig {
    /// Pairwise distance below which wells get a proximity edge at load.
    pub build_threshold_km: f64,
}

/// Interpolation query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InterpolationConfig {
    /// Radius inside which wells contribute to interpolation. Applied
    /// before the interpolation-vs-fallback decision.
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
}

const fn default_threshold_km() -> f64 {
    5.0
}

/// Statistics provider connection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the statistics service.
    pub base_url: String,
    /// Hard per-request timeout.
    pub timeout_secs: u64,
    /// First day of the climate aggregation window.
    pub start_date: NaiveDate,
    /// Last day of the climate aggregation window.
    pub end_date: NaiveDate,
}

impl ProviderConfig {
    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Climate aggregation window.
    #[must_use]
    pub const fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// Fixed coordinate offsets applied to every query.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RegionShift {
    /// Degrees added to the query latitude.
    pub lat_offset: f64,
    /// Degrees added to the query longitude.
    pub lon_offset: f64,
}

/// Compatibility switches. All default to off.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CompatConfig {
    /// Shifts every query into the model's training region. A testing
    /// hack inherited from the first deployment; the engine warn-logs
    /// every prediction while it is enabled.
    #[serde(default)]
    pub training_region_shift: Option<RegionShift>,
}

/// The full engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Artifact locations.
    pub artifacts: ArtifactsConfig,
    /// Graph construction parameters.
    pub graph: GraphConfig,
    /// Interpolation query parameters.
    pub interpolation: InterpolationConfig,
    /// Statistics provider parameters.
    pub provider: ProviderConfig,
    /// Compatibility switches.
    #[serde(default)]
    pub compat: CompatConfig,
}

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

impl EngineConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time
    /// guarantee, exercised by tests).
    #[must_use]
    pub fn embedded_default() -> Self {
        toml::de::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(toml::de::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_parses() {
        let config = EngineConfig::embedded_default();
        assert!((config.interpolation.threshold_km - 5.0).abs() < f64::EPSILON);
        assert!((config.graph.build_threshold_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.provider.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn compat_shift_is_off_by_default() {
        let config = EngineConfig::embedded_default();
        assert!(config.compat.training_region_shift.is_none());
    }

    #[test]
    fn date_range_parses_iso_dates() {
        let range = EngineConfig::embedded_default().provider.date_range();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn parses_explicit_compat_shift() {
        let config: EngineConfig = toml::de::from_str(
            r#"
            [artifacts]
            well_network = "w.json"
            forest = "f.json"

            [graph]
            build_threshold_km = 5.0

            [interpolation]

            [provider]
            base_url = "http://localhost:8089"
            timeout_secs = 10
            start_date = "2023-01-01"
            end_date = "2023-12-31"

            [compat]
            training_region_shift = { lat_offset = 2.5, lon_offset = -80.0 }
            "#,
        )
        .unwrap();
        let shift = config.compat.training_region_shift.unwrap();
        assert!((shift.lat_offset - 2.5).abs() < f64::EPSILON);
        assert!((shift.lon_offset - -80.0).abs() < f64::EPSILON);
        // threshold_km falls back to its default when the section is empty
        assert!((config.interpolation.threshold_km - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_fails_on_missing_file() {
        assert!(matches!(
            EngineConfig::load(Path::new("/nonexistent/engine.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}

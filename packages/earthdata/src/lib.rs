#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Soil and climate features for the regression fallback path.
//!
//! When no well lies within the interpolation radius, the engine predicts
//! depth-to-water from remote geospatial statistics: per-depth-bin soil
//! properties and mean climate conditions at the query point. This crate
//! owns the [`FeatureSource`] seam, the HTTP statistics client behind it,
//! and the fixed-order feature schema shared with the regression model.
//!
//! No retries happen here — a transport failure or timeout surfaces as a
//! typed [`EarthDataError`] and retry policy belongs to the caller.

pub mod assemble;
pub mod client;
pub mod registry;
pub mod schema;

pub use assemble::assemble;
pub use client::StatisticsClient;
pub use schema::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};

use aquifer_map_geodesy::Coordinate;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors from talking to the remote statistics service.
#[derive(Debug, Error)]
pub enum EarthDataError {
    /// The request exceeded the configured timeout.
    #[error("statistics service timed out")]
    Timeout,

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("statistics response parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl From<reqwest::Error> for EarthDataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Errors from flattening upstream statistics into a feature vector.
///
/// A missing field means the provider and the model schema have drifted
/// apart; it must surface as an error, never as a defaulted zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureAssemblyError {
    /// A required feature was absent from the upstream statistics.
    #[error("required feature {name} missing from upstream statistics")]
    MissingField {
        /// The schema name of the missing feature.
        name: &'static str,
    },

    /// A feature value was NaN or infinite.
    #[error("feature {name} is not finite")]
    NotFinite {
        /// The schema name of the offending feature.
        name: &'static str,
    },
}

/// Inclusive date range for climate aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the aggregation window.
    pub start: NaiveDate,
    /// Last day of the aggregation window.
    pub end: NaiveDate,
}

/// Mean value per soil depth bin (cm below surface).
///
/// `None` means the upstream reducer returned no value for that bin
/// (masked pixels, coverage gaps); whether that is an error is the
/// assembler's decision, not the provider's.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthProfile {
    /// Surface (0 cm).
    pub b0: Option<f64>,
    /// 10 cm.
    pub b10: Option<f64>,
    /// 30 cm.
    pub b30: Option<f64>,
    /// 60 cm.
    pub b60: Option<f64>,
    /// 100 cm.
    pub b100: Option<f64>,
    /// 200 cm.
    pub b200: Option<f64>,
}

impl DepthProfile {
    /// Bin values in feature-schema order (lexicographic bin names,
    /// matching the artifact the model was trained against).
    #[must_use]
    pub const fn in_schema_order(&self) -> [Option<f64>; 6] {
        [self.b0, self.b10, self.b100, self.b200, self.b30, self.b60]
    }
}

/// Soil statistics at the query point, one profile per property.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoilStats {
    /// Soil pH (H2O).
    pub ph: DepthProfile,
    /// Organic carbon content.
    pub carbon: DepthProfile,
    /// Sand weight fraction.
    pub sand: DepthProfile,
    /// Silt / texture class.
    pub silt: DepthProfile,
    /// Clay weight fraction.
    pub clay: DepthProfile,
}

impl SoilStats {
    /// Profiles in feature-schema order.
    #[must_use]
    pub const fn profiles(&self) -> [&DepthProfile; 5] {
        [&self.ph, &self.carbon, &self.sand, &self.silt, &self.clay]
    }
}

/// Climate summary statistics over the configured date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateStats {
    /// Mean monthly precipitation (mm).
    pub ppt: Option<f64>,
    /// Mean temperature (deg C).
    pub tmean: Option<f64>,
}

/// Seam between the engine and the remote statistics service.
///
/// The orchestrator depends only on this trait; tests substitute mock
/// implementations. The two fetches are independent and the caller may
/// issue them concurrently.
#[async_trait::async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetches per-depth-bin soil statistics at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`EarthDataError`] on transport failure or timeout.
    async fn soil_stats(&self, coord: Coordinate) -> Result<SoilStats, EarthDataError>;

    /// Fetches climate summary statistics at `coord` over `period`.
    ///
    /// # Errors
    ///
    /// Returns [`EarthDataError`] on transport failure or timeout.
    async fn climate_stats(
        &self,
        coord: Coordinate,
        period: DateRange,
    ) -> Result<ClimateStats, EarthDataError>;
}

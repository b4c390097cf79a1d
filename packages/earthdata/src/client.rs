//! HTTP client for the geospatial statistics service.
//!
//! The service exposes reduce-style endpoints over the configured
//! datasets:
//!
//! - `GET /v1/reduce` — mean of an image's bands inside a buffer around
//!   a point.
//! - `GET /v1/reduce-collection` — mean over an image collection filtered
//!   to a date range, then reduced the same way.
//!
//! Responses carry a `bands` object mapping band name to mean value;
//! masked/no-coverage bands come back as `null`. Parsing is split into
//! standalone `parse_*` functions so it is testable without a network.

use std::time::Duration;

use aquifer_map_geodesy::Coordinate;
use serde_json::Value;

use crate::registry::{DatasetRegistry, SoilProperty, default_registry};
use crate::{ClimateStats, DateRange, DepthProfile, EarthDataError, FeatureSource, SoilStats};

/// Client for the statistics service, with a hard per-request timeout.
///
/// A timeout surfaces as [`EarthDataError::Timeout`]; no retries happen
/// at this layer.
pub struct StatisticsClient {
    client: reqwest::Client,
    base_url: String,
    registry: DatasetRegistry,
}

impl StatisticsClient {
    /// Creates a client against `base_url` using the embedded dataset
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`EarthDataError`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EarthDataError> {
        Self::with_registry(base_url, timeout, default_registry())
    }

    /// Creates a client with an explicit dataset registry.
    ///
    /// # Errors
    ///
    /// Returns [`EarthDataError`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn with_registry(
        base_url: &str,
        timeout: Duration,
        registry: DatasetRegistry,
    ) -> Result<Self, EarthDataError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            registry,
        })
    }

    async fn reduce_image(
        &self,
        image: &str,
        coord: Coordinate,
        buffer_m: f64,
        scale_m: f64,
    ) -> Result<Value, EarthDataError> {
        let url = format!("{}/v1/reduce", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("image", image.to_string()),
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("buffer_m", buffer_m.to_string()),
                ("scale_m", scale_m.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn reduce_collection(
        &self,
        collection: &str,
        bands: &str,
        coord: Coordinate,
        period: DateRange,
        buffer_m: f64,
        scale_m: f64,
    ) -> Result<Value, EarthDataError> {
        let url = format!("{}/v1/reduce-collection", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("collection", collection.to_string()),
                ("bands", bands.to_string()),
                ("start", period.start.format("%Y-%m-%d").to_string()),
                ("end", period.end.format("%Y-%m-%d").to_string()),
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("buffer_m", buffer_m.to_string()),
                ("scale_m", scale_m.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait::async_trait]
impl FeatureSource for StatisticsClient {
    async fn soil_stats(&self, coord: Coordinate) -> Result<SoilStats, EarthDataError> {
        let soil = &self.registry.soil;
        log::debug!(
            "fetching {} soil layers at ({}, {})",
            soil.layers.len(),
            coord.lat(),
            coord.lon()
        );

        // Layer fetches are independent; issue them concurrently.
        let bodies = futures::future::try_join_all(soil.layers.iter().map(|layer| async {
            let body = self
                .reduce_image(&layer.image, coord, soil.buffer_m, soil.scale_m)
                .await?;
            Ok::<_, EarthDataError>((layer.property, body))
        }))
        .await?;

        let mut stats = SoilStats::default();
        for (property, body) in bodies {
            let profile = parse_depth_profile(&body)?;
            match property {
                SoilProperty::Ph => stats.ph = profile,
                SoilProperty::Carbon => stats.carbon = profile,
                SoilProperty::Sand => stats.sand = profile,
                SoilProperty::Silt => stats.silt = profile,
                SoilProperty::Clay => stats.clay = profile,
            }
        }
        Ok(stats)
    }

    async fn climate_stats(
        &self,
        coord: Coordinate,
        period: DateRange,
    ) -> Result<ClimateStats, EarthDataError> {
        let climate = &self.registry.climate;
        let bands = format!(
            "{},{}",
            climate.precipitation_band, climate.temperature_band
        );
        let body = self
            .reduce_collection(
                &climate.collection,
                &bands,
                coord,
                period,
                climate.buffer_m,
                climate.scale_m,
            )
            .await?;
        parse_climate_stats(
            &body,
            &climate.precipitation_band,
            &climate.temperature_band,
        )
    }
}

/// Parses a soil reduce response into a depth profile.
///
/// # Errors
///
/// Returns [`EarthDataError::Parse`] if the body lacks a `bands` object
/// or a band is non-numeric. `null` bands become `None`.
pub fn parse_depth_profile(body: &Value) -> Result<DepthProfile, EarthDataError> {
    let bands = bands_object(body)?;
    Ok(DepthProfile {
        b0: band_value(bands, "b0")?,
        b10: band_value(bands, "b10")?,
        b30: band_value(bands, "b30")?,
        b60: band_value(bands, "b60")?,
        b100: band_value(bands, "b100")?,
        b200: band_value(bands, "b200")?,
    })
}

/// Parses a climate reduce response into climate statistics.
///
/// # Errors
///
/// Returns [`EarthDataError::Parse`] on a body without a `bands` object
/// or with non-numeric bands.
pub fn parse_climate_stats(
    body: &Value,
    precipitation_band: &str,
    temperature_band: &str,
) -> Result<ClimateStats, EarthDataError> {
    let bands = bands_object(body)?;
    Ok(ClimateStats {
        ppt: band_value(bands, precipitation_band)?,
        tmean: band_value(bands, temperature_band)?,
    })
}

fn bands_object(body: &Value) -> Result<&serde_json::Map<String, Value>, EarthDataError> {
    body["bands"].as_object().ok_or_else(|| EarthDataError::Parse {
        message: "missing bands object".to_string(),
    })
}

fn band_value(
    bands: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<Option<f64>, EarthDataError> {
    match bands.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| EarthDataError::Parse {
            message: format!("band {name} is not numeric"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_depth_profile() {
        let body = serde_json::json!({
            "bands": {
                "b0": 7.1, "b10": 7.0, "b30": 6.9,
                "b60": 6.8, "b100": 6.7, "b200": 6.6
            }
        });
        let profile = parse_depth_profile(&body).unwrap();
        assert_eq!(profile.b0, Some(7.1));
        assert_eq!(profile.b200, Some(6.6));
    }

    #[test]
    fn null_band_becomes_none() {
        let body = serde_json::json!({
            "bands": { "b0": 7.1, "b30": null }
        });
        let profile = parse_depth_profile(&body).unwrap();
        assert_eq!(profile.b0, Some(7.1));
        assert_eq!(profile.b30, None);
        assert_eq!(profile.b10, None);
    }

    #[test]
    fn non_numeric_band_is_a_parse_error() {
        let body = serde_json::json!({
            "bands": { "b0": "seven" }
        });
        assert!(matches!(
            parse_depth_profile(&body),
            Err(EarthDataError::Parse { .. })
        ));
    }

    #[test]
    fn missing_bands_object_is_a_parse_error() {
        let body = serde_json::json!({ "result": {} });
        assert!(matches!(
            parse_depth_profile(&body),
            Err(EarthDataError::Parse { .. })
        ));
    }

    #[test]
    fn parses_climate_bands_by_configured_name() {
        let body = serde_json::json!({
            "bands": { "ppt": 55.2, "tmean": 18.4 }
        });
        let stats = parse_climate_stats(&body, "ppt", "tmean").unwrap();
        assert_eq!(stats.ppt, Some(55.2));
        assert_eq!(stats.tmean, Some(18.4));
    }
}

//! Compile-time registry of dataset bindings.
//!
//! The images, bands, buffers, and scales the statistics client resolves
//! are defined in TOML files under `datasets/` and embedded at compile
//! time, so a schema/dataset change is a reviewed code change rather
//! than runtime configuration drift.

use serde::Deserialize;

/// A soil property the model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilProperty {
    /// Soil pH (H2O).
    Ph,
    /// Organic carbon content.
    Carbon,
    /// Sand weight fraction.
    Sand,
    /// Silt / texture class.
    Silt,
    /// Clay weight fraction.
    Clay,
}

/// One soil raster binding.
#[derive(Debug, Clone, Deserialize)]
pub struct SoilLayer {
    /// Which property this layer provides.
    pub property: SoilProperty,
    /// Image id on the statistics service.
    pub image: String,
}

/// Soil dataset bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct SoilDatasets {
    /// Buffer radius around the query point, meters.
    pub buffer_m: f64,
    /// Reduction pixel scale, meters.
    pub scale_m: f64,
    /// One layer per soil property.
    pub layers: Vec<SoilLayer>,
}

/// Climate dataset binding.
#[derive(Debug, Clone, Deserialize)]
pub struct ClimateDataset {
    /// Image collection id on the statistics service.
    pub collection: String,
    /// Band holding mean precipitation.
    pub precipitation_band: String,
    /// Band holding mean temperature.
    pub temperature_band: String,
    /// Buffer radius around the query point, meters.
    pub buffer_m: f64,
    /// Reduction pixel scale, meters.
    pub scale_m: f64,
}

/// All dataset bindings used by the statistics client.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    /// Soil raster bindings.
    pub soil: SoilDatasets,
    /// Climate collection binding.
    pub climate: ClimateDataset,
}

const SOIL_TOML: &str = include_str!("../datasets/soil.toml");
const CLIMATE_TOML: &str = include_str!("../datasets/climate.toml");

/// Returns the embedded dataset registry.
///
/// # Panics
///
/// Panics if an embedded TOML is malformed (a compile-time guarantee,
/// exercised by tests).
#[must_use]
pub fn default_registry() -> DatasetRegistry {
    DatasetRegistry {
        soil: toml::de::from_str(SOIL_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse soil dataset registry: {e}")),
        climate: toml::de::from_str(CLIMATE_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse climate dataset registry: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_registry_parses() {
        let registry = default_registry();
        assert_eq!(registry.soil.layers.len(), 5);
        assert_eq!(registry.climate.precipitation_band, "ppt");
        assert_eq!(registry.climate.temperature_band, "tmean");
    }

    #[test]
    fn every_soil_property_has_exactly_one_layer() {
        let registry = default_registry();
        for property in [
            SoilProperty::Ph,
            SoilProperty::Carbon,
            SoilProperty::Sand,
            SoilProperty::Silt,
            SoilProperty::Clay,
        ] {
            let count = registry
                .soil
                .layers
                .iter()
                .filter(|l| l.property == property)
                .count();
            assert_eq!(count, 1, "{property:?}");
        }
    }

    #[test]
    fn soil_uses_raster_resolution() {
        let registry = default_registry();
        assert!((registry.soil.buffer_m - 30.0).abs() < f64::EPSILON);
        assert!((registry.climate.buffer_m - 1000.0).abs() < f64::EPSILON);
    }
}

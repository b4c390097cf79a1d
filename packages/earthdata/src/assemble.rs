//! Flattening upstream statistics into the model's feature vector.

use aquifer_map_geodesy::Coordinate;

use crate::schema::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::{ClimateStats, FeatureAssemblyError, SoilStats};

/// Flattens soil and climate statistics plus the query coordinate into
/// the fixed-order feature vector.
///
/// Positions follow [`FEATURE_NAMES`]: thirty soil bins, two climate
/// means, then latitude and longitude.
///
/// # Errors
///
/// Returns [`FeatureAssemblyError::MissingField`] naming the first absent
/// feature — absence signals schema drift between the provider and the
/// model and is never papered over with a default — and
/// [`FeatureAssemblyError::NotFinite`] for NaN/infinite upstream values.
pub fn assemble(
    coord: Coordinate,
    soil: &SoilStats,
    climate: &ClimateStats,
) -> Result<FeatureVector, FeatureAssemblyError> {
    let mut values = [0.0; FEATURE_COUNT];
    let mut index = 0;

    for profile in soil.profiles() {
        for value in profile.in_schema_order() {
            values[index] = required(FEATURE_NAMES[index], value)?;
            index += 1;
        }
    }

    values[index] = required(FEATURE_NAMES[index], climate.ppt)?;
    index += 1;
    values[index] = required(FEATURE_NAMES[index], climate.tmean)?;
    index += 1;

    values[index] = coord.lat();
    values[index + 1] = coord.lon();
    debug_assert_eq!(index + 2, FEATURE_COUNT);

    Ok(FeatureVector::from_values(values))
}

fn required(name: &'static str, value: Option<f64>) -> Result<f64, FeatureAssemblyError> {
    let v = value.ok_or(FeatureAssemblyError::MissingField { name })?;
    if !v.is_finite() {
        return Err(FeatureAssemblyError::NotFinite { name });
    }
    Ok(v)
}

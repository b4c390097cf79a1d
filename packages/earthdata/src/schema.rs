//! The fixed-order feature contract shared with the regression model.
//!
//! [`FEATURE_NAMES`] is the single source of truth: the assembler fills
//! positions in exactly this order, and the regressor refuses any
//! artifact whose declared feature names differ.

/// Number of features the model consumes.
pub const FEATURE_COUNT: usize = 34;

/// Ordered feature names, exactly as the regression artifact was trained.
///
/// Per soil property the bins run in lexicographic name order
/// (`b0, b10, b100, b200, b30, b60`); climate means follow, and the query
/// latitude/longitude come last.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "soil_ph_b0",
    "soil_ph_b10",
    "soil_ph_b100",
    "soil_ph_b200",
    "soil_ph_b30",
    "soil_ph_b60",
    "soil_carbon_b0",
    "soil_carbon_b10",
    "soil_carbon_b100",
    "soil_carbon_b200",
    "soil_carbon_b30",
    "soil_carbon_b60",
    "soil_sand_b0",
    "soil_sand_b10",
    "soil_sand_b100",
    "soil_sand_b200",
    "soil_sand_b30",
    "soil_sand_b60",
    "soil_silt_b0",
    "soil_silt_b10",
    "soil_silt_b100",
    "soil_silt_b200",
    "soil_silt_b30",
    "soil_silt_b60",
    "soil_clay_b0",
    "soil_clay_b10",
    "soil_clay_b100",
    "soil_clay_b200",
    "soil_clay_b30",
    "soil_clay_b60",
    "climate_ppt",
    "climate_tmean",
    "lat",
    "lon",
];

/// An assembled, fixed-order feature vector.
///
/// Built fresh per query by [`crate::assemble`] and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Wraps raw values already in schema order.
    ///
    /// Production code goes through the assembler; this exists for
    /// artifact tooling and tests.
    #[must_use]
    pub const fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// The values, in [`FEATURE_NAMES`] order.
    #[must_use]
    pub const fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Looks a value up by schema name. A diagnostics helper (linear
    /// scan); prediction paths index by position instead.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}

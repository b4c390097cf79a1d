#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geodesic primitives shared across the well-network crates.
//!
//! A [`Coordinate`] is a validated WGS84 latitude/longitude pair;
//! [`distance_km`] is the haversine great-circle distance between two of
//! them. Both are pure and stateless — all spatial state lives in the
//! well graph.

use thiserror::Error;

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (also per degree of longitude at the
/// equator). Used for degree-padded bounding boxes around a radius query.
pub const KM_PER_DEG: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Errors from coordinate validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude or longitude was NaN or infinite.
    #[error("{axis} is not finite")]
    NotFinite {
        /// Which axis was rejected (`"latitude"` or `"longitude"`).
        axis: &'static str,
    },

    /// Value outside the valid WGS84 range.
    #[error("{axis} {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Which axis was rejected.
        axis: &'static str,
        /// The offending value.
        value: f64,
        /// Lower bound of the valid range.
        min: f64,
        /// Upper bound of the valid range.
        max: f64,
    },
}

/// A validated WGS84 coordinate.
///
/// Construction goes through [`Coordinate::new`], so every `Coordinate`
/// in the system carries finite, in-range values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Validates and constructs a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either value is non-finite or
    /// outside [-90, 90] latitude / [-180, 180] longitude.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        check_axis("latitude", lat, 90.0)?;
        check_axis("longitude", lon, 180.0)?;
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Returns this coordinate shifted by the given offsets, re-validated.
    ///
    /// Used only by the explicit training-region compatibility mode; a
    /// shift that leaves the valid range is an error, not a wrap.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if the shifted coordinate is invalid.
    pub fn shifted(self, lat_offset: f64, lon_offset: f64) -> Result<Self, CoordinateError> {
        Self::new(self.lat + lat_offset, self.lon + lon_offset)
    }
}

fn check_axis(axis: &'static str, value: f64, bound: f64) -> Result<(), CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NotFinite { axis });
    }
    if value < -bound || value > bound {
        return Err(CoordinateError::OutOfRange {
            axis,
            value,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}

/// Haversine great-circle distance between two coordinates, in kilometers.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn accepts_valid_coordinates() {
        assert!(Coordinate::new(34.0, -6.8).is_ok());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            Coordinate::new(90.1, 0.0),
            Err(CoordinateError::OutOfRange {
                axis: "latitude",
                ..
            })
        ));
        assert!(matches!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::OutOfRange {
                axis: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NotFinite { axis: "latitude" })
        ));
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::NotFinite { axis: "longitude" })
        ));
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = coord(34.0, -6.8);
        assert!(distance_km(p, p).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = coord(40.7128, -74.0060);
        let b = coord(51.5074, -0.1278);
        let ab = distance_km(a, b);
        let ba = distance_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn nyc_to_london_is_about_5570_km() {
        let nyc = coord(40.7128, -74.0060);
        let london = coord(51.5074, -0.1278);
        let d = distance_km(nyc, london);
        assert!((d - 5570.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn short_distance_near_rabat() {
        // One-hundredth of a degree in each axis at 34N is well under 5 km.
        let d = distance_km(coord(34.0, -6.8), coord(34.01, -6.81));
        assert!(d > 1.3 && d < 1.6, "got {d}");
    }

    #[test]
    fn shift_revalidates() {
        let p = coord(89.0, 0.0);
        assert!(p.shifted(2.5, -80.0).is_err());
        let q = coord(31.79, 73.17).shifted(2.5, -80.0).unwrap();
        assert!((q.lat() - 34.29).abs() < 1e-9);
        assert!((q.lon() - -6.83).abs() < 1e-9);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types for the persisted well-network artifact.
//!
//! The artifact is a JSON document exported from the licensing records:
//! every known well with its observed depth-to-water, plus (optionally)
//! proximity edges precomputed at export time. These types are pure data;
//! graph construction and validation live in `aquifer_map_wells`.

use serde::{Deserialize, Serialize};

/// A known well as persisted in the network artifact.
///
/// Immutable once loaded — the well set is ground truth and is never
/// mutated by a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    /// Stable unique identifier (licensing record number).
    pub id: String,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
    /// Observed depth-to-water in meters.
    pub depth_to_water_m: f64,
}

/// A precomputed proximity edge between two wells.
///
/// Unordered pair; the weight is the geodesic distance between the two
/// wells in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityEdge {
    /// One endpoint's well id.
    pub a: String,
    /// The other endpoint's well id.
    pub b: String,
    /// Geodesic distance between the endpoints, in kilometers.
    pub distance_km: f64,
}

/// The persisted well-network artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellNetworkArtifact {
    /// All known wells.
    pub wells: Vec<Well>,
    /// Proximity edges precomputed at export time. When absent, the
    /// loader derives them from the configured build threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<ProximityEdge>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_artifact_without_edges() {
        let json = r#"{
            "wells": [
                {"id": "W-001", "lat": 34.0, "lon": -6.8, "depth_to_water_m": 12.0}
            ]
        }"#;
        let artifact: WellNetworkArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.wells.len(), 1);
        assert_eq!(artifact.wells[0].id, "W-001");
        assert!(artifact.edges.is_none());
    }

    #[test]
    fn deserializes_artifact_with_edges() {
        let json = r#"{
            "wells": [
                {"id": "W-001", "lat": 34.0, "lon": -6.8, "depth_to_water_m": 12.0},
                {"id": "W-002", "lat": 34.01, "lon": -6.81, "depth_to_water_m": 14.0}
            ],
            "edges": [
                {"a": "W-001", "b": "W-002", "distance_km": 1.44}
            ]
        }"#;
        let artifact: WellNetworkArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.edges.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn round_trips_through_json() {
        let artifact = WellNetworkArtifact {
            wells: vec![Well {
                id: "W-001".to_string(),
                lat: 34.0,
                lon: -6.8,
                depth_to_water_m: 12.0,
            }],
            edges: None,
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let back: WellNetworkArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(artifact, back);
    }
}

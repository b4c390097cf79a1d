//! Inverse-distance-weighted depth interpolation.

use aquifer_map_geodesy::Coordinate;

use crate::WellGraph;

/// An interpolated depth estimate and how many wells contributed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Estimated depth-to-water in meters.
    pub depth_m: f64,
    /// Number of wells that contributed to the estimate.
    pub neighbor_count: usize,
}

/// Estimates depth-to-water at `coord` from wells within `threshold_km`.
///
/// Returns `None` when no well qualifies, which is the caller's signal to
/// fall back to the regression model. The threshold is applied here, before
/// that decision — edges persisted at graph-build time never influence it.
///
/// Wells at distance zero (exact coordinate matches) are averaged with
/// equal weight and short-circuit the inverse weighting, so a zero
/// distance never reaches a division.
#[must_use]
pub fn interpolate(graph: &WellGraph, coord: Coordinate, threshold_km: f64) -> Option<Estimate> {
    let neighbors = graph.neighbors_within(coord, threshold_km);
    if neighbors.is_empty() {
        log::debug!(
            "no wells within {threshold_km} km of ({}, {})",
            coord.lat(),
            coord.lon()
        );
        return None;
    }

    let exact: Vec<f64> = neighbors
        .iter()
        .filter(|(_, distance)| *distance == 0.0)
        .map(|(well, _)| well.depth_to_water_m)
        .collect();
    if !exact.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let depth_m = exact.iter().sum::<f64>() / exact.len() as f64;
        return Some(Estimate {
            depth_m,
            neighbor_count: exact.len(),
        });
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (well, distance) in &neighbors {
        let weight = 1.0 / distance;
        weighted_sum += well.depth_to_water_m * weight;
        total_weight += weight;
    }

    Some(Estimate {
        depth_m: weighted_sum / total_weight,
        neighbor_count: neighbors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquifer_map_wells_models::{Well, WellNetworkArtifact};

    fn well(id: &str, lat: f64, lon: f64, depth: f64) -> Well {
        Well {
            id: id.to_string(),
            lat,
            lon,
            depth_to_water_m: depth,
        }
    }

    fn graph_of(wells: Vec<Well>) -> WellGraph {
        WellGraph::from_artifact(WellNetworkArtifact { wells, edges: None }, 5.0).unwrap()
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn none_when_no_well_in_range() {
        let graph = graph_of(vec![well("w", 34.0, -6.8, 12.0)]);
        assert!(interpolate(&graph, coord(0.0, 0.0), 5.0).is_none());
    }

    #[test]
    fn single_neighbor_returns_its_depth_exactly() {
        let graph = graph_of(vec![well("w", 34.0, -6.8, 12.0)]);
        let estimate = interpolate(&graph, coord(34.01, -6.81), 5.0).unwrap();
        assert!((estimate.depth_m - 12.0).abs() < 1e-12);
        assert_eq!(estimate.neighbor_count, 1);
    }

    #[test]
    fn exact_match_returns_well_depth_without_dividing() {
        let graph = graph_of(vec![
            well("hit", 34.0, -6.8, 12.0),
            well("other", 34.01, -6.81, 40.0),
        ]);
        let estimate = interpolate(&graph, coord(34.0, -6.8), 5.0).unwrap();
        assert!((estimate.depth_m - 12.0).abs() < 1e-12);
        assert_eq!(estimate.neighbor_count, 1);
        assert!(estimate.depth_m.is_finite());
    }

    #[test]
    fn two_exact_matches_are_averaged_equally() {
        let graph = graph_of(vec![
            well("x", 34.0, -6.8, 10.0),
            well("y", 34.0, -6.8, 20.0),
        ]);
        let estimate = interpolate(&graph, coord(34.0, -6.8), 5.0).unwrap();
        assert!((estimate.depth_m - 15.0).abs() < 1e-12);
        assert_eq!(estimate.neighbor_count, 2);
    }

    #[test]
    fn closer_wells_weigh_more() {
        // Same bearing, doubled offset: "near" must dominate the mean.
        let graph = graph_of(vec![
            well("near", 34.01, -6.8, 10.0),
            well("far", 34.02, -6.8, 30.0),
        ]);
        let estimate = interpolate(&graph, coord(34.0, -6.8), 5.0).unwrap();
        assert_eq!(estimate.neighbor_count, 2);
        // Equal weights would give 20.0; inverse-distance pulls it toward 10.
        assert!(estimate.depth_m < 20.0);
        assert!(estimate.depth_m > 10.0);
    }

    #[test]
    fn weight_ratio_matches_inverse_distance() {
        // Distances are ~1:2, so the weighted mean sits at one third of
        // the way from the near depth to the far depth.
        let graph = graph_of(vec![
            well("near", 34.01, -6.8, 0.0),
            well("far", 34.02, -6.8, 30.0),
        ]);
        let estimate = interpolate(&graph, coord(34.0, -6.8), 5.0).unwrap();
        assert!((estimate.depth_m - 10.0).abs() < 0.1, "got {}", estimate.depth_m);
    }

    #[test]
    fn interpolation_has_no_observable_side_effects() {
        let graph = graph_of(vec![
            well("a", 34.0, -6.8, 12.0),
            well("b", 34.01, -6.81, 14.0),
        ]);
        let (nodes, edges) = (graph.node_count(), graph.edge_count());
        let first = interpolate(&graph, coord(34.005, -6.805), 5.0).unwrap();
        let second = interpolate(&graph, coord(34.005, -6.805), 5.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), nodes);
        assert_eq!(graph.edge_count(), edges);
    }
}

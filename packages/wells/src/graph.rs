//! In-memory well graph backed by an R-tree.
//!
//! Wells are indexed as points keyed `[lon, lat]`; a radius query runs a
//! degree-padded envelope pre-filter through the R-tree and then an exact
//! haversine check. The envelope is split when the query window crosses
//! the antimeridian so wrap-around neighbors are not missed.

use std::collections::BTreeMap;
use std::path::Path;

use aquifer_map_geodesy::{Coordinate, KM_PER_DEG, distance_km};
use aquifer_map_wells_models::{ProximityEdge, Well, WellNetworkArtifact};
use rstar::{AABB, RTree, RTreeObject};

use crate::GraphLoadError;

/// A well stored in the R-tree, referencing the graph's well list.
#[derive(Debug)]
struct WellEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for WellEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Geographic extent of the loaded wells, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Westernmost longitude.
    pub min_lon: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
    /// Easternmost longitude.
    pub max_lon: f64,
}

/// The loaded well network: all wells, their proximity edges, and a
/// spatial index over them.
///
/// Strictly read-only after construction. Every query method takes
/// `&self`, so the node/edge sets are bit-for-bit identical before and
/// after any prediction, on every exit path.
#[derive(Debug)]
pub struct WellGraph {
    wells: Vec<Well>,
    coords: Vec<Coordinate>,
    edges: Vec<ProximityEdge>,
    tree: RTree<WellEntry>,
}

impl WellGraph {
    /// Loads the persisted artifact and builds the graph.
    ///
    /// Precomputed edges in the artifact are validated and kept; when the
    /// artifact carries none, edges are derived for every pair of wells
    /// closer than `build_threshold_km`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphLoadError`] if the artifact is missing, malformed,
    /// or contains invalid wells.
    pub fn load(path: &Path, build_threshold_km: f64) -> Result<Self, GraphLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|e| GraphLoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let artifact: WellNetworkArtifact = serde_json::from_str(&raw)?;
        let graph = Self::from_artifact(artifact, build_threshold_km)?;
        log::info!(
            "Loaded well network from {}: {} wells, {} proximity edges",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Builds the graph from an already-deserialized artifact.
    ///
    /// # Errors
    ///
    /// Returns [`GraphLoadError`] on invalid coordinates, duplicate well
    /// ids, or edges referencing unknown wells.
    pub fn from_artifact(
        artifact: WellNetworkArtifact,
        build_threshold_km: f64,
    ) -> Result<Self, GraphLoadError> {
        let wells = artifact.wells;

        let mut coords = Vec::with_capacity(wells.len());
        let mut by_id: BTreeMap<&str, usize> = BTreeMap::new();
        for (index, well) in wells.iter().enumerate() {
            let coord =
                Coordinate::new(well.lat, well.lon).map_err(|e| GraphLoadError::InvalidWell {
                    id: well.id.clone(),
                    source: e,
                })?;
            if by_id.insert(well.id.as_str(), index).is_some() {
                return Err(GraphLoadError::DuplicateId {
                    id: well.id.clone(),
                });
            }
            coords.push(coord);
        }

        let edges = match artifact.edges {
            Some(edges) => {
                for edge in &edges {
                    for endpoint in [&edge.a, &edge.b] {
                        if !by_id.contains_key(endpoint.as_str()) {
                            return Err(GraphLoadError::UnknownEdgeEndpoint {
                                id: endpoint.clone(),
                            });
                        }
                    }
                }
                edges
            }
            None => derive_edges(&wells, &coords, build_threshold_km),
        };

        let entries = coords
            .iter()
            .enumerate()
            .map(|(index, coord)| WellEntry {
                index,
                envelope: AABB::from_point([coord.lon(), coord.lat()]),
            })
            .collect();

        Ok(Self {
            wells,
            coords,
            edges,
            tree: RTree::bulk_load(entries),
        })
    }

    /// All wells within `threshold_km` of `coord`, with their exact
    /// haversine distance, sorted nearest-first (ties broken by id).
    ///
    /// Read-only: no transient node is ever inserted.
    #[must_use]
    pub fn neighbors_within(&self, coord: Coordinate, threshold_km: f64) -> Vec<(&Well, f64)> {
        let mut out: Vec<(&Well, f64)> = Vec::new();
        for envelope in query_envelopes(coord, threshold_km) {
            for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
                let distance = distance_km(coord, self.coords[entry.index]);
                if distance < threshold_km {
                    out.push((&self.wells[entry.index], distance));
                }
            }
        }
        out.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
        out
    }

    /// Number of wells in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.wells.len()
    }

    /// Number of proximity edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All wells, in artifact order.
    #[must_use]
    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    /// Geographic extent of the wells, or `None` for an empty graph.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.coords.first()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat(),
            min_lon: first.lon(),
            max_lat: first.lat(),
            max_lon: first.lon(),
        };
        for coord in &self.coords[1..] {
            bbox.min_lat = bbox.min_lat.min(coord.lat());
            bbox.min_lon = bbox.min_lon.min(coord.lon());
            bbox.max_lat = bbox.max_lat.max(coord.lat());
            bbox.max_lon = bbox.max_lon.max(coord.lon());
        }
        Some(bbox)
    }
}

/// Derives proximity edges for every pair of wells closer than the
/// threshold. Quadratic, but runs once at load time.
fn derive_edges(wells: &[Well], coords: &[Coordinate], threshold_km: f64) -> Vec<ProximityEdge> {
    let mut edges = Vec::new();
    for i in 0..wells.len() {
        for j in (i + 1)..wells.len() {
            let distance = distance_km(coords[i], coords[j]);
            if distance < threshold_km {
                edges.push(ProximityEdge {
                    a: wells[i].id.clone(),
                    b: wells[j].id.clone(),
                    distance_km: distance,
                });
            }
        }
    }
    edges
}

/// Degree-padded bounding boxes covering the radius query.
///
/// Longitude padding uses the cosine at the window's poleward edge, so
/// the envelope over-covers rather than under-covers; the exact haversine
/// check afterwards discards the excess. Returns two envelopes when the
/// longitude window crosses the antimeridian.
fn query_envelopes(coord: Coordinate, threshold_km: f64) -> Vec<AABB<[f64; 2]>> {
    let lat_pad = threshold_km / KM_PER_DEG;
    let lat_lo = (coord.lat() - lat_pad).max(-90.0);
    let lat_hi = (coord.lat() + lat_pad).min(90.0);

    // Poleward edge of the window has the smallest cosine.
    let extreme_lat = (coord.lat().abs() + lat_pad).min(90.0);
    let cos_min = extreme_lat.to_radians().cos();
    let lon_pad = if cos_min <= 1e-9 {
        360.0
    } else {
        threshold_km / (KM_PER_DEG * cos_min)
    };

    if lon_pad >= 180.0 {
        return vec![AABB::from_corners([-180.0, lat_lo], [180.0, lat_hi])];
    }

    let lon_lo = coord.lon() - lon_pad;
    let lon_hi = coord.lon() + lon_pad;
    if lon_lo < -180.0 {
        vec![
            AABB::from_corners([-180.0, lat_lo], [lon_hi, lat_hi]),
            AABB::from_corners([lon_lo + 360.0, lat_lo], [180.0, lat_hi]),
        ]
    } else if lon_hi > 180.0 {
        vec![
            AABB::from_corners([lon_lo, lat_lo], [180.0, lat_hi]),
            AABB::from_corners([-180.0, lat_lo], [lon_hi - 360.0, lat_hi]),
        ]
    } else {
        vec![AABB::from_corners([lon_lo, lat_lo], [lon_hi, lat_hi])]
    }
}

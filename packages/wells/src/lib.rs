#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The well-network graph and its interpolation query.
//!
//! Loads the persisted well-network artifact once at startup, indexes the
//! wells in an R-tree, and answers radius queries without ever mutating
//! shared state. The graph is strictly read-only after load — a query
//! never inserts a transient node into it — so concurrent predictions
//! cannot interfere and there is no cleanup path to get wrong.

pub mod graph;
pub mod interpolate;

pub use graph::{BoundingBox, WellGraph};
pub use interpolate::{Estimate, interpolate};

use aquifer_map_geodesy::CoordinateError;
use thiserror::Error;

/// Errors from loading the well-network artifact.
///
/// All variants are fatal at startup and are propagated, never retried.
#[derive(Debug, Error)]
pub enum GraphLoadError {
    /// Artifact file missing or unreadable.
    #[error("failed to read well network artifact {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Artifact JSON malformed.
    #[error("failed to parse well network artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// A well row carried an invalid coordinate.
    #[error("well {id} has an invalid coordinate: {source}")]
    InvalidWell {
        /// The offending well id.
        id: String,
        /// Validation failure detail.
        #[source]
        source: CoordinateError,
    },

    /// Two wells share the same id.
    #[error("duplicate well id {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// A precomputed edge referenced a well id not present in the artifact.
    #[error("proximity edge references unknown well {id}")]
    UnknownEdgeEndpoint {
        /// The missing endpoint id.
        id: String,
    },
}

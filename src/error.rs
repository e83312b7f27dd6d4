//! Error types for subsurf.
//!
//! Construction from polygon soup is the only fallible step of the core;
//! everything downstream of a successfully built mesh is infallible apart
//! from index-width overflow and file I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, subdividing or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The input has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners.
    #[error("face {face} has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// The face index.
        face: usize,
        /// Number of corners supplied.
        count: usize,
    },

    /// A face visits the same vertex twice.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge has more than two incident faces.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Two faces traverse the same edge in the same direction.
    #[error("edge ({v0}, {v1}) is traversed twice in the same direction (inconsistent winding)")]
    InconsistentOrientation {
        /// Origin of the repeated directed edge.
        v0: usize,
        /// Destination of the repeated directed edge.
        v1: usize,
    },

    /// The faces around a vertex do not form a single fan.
    #[error("vertex {vertex} is non-manifold (its faces do not form a single fan)")]
    NonManifoldVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// The mesh has more elements than the index type can address.
    #[error("{count} elements exceed the index capacity of {max}")]
    IndexOverflow {
        /// Number of elements requested.
        count: usize,
        /// Largest addressable index.
        max: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether this error was raised while validating input topology.
    pub fn is_topology_error(&self) -> bool {
        matches!(
            self,
            MeshError::EmptyMesh
                | MeshError::InvalidVertexIndex { .. }
                | MeshError::TooFewVertices { .. }
                | MeshError::DegenerateFace { .. }
                | MeshError::NonManifoldEdge { .. }
                | MeshError::InconsistentOrientation { .. }
                | MeshError::NonManifoldVertex { .. }
        )
    }
}

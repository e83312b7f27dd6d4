//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation, its builder, and
//! the render buffers derived from it.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a manifold polygon
//! mesh (faces of any valence, optionally with open boundaries) using a
//! half-edge data structure. Vertices, half-edges and faces live in arenas
//! owned by the mesh and refer to each other by index, which gives O(1)
//! adjacency queries without shared ownership.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies a full edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! Meshes are built once from polygon soup and never edited topologically:
//!
//! ```
//! use subsurf::mesh::{HalfEdgeMesh, build_from_polygons};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! ```

mod attributes;
mod builder;
mod halfedge;
mod index;
pub mod primitives;

pub use attributes::MeshAttributes;
pub use builder::{build_from_polygons, to_face_vertex, MeshBuilder};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

//! # Subsurf
//!
//! Catmull-Clark subdivision surfaces on a half-edge mesh.
//!
//! Subsurf turns polygon soup into a manifold half-edge mesh, refines it with
//! Catmull-Clark subdivision, projects vertices onto the limit surface and
//! extracts the regular bicubic patches a GPU tessellator can evaluate
//! directly.
//!
//! ## Features
//!
//! - **Half-edge data structure**: arena storage with type-safe indices and
//!   open boundaries
//! - **Flexible indexing**: 16-bit, 32-bit or 64-bit indices
//! - **Catmull-Clark subdivision** for faces of any valence, parallel with rayon
//! - **Limit projection** in closed form, interior and boundary
//! - **Regular patch extraction** into 16-point control grids
//! - **Render buffers** ready for upload through `bytemuck`
//!
//! ## Quick Start
//!
//! ```no_run
//! use subsurf::prelude::*;
//! use subsurf::algo::subdivide::{catmull_clark_subdivide, limit_positions};
//!
//! let mesh: HalfEdgeMesh = subsurf::io::load("model.obj").unwrap();
//!
//! let options = SubdivideOptions::new(3);
//! let refined = catmull_clark_subdivide(&mesh, &options).unwrap();
//! let limit = limit_positions(&refined, &options);
//!
//! subsurf::io::save(&limit, "smooth.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use subsurf::prelude::*;
//! use nalgebra::Point3;
//!
//! // A square pyramid: one quad and four triangles
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces: Vec<Vec<usize>> = vec![
//!     vec![0, 3, 2, 1],
//!     vec![0, 1, 4],
//!     vec![1, 2, 4],
//!     vec![2, 3, 4],
//!     vec![3, 0, 4],
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 8);
//! assert_eq!(mesh.valence(VertexId::new(4)), 4);
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Render Buffers
//!
//! ```
//! use subsurf::prelude::*;
//!
//! let mut torus: HalfEdgeMesh = subsurf::mesh::primitives::torus(8, 8, 2.0, 0.5).unwrap();
//! let buffers = torus.extract_attributes();
//!
//! assert_eq!(buffers.num_polygons(), 64);
//! assert_eq!(buffers.num_regular_patches(), 64);
//! assert_eq!(buffers.patch_index_bytes().len(), 64 * 16 * 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use subsurf::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::subdivide::{SubdivideOptions, Subdivider};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, to_face_vertex, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, MeshBuilder, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::algo::patches::regular_patches;
    use super::algo::subdivide::{
        CatmullClarkSubdivider, LimitPositionSubdivider, SubdivisionHierarchy,
    };
    use super::prelude::*;
    use nalgebra::Point3;

    fn create_pyramid() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces: Vec<Vec<usize>> = vec![
            vec![0, 3, 2, 1],
            vec![0, 1, 4],
            vec![1, 2, 4],
            vec![2, 3, 4],
            vec![3, 0, 4],
        ];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_pyramid_pipeline() {
        let pyramid = create_pyramid();
        assert_eq!(pyramid.num_halfedges(), 16);
        for v in pyramid.vertex_ids() {
            assert!(!pyramid.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }

        let mut hierarchy = SubdivisionHierarchy::new(pyramid);
        let level1 = hierarchy.level(1).unwrap();
        // 5 + 8 + 5 vertices, 4 + 4 * 3 quads
        assert_eq!(level1.num_vertices(), 18);
        assert_eq!(level1.num_faces(), 16);
        assert!(level1.is_quad_mesh());

        let mut limit = hierarchy.limit_surface(3).unwrap().clone();
        assert!(limit.is_valid());
        let num_faces = limit.num_faces();
        let num_patches = regular_patches(&limit).len();
        let buffers = limit.extract_attributes();
        assert_eq!(buffers.num_polygons(), num_faces);
        assert_eq!(buffers.num_regular_patches(), num_patches);
    }

    #[test]
    fn test_subdivider_chain_on_small_indices() {
        let cube: HalfEdgeMesh<u16> = crate::mesh::primitives::cube().unwrap();
        let steps: [&dyn Subdivider<u16>; 2] = [
            &CatmullClarkSubdivider::new(SubdivideOptions::new(2)),
            &LimitPositionSubdivider::default(),
        ];

        let mut mesh = cube;
        for step in steps {
            mesh = step.subdivide(&mesh).unwrap();
        }
        assert_eq!(mesh.num_faces(), 96);

        // Limit points of a convex cage stay inside it
        let (min, max) = mesh.bounding_box().unwrap();
        assert!(min.x > 0.0 && max.x < 1.0);
    }
}

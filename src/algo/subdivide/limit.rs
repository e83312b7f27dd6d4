//! Projection of control points onto the Catmull-Clark limit surface.

use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshAttributes, MeshIndex, VertexId};

use super::{map_indices, SubdivideOptions, Subdivider};

/// Position that vertex `v` converges to under infinite refinement.
///
/// - **Interior** (valence n): `(n-3)/(n+5) S + 4/(n(n+5)) (E + F)` where E is
///   the sum of the n incident edge midpoints and F the sum of the n incident
///   face centroids, both gathered along the `prev.twin` fan.
/// - **Boundary**: `3/4 S + 1/8 (next + prev)` over the neighbours along the
///   boundary loop.
///
/// Isolated vertices keep their position.
pub fn limit_position<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Point3<f64> {
    let vertex = mesh.vertex(v);
    let s = vertex.position;
    if !vertex.halfedge.is_valid() {
        return s;
    }

    if mesh.is_boundary_vertex(v) {
        let next = mesh.outgoing_boundary_halfedge(v).map(|he| mesh.dest(he));
        let prev = mesh.incoming_boundary_halfedge(v).map(|he| mesh.origin(he));
        return match (prev, next) {
            (Some(prev), Some(next)) => {
                let sum = mesh.position(prev).coords + mesh.position(next).coords;
                Point3::from(s.coords * 0.75 + sum * 0.125)
            }
            _ => s,
        };
    }

    let n = vertex.valence;
    let mut sum = Vector3::zeros();
    let mut he = vertex.halfedge;
    for _ in 0..n {
        sum += mesh.edge_midpoint(he).coords;
        sum += mesh.face_centroid(mesh.face_of(he)).coords;
        he = mesh.twin(mesh.prev(he));
    }

    let n = n as f64;
    let self_weight = (n - 3.0) / (n + 5.0);
    let ring_weight = 4.0 / (n * (n + 5.0));
    Point3::from(s.coords * self_weight + sum * ring_weight)
}

/// Copy `mesh` with every vertex moved to its limit position.
///
/// Connectivity, element counts and ids are unchanged; render buffers of the
/// copy start empty. Only `options.parallel` is consulted.
pub fn limit_positions<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> HalfEdgeMesh<I> {
    let positions = map_indices(mesh.num_vertices(), options.parallel, |v| {
        limit_position(mesh, VertexId::new(v))
    });

    let mut projected = mesh.clone();
    projected.attributes = MeshAttributes::default();
    for (vertex, position) in projected.vertices.iter_mut().zip(positions) {
        vertex.position = position;
    }

    log::debug!("Limit projection of {} vertices", projected.num_vertices());
    projected
}

/// Limit projection as a [`Subdivider`].
#[derive(Debug, Clone, Default)]
pub struct LimitPositionSubdivider {
    /// Only `parallel` is used.
    pub options: SubdivideOptions,
}

impl LimitPositionSubdivider {
    /// Create a limit projector with the given options.
    pub fn new(options: SubdivideOptions) -> Self {
        Self { options }
    }
}

impl<I: MeshIndex> Subdivider<I> for LimitPositionSubdivider {
    fn subdivide(&self, mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>> {
        Ok(limit_positions(mesh, &self.options))
    }

    fn name(&self) -> &'static str {
        "limit projection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::catmull_clark_subdivide;
    use crate::mesh::{build_from_polygons, primitives, to_face_vertex};

    /// 2x2 grid with the centre vertex lifted to z = 1.
    fn create_tent() -> HalfEdgeMesh {
        let grid: HalfEdgeMesh = primitives::quad_grid(2, 2).unwrap();
        let (mut vertices, faces) = to_face_vertex(&grid);
        vertices[4].z = 1.0;
        build_from_polygons(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_regular_interior_vertex() {
        let mesh = create_tent();
        let v = VertexId::new(4);
        assert!(!mesh.is_boundary_vertex(v));
        assert_eq!(mesh.valence(v), 4);

        // S/9 + (E + F)/9 with E + F = (8, 8, 3)
        let p = limit_position(&mesh, v);
        assert!((p - Point3::new(1.0, 1.0, 4.0 / 9.0)).norm() < 1e-10);
    }

    #[test]
    fn test_boundary_corner() {
        let mesh: HalfEdgeMesh = primitives::quad_grid(1, 1).unwrap();
        let p = limit_position(&mesh, VertexId::new(0));
        assert!((p - Point3::new(0.125, 0.125, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_boundary_edge_vertex() {
        let mesh = create_tent();
        // (1, 0) sits between (0, 0) and (2, 0) on the boundary
        let p = limit_position(&mesh, VertexId::new(1));
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_cube_corner_valence_three() {
        let cube: HalfEdgeMesh = primitives::cube().unwrap();
        // n = 3: self weight vanishes, ring weight 1/6
        let p = limit_position(&cube, VertexId::new(0));
        assert!((p - Point3::new(0.25, 0.25, 0.25)).norm() < 1e-10);

        let q = limit_position(&cube, VertexId::new(6));
        assert!((q - Point3::new(0.75, 0.75, 0.75)).norm() < 1e-10);
    }

    #[test]
    fn test_topology_unchanged() {
        let refined =
            catmull_clark_subdivide(&create_tent(), &SubdivideOptions::new(1)).unwrap();
        let limit = limit_positions(&refined, &SubdivideOptions::default());

        assert_eq!(limit.num_vertices(), refined.num_vertices());
        assert_eq!(limit.num_halfedges(), refined.num_halfedges());
        assert_eq!(limit.num_faces(), refined.num_faces());
        assert_eq!(limit.num_edges(), refined.num_edges());
        for he in refined.halfedge_ids() {
            assert_eq!(limit.origin(he), refined.origin(he));
            assert_eq!(limit.twin(he), refined.twin(he));
            assert_eq!(limit.next(he), refined.next(he));
        }
        assert!(limit.attributes().is_empty());
        assert!(limit.is_valid());
    }

    #[test]
    fn test_planar_mesh_stays_planar() {
        let grid: HalfEdgeMesh = primitives::quad_grid(4, 3).unwrap();
        let limit = limit_positions(&grid, &SubdivideOptions::default());
        for v in limit.vertex_ids() {
            assert!(limit.position(v).z.abs() < 1e-10);
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let mesh = create_tent();
        let _ = limit_positions(&mesh, &SubdivideOptions::default());
        assert_eq!(mesh.position(VertexId::new(4)).z, 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let torus: HalfEdgeMesh = primitives::torus(7, 5, 2.0, 0.5).unwrap();
        let a = limit_positions(&torus, &SubdivideOptions::default());
        let b = limit_positions(&torus, &SubdivideOptions::default().sequential());
        for v in a.vertex_ids() {
            assert_eq!(a.position(v), b.position(v));
        }
    }

    #[test]
    fn test_isolated_vertex() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2]]).unwrap();
        let p = limit_position(&mesh, VertexId::new(3));
        assert_eq!(p, Point3::new(5.0, 5.0, 5.0));
    }
}

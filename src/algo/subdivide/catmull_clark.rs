//! Catmull-Clark subdivision for polygon meshes.

use nalgebra::{Point3, Vector3};

use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshBuilder, MeshIndex, VertexId};

use super::{map_indices, SubdivideOptions, Subdivider};

/// Applies `options.iterations` levels of Catmull-Clark subdivision.
///
/// The input mesh is left untouched; zero iterations return a copy of it.
///
/// # Algorithm
///
/// Each level:
/// 1. Compute face points (centroid of each face)
/// 2. Compute edge points (average of the endpoints and both adjacent face
///    points; midpoint on the boundary)
/// 3. Compute vertex points
/// 4. Replace each n-sided face by n quads and rebuild the half-edges
///
/// # Vertex Rules
///
/// - **Interior**: `(Q + 2R + (n-3)S) / n` where
///   - Q = average of adjacent face points
///   - R = average of adjacent edge midpoints
///   - S = original position
///   - n = valence
/// - **Boundary**: `(prev + 6S + next) / 8` over the two neighbours along
///   the boundary
///
/// # Errors
///
/// Fails only with [`MeshError::IndexOverflow`](crate::error::MeshError::IndexOverflow)
/// when the refined mesh no longer fits the index type.
pub fn catmull_clark_subdivide<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> Result<HalfEdgeMesh<I>> {
    catmull_clark_subdivide_with_progress(mesh, options, &Progress::none())
}

/// Catmull-Clark subdivision with progress reporting.
pub fn catmull_clark_subdivide_with_progress<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<HalfEdgeMesh<I>> {
    let mut current: Option<HalfEdgeMesh<I>> = None;

    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Catmull-Clark subdivision");
        let refined = catmull_clark_step(current.as_ref().unwrap_or(mesh), options.parallel)?;
        current = Some(refined);
    }
    if options.iterations > 0 {
        progress.report(options.iterations, options.iterations, "Catmull-Clark subdivision");
    }

    Ok(current.unwrap_or_else(|| mesh.clone()))
}

/// Perform exactly one level of Catmull-Clark subdivision.
///
/// The refined mesh stores its vertices as `[vertex points | face points |
/// edge points]`, with edges numbered in half-edge order.
pub fn catmull_clark_step<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    parallel: bool,
) -> Result<HalfEdgeMesh<I>> {
    let num_vertices = mesh.num_vertices();
    let num_faces = mesh.num_faces();

    // Step 1: Face points
    let face_points: Vec<Point3<f64>> =
        map_indices(num_faces, parallel, |f| mesh.face_centroid(FaceId::new(f)));

    // Step 2: Edge points
    let edges = EdgeTable::new(mesh);
    let edge_points: Vec<Point3<f64>> = map_indices(edges.len(), parallel, |e| {
        edge_point(mesh, &face_points, edges.representative(e))
    });

    // Step 3: Vertex points
    let vertex_points: Vec<Point3<f64>> = map_indices(num_vertices, parallel, |v| {
        vertex_point(mesh, &face_points, VertexId::new(v))
    });

    // Step 4: Connectivity. Everything above must be complete before this.
    let num_new_vertices = num_vertices + num_faces + edges.len();
    let mut builder = MeshBuilder::with_capacity(num_new_vertices, 4 * mesh.num_halfedges());
    for &p in vertex_points.iter().chain(&face_points).chain(&edge_points) {
        builder.add_vertex(p)?;
    }

    let face_base = num_vertices;
    let edge_base = num_vertices + num_faces;
    for f in mesh.face_ids() {
        let face_point = face_base + f.index();
        for he in mesh.face_halfedges(f) {
            let corner = mesh.origin(he).index();
            let outgoing = edge_base + edges.edge_of(he).index();
            let incoming = edge_base + edges.edge_of(mesh.prev(he)).index();
            builder.add_face(&[corner, outgoing, face_point, incoming])?;
        }
    }

    let refined = builder.build()?;

    log::debug!(
        "Catmull-Clark: {} -> {} vertices, {} -> {} faces",
        num_vertices,
        refined.num_vertices(),
        num_faces,
        refined.num_faces()
    );

    Ok(refined)
}

/// Dense numbering of the undirected edges of a mesh.
struct EdgeTable<I: MeshIndex> {
    /// Edge of every half-edge.
    edge_of: Vec<EdgeId<I>>,
    /// First half-edge (in arena order) of every edge.
    representatives: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> EdgeTable<I> {
    fn new(mesh: &HalfEdgeMesh<I>) -> Self {
        let mut edge_of = vec![EdgeId::invalid(); mesh.num_halfedges()];
        let mut representatives = Vec::with_capacity(mesh.num_edges());

        for he in mesh.halfedge_ids() {
            if edge_of[he.index()].is_valid() {
                continue;
            }
            let edge = EdgeId::new(representatives.len());
            representatives.push(he);
            edge_of[he.index()] = edge;

            let twin = mesh.twin(he);
            if twin.is_valid() {
                edge_of[twin.index()] = edge;
            }
        }

        Self {
            edge_of,
            representatives,
        }
    }

    fn len(&self) -> usize {
        self.representatives.len()
    }

    fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.edge_of[he.index()]
    }

    fn representative(&self, edge: usize) -> HalfEdgeId<I> {
        self.representatives[edge]
    }
}

fn edge_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face_points: &[Point3<f64>],
    he: HalfEdgeId<I>,
) -> Point3<f64> {
    let twin = mesh.twin(he);
    if !twin.is_valid() {
        return mesh.edge_midpoint(he);
    }

    let p0 = mesh.position(mesh.origin(he)).coords;
    let p1 = mesh.position(mesh.dest(he)).coords;
    let f0 = face_points[mesh.face_of(he).index()].coords;
    let f1 = face_points[mesh.face_of(twin).index()].coords;
    Point3::from((p0 + p1 + f0 + f1) / 4.0)
}

fn vertex_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face_points: &[Point3<f64>],
    v: VertexId<I>,
) -> Point3<f64> {
    let s = *mesh.position(v);

    // Isolated vertices are carried over unchanged
    if !mesh.vertex(v).halfedge.is_valid() {
        return s;
    }

    if mesh.is_boundary_vertex(v) {
        let next = mesh.outgoing_boundary_halfedge(v).map(|he| mesh.dest(he));
        let prev = mesh.incoming_boundary_halfedge(v).map(|he| mesh.origin(he));
        return match (prev, next) {
            (Some(prev), Some(next)) => {
                let sum = mesh.position(prev).coords + mesh.position(next).coords;
                Point3::from((sum + s.coords * 6.0) / 8.0)
            }
            _ => s,
        };
    }

    let mut q = Vector3::zeros();
    let mut r = Vector3::zeros();
    let mut n = 0usize;
    for he in mesh.vertex_halfedges(v) {
        q += face_points[mesh.face_of(he).index()].coords;
        r += mesh.edge_midpoint(he).coords;
        n += 1;
    }

    let n_f = n as f64;
    let q = q / n_f;
    let r = r / n_f;
    Point3::from((q + r * 2.0 + s.coords * (n_f - 3.0)) / n_f)
}

/// Catmull-Clark subdivision as a [`Subdivider`].
///
/// Applies `options.iterations` levels per call (one by default).
#[derive(Debug, Clone, Default)]
pub struct CatmullClarkSubdivider {
    /// Subdivision parameters.
    pub options: SubdivideOptions,
}

impl CatmullClarkSubdivider {
    /// Create a subdivider with the given options.
    pub fn new(options: SubdivideOptions) -> Self {
        Self { options }
    }
}

impl<I: MeshIndex> Subdivider<I> for CatmullClarkSubdivider {
    fn subdivide(&self, mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>> {
        catmull_clark_subdivide(mesh, &self.options)
    }

    fn name(&self) -> &'static str {
        "Catmull-Clark subdivision"
    }
}

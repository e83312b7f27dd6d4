//! Mesh construction from polygon soup.
//!
//! [`MeshBuilder`] is the only code path that writes topology. It owns the
//! mesh while faces are being added and hands it out from [`MeshBuilder::build`]
//! once every invariant has been established, so a half-built mesh never
//! escapes. Subdivision reuses the same builder to rebuild connectivity.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Incremental builder for a [`HalfEdgeMesh`].
///
/// # Example
/// ```
/// use subsurf::mesh::{HalfEdgeMesh, MeshBuilder};
/// use nalgebra::Point3;
///
/// let mut builder = MeshBuilder::<u32>::new();
/// for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 1.5]] {
///     builder.add_vertex(Point3::new(p[0], p[1], 0.0)).unwrap();
/// }
/// builder.add_face(&[0, 1, 2, 3]).unwrap();
/// builder.add_face(&[3, 2, 4]).unwrap();
///
/// let mesh: HalfEdgeMesh = builder.build().unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// assert!(mesh.is_valid());
/// ```
#[derive(Debug)]
pub struct MeshBuilder<I: MeshIndex = u32> {
    mesh: HalfEdgeMesh<I>,
    /// Undirected edge (smaller vertex first) to the first half-edge seen on it.
    edges: HashMap<(usize, usize), EdgeSlot<I>>,
}

#[derive(Debug, Clone, Copy)]
struct EdgeSlot<I: MeshIndex> {
    first: HalfEdgeId<I>,
    paired: bool,
}

impl<I: MeshIndex> Default for MeshBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> MeshBuilder<I> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a builder with room for the given number of vertices and
    /// face corners.
    pub fn with_capacity(num_vertices: usize, num_corners: usize) -> Self {
        Self {
            mesh: HalfEdgeMesh::with_capacity(num_vertices, num_corners, num_corners / 3),
            edges: HashMap::with_capacity(num_corners),
        }
    }

    /// Number of vertices added so far.
    pub fn num_vertices(&self) -> usize {
        self.mesh.num_vertices()
    }

    /// Number of faces added so far.
    pub fn num_faces(&self) -> usize {
        self.mesh.num_faces()
    }

    /// Add a vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        let index = self.mesh.vertices.len();
        check_capacity::<I>(index + 1)?;
        self.mesh.vertices.push(Vertex::new(position));
        Ok(VertexId::new(index))
    }

    /// Add a face given its corner vertices in winding order.
    ///
    /// One half-edge is created per corner and linked into a loop. Each side is
    /// matched against the edges seen so far; the second occurrence of an
    /// undirected edge becomes the twin of the first.
    pub fn add_face(&mut self, corners: &[usize]) -> Result<FaceId<I>> {
        let face_index = self.mesh.faces.len();
        let n = corners.len();

        if n < 3 {
            return Err(MeshError::TooFewVertices {
                face: face_index,
                count: n,
            });
        }
        for (i, &vi) in corners.iter().enumerate() {
            if vi >= self.mesh.vertices.len() {
                return Err(MeshError::InvalidVertexIndex {
                    face: face_index,
                    vertex: vi,
                });
            }
            if corners[..i].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: face_index });
            }
        }

        let base = self.mesh.halfedges.len();
        check_capacity::<I>(base + n)?;
        check_capacity::<I>(face_index + 1)?;

        // Match every side before touching the arenas so a rejected face
        // leaves the builder unchanged.
        let mut matches = Vec::with_capacity(n);
        for i in 0..n {
            let (v0, v1) = (corners[i], corners[(i + 1) % n]);
            let key = (v0.min(v1), v0.max(v1));
            match self.edges.get(&key) {
                None => matches.push(None),
                Some(slot) if slot.paired => return Err(MeshError::NonManifoldEdge { v0, v1 }),
                Some(slot) => {
                    if self.mesh.origin(slot.first).index() == v0 {
                        return Err(MeshError::InconsistentOrientation { v0, v1 });
                    }
                    matches.push(Some((key, slot.first)));
                }
            }
        }

        let face_id = FaceId::<I>::new(face_index);
        self.mesh
            .faces
            .push(Face::new(HalfEdgeId::new(base), n));

        for (i, &vi) in corners.iter().enumerate() {
            let mut he = HalfEdge::new();
            he.origin = VertexId::new(vi);
            he.next = HalfEdgeId::new(base + (i + 1) % n);
            he.prev = HalfEdgeId::new(base + (i + n - 1) % n);
            he.face = face_id;
            self.mesh.halfedges.push(he);
        }

        for (i, matched) in matches.into_iter().enumerate() {
            let he = HalfEdgeId::<I>::new(base + i);
            match matched {
                Some((key, twin)) => {
                    self.mesh.halfedge_mut(he).twin = twin;
                    self.mesh.halfedge_mut(twin).twin = he;
                    if let Some(slot) = self.edges.get_mut(&key) {
                        slot.paired = true;
                    }
                }
                None => {
                    let (v0, v1) = (corners[i], corners[(i + 1) % n]);
                    self.edges.insert(
                        (v0.min(v1), v0.max(v1)),
                        EdgeSlot {
                            first: he,
                            paired: false,
                        },
                    );
                }
            }
        }

        Ok(face_id)
    }

    /// Finish construction.
    ///
    /// Computes every vertex's outgoing half-edge and valence and rejects
    /// vertices whose faces do not form a single fan.
    pub fn build(self) -> Result<HalfEdgeMesh<I>> {
        let MeshBuilder { mut mesh, edges } = self;

        if mesh.faces.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        mesh.num_edges = edges.len();

        let mut outgoing = vec![0usize; mesh.vertices.len()];
        let mut incoming_boundary = vec![0usize; mesh.vertices.len()];

        for hi in 0..mesh.halfedges.len() {
            let he = mesh.halfedges[hi];
            let v = he.origin.index();
            outgoing[v] += 1;

            let vertex = &mut mesh.vertices[v];
            // Prefer the outgoing boundary half-edge so fan walks start at
            // one end of an open fan.
            if !vertex.halfedge.is_valid() || he.is_boundary() {
                vertex.halfedge = HalfEdgeId::new(hi);
            }

            if he.is_boundary() {
                let dest = mesh.halfedges[he.next.index()].origin.index();
                incoming_boundary[dest] += 1;
            }
        }

        for vi in 0..mesh.vertices.len() {
            let v = VertexId::<I>::new(vi);
            if !mesh.vertex(v).halfedge.is_valid() {
                continue;
            }
            // A single fan has at most one gap, and walking it from `out`
            // must reach every outgoing half-edge.
            let fan = mesh.vertex_halfedges(v).count();
            if incoming_boundary[vi] > 1 || fan != outgoing[vi] {
                return Err(MeshError::NonManifoldVertex { vertex: vi });
            }
            mesh.vertex_mut(v).valence = outgoing[vi] + incoming_boundary[vi];
        }

        log::trace!(
            "built mesh: {} vertices, {} edges, {} faces, {} boundary half-edges",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces(),
            mesh.num_boundary_halfedges()
        );

        Ok(mesh)
    }
}

fn check_capacity<I: MeshIndex>(count: usize) -> Result<()> {
    let max = I::capacity();
    if count > max {
        return Err(MeshError::IndexOverflow { count, max });
    }
    Ok(())
}

/// Build a half-edge mesh from vertex positions and polygon faces.
///
/// Faces may be any mix of valences (at least 3) given as fixed arrays or
/// vectors of vertex indices, all wound the same way.
///
/// # Example
/// ```
/// use subsurf::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2, 3]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_boundary_halfedges(), 4);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    let num_corners = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut builder = MeshBuilder::with_capacity(vertices.len(), num_corners);

    for &p in vertices {
        builder.add_vertex(p)?;
    }
    for face in faces {
        builder.add_face(face.as_ref())?;
    }

    builder.build()
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces); each face lists its corners starting at the
/// face's side half-edge.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}

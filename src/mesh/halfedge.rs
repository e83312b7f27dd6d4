//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes of arbitrary face valence. All cross references are
//! indices into three arenas owned by the mesh, so navigation is O(1) and no
//! element is ever shared between two meshes.
//!
//! # Structure
//!
//! - Every face side is one **half-edge** carrying its **origin** vertex, the
//!   **next**/**prev** half-edges of the face loop, the owning **face**, and its
//!   **twin** (the same edge seen from the neighbouring face)
//! - Each vertex stores one outgoing half-edge and its valence
//! - Each face stores one half-edge on its loop, its valence and a normal
//!
//! # Boundary Handling
//!
//! There are no half-edges outside of faces. An edge on an open boundary is a
//! single half-edge whose twin is invalid. Boundary vertices store their
//! outgoing boundary half-edge, so walking `prev.twin` from it sweeps the whole
//! fan before running into the incoming boundary half-edge.

use nalgebra::{Point3, Vector3};

use super::attributes::MeshAttributes;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is the outgoing boundary half-edge.
    pub halfedge: HalfEdgeId<I>,

    /// Number of incident edges.
    pub valence: usize,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, not yet connected vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            valence: 0,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge in the neighbouring face.
    /// Invalid for boundary half-edges.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face (clockwise).
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Always valid.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge lies on an open boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the loop of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Number of sides.
    pub valence: usize,

    /// Unit normal, refreshed by [`HalfEdgeMesh::recalculate_normals`].
    pub normal: Vector3<f64>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge and number of sides.
    pub fn new(halfedge: HalfEdgeId<I>, valence: usize) -> Self {
        Self {
            halfedge,
            valence,
            normal: Vector3::zeros(),
        }
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self::new(HalfEdgeId::invalid(), 0)
    }
}

/// A half-edge mesh of arbitrary polygons.
///
/// Meshes are produced by [`MeshBuilder`](super::MeshBuilder) or by the
/// subdivision algorithms and are never edited topologically afterwards.
/// The only mutation available to callers is refreshing the derived
/// render buffers with [`extract_attributes`](Self::extract_attributes).
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,

    /// Number of undirected edges.
    pub(crate) num_edges: usize,

    /// Render buffers derived from the arenas above.
    pub(crate) attributes: MeshAttributes<I>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    /// Create an empty mesh with pre-allocated arenas.
    pub(crate) fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            num_edges: 0,
            attributes: MeshAttributes::default(),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Get the valence (number of incident edges) of a vertex.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex(v).valence
    }

    /// Get the render buffers from the last call to
    /// [`extract_attributes`](Self::extract_attributes).
    #[inline]
    pub fn attributes(&self) -> &MeshAttributes<I> {
        &self.attributes
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge. Invalid on the boundary.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.next(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true;
        }

        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return true;
            }
            let incoming = self.prev(he);
            if self.is_boundary_halfedge(incoming) {
                return true;
            }
            he = self.twin(incoming);
            if he == start {
                return false;
            }
        }
    }

    /// Count the half-edges without twin.
    pub fn num_boundary_halfedges(&self) -> usize {
        self.halfedges.iter().filter(|he| he.is_boundary()).count()
    }

    /// Outgoing boundary half-edge of a boundary vertex, if any.
    ///
    /// Its destination is the next vertex along the boundary loop.
    pub fn outgoing_boundary_halfedge(&self, v: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(v).find(|&he| self.is_boundary_halfedge(he))
    }

    /// Incoming boundary half-edge of a boundary vertex, if any.
    ///
    /// Its origin is the previous vertex along the boundary loop.
    pub fn incoming_boundary_halfedge(&self, v: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(v)
            .map(|he| self.prev(he))
            .find(|&he| self.is_boundary_halfedge(he))
    }

    /// Check whether every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        !self.faces.is_empty() && self.faces.iter().all(|f| f.valence == 4)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(|i| VertexId::new(i))
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(|i| HalfEdgeId::new(i))
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(|i| FaceId::new(i))
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the outgoing half-edges of a vertex, one per incident face.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.face_of(he))
    }

    /// Iterate over half-edges around a face, starting at its side.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    // ==================== Geometry ====================

    /// Compute the centroid of a face (average of its corners).
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        Point3::from(sum / count as f64)
    }

    /// Compute the unit normal of a face.
    ///
    /// Uses Newell's method, which reduces to the cross product of two edges
    /// for triangles and gives the best-fit plane normal for larger polygons.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for he in self.face_halfedges(f) {
            let p = self.position(self.origin(he));
            let q = self.position(self.dest(he));
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, he: HalfEdgeId<I>) -> Point3<f64> {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the edge vector (from origin to destination).
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        self.position(self.dest(he)) - self.position(self.origin(he))
    }

    /// Compute the axis-aligned bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check every connectivity invariant of the mesh.
    ///
    /// - twins are mutual and run in opposite directions
    /// - `next`/`prev` are inverse and every face loop closes after exactly
    ///   `valence` steps in both directions
    /// - every half-edge's face is valid and reachable from the face's side
    /// - each vertex's `out` half-edge originates at it and the fan walk
    ///   agrees with the stored valence
    pub fn is_valid(&self) -> bool {
        for (heid, he) in self.halfedges() {
            if !he.face.is_valid() || he.face.index() >= self.faces.len() {
                return false;
            }
            if !he.next.is_valid() || !he.prev.is_valid() {
                return false;
            }
            if self.halfedge(he.next).prev != heid || self.halfedge(he.prev).next != heid {
                return false;
            }
            if he.twin.is_valid() {
                let twin = self.halfedge(he.twin);
                if twin.twin != heid || twin.origin != self.dest(heid) {
                    return false;
                }
            }
        }

        for (fid, f) in self.faces() {
            if !f.halfedge.is_valid() || f.valence < 3 {
                return false;
            }
            let mut forward = f.halfedge;
            let mut backward = f.halfedge;
            for step in 0..f.valence {
                if self.face_of(forward) != fid {
                    return false;
                }
                forward = self.next(forward);
                backward = self.prev(backward);
                if step + 1 < f.valence && (forward == f.halfedge || backward == f.halfedge) {
                    return false;
                }
            }
            if forward != f.halfedge || backward != f.halfedge {
                return false;
            }
        }

        for (vid, v) in self.vertices() {
            if !v.halfedge.is_valid() {
                if v.valence != 0 {
                    return false;
                }
                continue;
            }
            if self.origin(v.halfedge) != vid {
                return false;
            }
            let fan = self.vertex_halfedges(vid).count();
            let expected = if self.is_boundary_vertex(vid) { fan + 1 } else { fan };
            if v.valence != expected {
                return false;
            }
        }

        true
    }
}

/// Iterator over the outgoing half-edges of a vertex.
///
/// Advances with `prev.twin`, i.e. rotates from face to face through the
/// incoming edge of the current face. Stops when it returns to the start or
/// when the incoming edge is on the boundary.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.twin(self.mesh.prev(self.current));

        if !self.current.is_valid() || self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

//! Regular bicubic patch extraction.
//!
//! A quad whose surrounding 4x4 vertex grid is made only of interior,
//! valence-4 vertices is a uniform bicubic B-spline patch, so it can be
//! tessellated and evaluated directly on the GPU from its 16 control points.
//! Every other face is skipped here and drawn through the polygon buffers.
//!
//! # Control Point Order
//!
//! Each face is walked corner by corner from its side half-edge. At each
//! corner the corner vertex and three vertices of the neighbouring ring are
//! collected (`twin.next.next`, `next`, `twin.next.next`), giving 16 indices
//! that are then reordered through [`PATCH_PERMUTATION`]. For a face of an
//! open grid the result is the 4x4 neighbourhood in row-major order, rows
//! running against the face's second side and columns along its first.

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Number of control points per patch.
pub const PATCH_SIZE: usize = 16;

/// Output slot `i` receives collected index `PATCH_PERMUTATION[i]`.
pub const PATCH_PERMUTATION: [usize; PATCH_SIZE] =
    [11, 10, 9, 7, 13, 12, 8, 6, 14, 0, 4, 5, 15, 1, 2, 3];

/// Whether a half-edge may take part in a regular patch.
///
/// Its origin must be an interior valence-4 vertex. Checking the half-edge
/// alone is not enough: the concave corner of an open region has valence 4
/// and can be reached along interior half-edges.
fn is_regular_candidate<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> bool {
    let origin = mesh.origin(he);
    mesh.valence(origin) == 4
        && !mesh.is_boundary_halfedge(he)
        && !mesh.is_boundary_vertex(origin)
}

/// Control points of face `f`, or `None` if it is not a regular patch.
pub fn regular_patch<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    f: FaceId<I>,
) -> Option<[VertexId<I>; PATCH_SIZE]> {
    let face = mesh.face(f);
    if face.valence != 4 || mesh.is_boundary_halfedge(face.halfedge) {
        return None;
    }

    let mut raw = [VertexId::invalid(); PATCH_SIZE];
    let mut collected = 0;
    let mut push = |he: HalfEdgeId<I>| -> Option<()> {
        if !is_regular_candidate(mesh, he) {
            return None;
        }
        raw[collected] = mesh.origin(he);
        collected += 1;
        Some(())
    };

    let mut current = face.halfedge;
    for _ in 0..4 {
        push(current)?;

        let mut ring = mesh.next(mesh.next(mesh.twin(current)));
        push(ring)?;

        ring = mesh.next(ring);
        push(ring)?;

        ring = mesh.next(mesh.next(mesh.twin(ring)));
        push(ring)?;

        current = mesh.next(current);
    }

    Some(PATCH_PERMUTATION.map(|i| raw[i]))
}

/// Control points of every regular patch, in face order.
pub fn regular_patches<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<[VertexId<I>; PATCH_SIZE]> {
    mesh.face_ids()
        .filter_map(|f| regular_patch(mesh, f))
        .collect()
}

/// Flat index buffer with [`PATCH_SIZE`] entries per regular patch.
pub fn regular_patch_indices<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<I> {
    let patches = regular_patches(mesh);
    log::debug!(
        "{} of {} faces are regular patches",
        patches.len(),
        mesh.num_faces()
    );
    patches
        .iter()
        .flat_map(|patch| patch.iter().map(|v| v.raw()))
        .collect()
}

//! Render buffers derived from a half-edge mesh.
//!
//! After any change of geometry or topology the rendering side calls
//! [`HalfEdgeMesh::extract_attributes`] once and then uploads the flat
//! buffers kept in [`MeshAttributes`]. Positions and normals are narrowed to
//! `f32` for the GPU; indices keep the mesh's own index width.
//!
//! # Buffers
//!
//! | Buffer | Layout |
//! |--------|--------|
//! | `coords` | one `[f32; 3]` per vertex, indexed by vertex id |
//! | `normals` | parallel to `coords`, unit length |
//! | `polygon_indices` | each face's corners in winding order followed by [`MeshIndex::END_OF_FACE`] |
//! | `quad_indices` | 4 corners per valence-4 face, other faces omitted |
//! | `regular_patch_indices` | 16 control points per regular quad patch |

use nalgebra::Vector3;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, MeshIndex};
use crate::algo::patches;

/// Flat render buffers of a mesh.
#[derive(Debug, Clone)]
pub struct MeshAttributes<I: MeshIndex = u32> {
    /// Vertex positions.
    pub coords: Vec<[f32; 3]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Sentinel-delimited polygon corners.
    pub polygon_indices: Vec<I>,
    /// Corners of quad faces.
    pub quad_indices: Vec<I>,
    /// Control points of regular bicubic patches.
    pub regular_patch_indices: Vec<I>,
}

impl<I: MeshIndex> Default for MeshAttributes<I> {
    fn default() -> Self {
        Self {
            coords: Vec::new(),
            normals: Vec::new(),
            polygon_indices: Vec::new(),
            quad_indices: Vec::new(),
            regular_patch_indices: Vec::new(),
        }
    }
}

impl<I: MeshIndex> MeshAttributes<I> {
    /// Whether nothing has been extracted yet.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty() && self.polygon_indices.is_empty()
    }

    /// Split the polygon buffer into one slice per face.
    pub fn polygons(&self) -> impl Iterator<Item = &[I]> + '_ {
        self.polygon_indices
            .split(|&i| i == I::END_OF_FACE)
            .take(self.num_polygons())
    }

    /// Number of faces recorded in the polygon buffer.
    pub fn num_polygons(&self) -> usize {
        self.polygon_indices
            .iter()
            .filter(|&&i| i == I::END_OF_FACE)
            .count()
    }

    /// Number of regular patches (16 indices each).
    pub fn num_regular_patches(&self) -> usize {
        self.regular_patch_indices.len() / patches::PATCH_SIZE
    }

    /// Vertex positions as bytes, ready for upload.
    pub fn coords_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.coords)
    }

    /// Vertex normals as bytes, ready for upload.
    pub fn normals_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Polygon index buffer as bytes.
    pub fn polygon_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.polygon_indices)
    }

    /// Quad index buffer as bytes.
    pub fn quad_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quad_indices)
    }

    /// Regular patch index buffer as bytes.
    pub fn patch_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.regular_patch_indices)
    }
}

fn to_f32(v: &Vector3<f64>) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Recompute face normals and vertex normals.
    ///
    /// Every corner contributes its face normal to the corner vertex, weighted
    /// by the sine of the corner angle divided by the product of the two edge
    /// lengths meeting there. Zero-length edges are not expected in valid
    /// meshes; such corners are skipped.
    pub fn recalculate_normals(&mut self) {
        for fi in 0..self.faces.len() {
            let normal = self.face_normal(FaceId::new(fi));
            self.faces[fi].normal = normal;
        }

        let mut accum = vec![Vector3::<f64>::zeros(); self.vertices.len()];

        for he in &self.halfedges {
            let p_cur = self.vertices[he.origin.index()].position;
            let p_prev = self.vertices[self.halfedges[he.prev.index()].origin.index()].position;
            let p_next = self.vertices[self.halfedges[he.next.index()].origin.index()].position;

            let edge_a = p_prev - p_cur;
            let edge_b = p_next - p_cur;
            let lengths = edge_a.norm() * edge_b.norm();
            if lengths == 0.0 {
                continue;
            }

            let cos = edge_a.dot(&edge_b) / lengths;
            let sin = (1.0 - cos * cos).max(0.0).sqrt();
            accum[he.origin.index()] += self.faces[he.face.index()].normal * (sin / lengths);
        }

        self.attributes.normals = accum
            .iter()
            .map(|n| to_f32(&n.try_normalize(0.0).unwrap_or_else(Vector3::zeros)))
            .collect();
    }

    /// Rebuild every render buffer.
    ///
    /// Recomputes normals, then the coordinate buffer, the sentinel-delimited
    /// polygon list, the quad list and the regular patch list.
    pub fn extract_attributes(&mut self) -> &MeshAttributes<I> {
        self.recalculate_normals();

        self.attributes.coords = self
            .vertices
            .iter()
            .map(|v| to_f32(&v.position.coords))
            .collect();

        let mut polygon_indices = Vec::with_capacity(self.halfedges.len() + self.faces.len());
        let mut quad_indices = Vec::with_capacity(self.halfedges.len());
        for f in self.face_ids() {
            let is_quad = self.face(f).valence == 4;
            for v in self.face_vertices(f) {
                polygon_indices.push(v.raw());
                if is_quad {
                    quad_indices.push(v.raw());
                }
            }
            polygon_indices.push(I::END_OF_FACE);
        }
        self.attributes.polygon_indices = polygon_indices;
        self.attributes.quad_indices = quad_indices;

        self.attributes.regular_patch_indices = patches::regular_patch_indices(self);

        log::debug!(
            "extracted attributes: {} vertices, {} polygons, {} quads, {} regular patches",
            self.attributes.coords.len(),
            self.faces.len(),
            self.attributes.quad_indices.len() / 4,
            self.attributes.num_regular_patches()
        );

        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, primitives};
    use nalgebra::Point3;

    /// A quad, a triangle on top of it and a pentagon to its right.
    fn mixed_patch() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 1.5, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.5, 0.7, 0.0),
            Point3::new(2.0, 1.4, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4], vec![1, 5, 6, 7, 2]];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_polygon_runs_match_face_valence() {
        let mut mesh = mixed_patch();
        let attributes = mesh.extract_attributes().clone();

        assert_eq!(attributes.num_polygons(), 3);
        let runs: Vec<&[u32]> = attributes.polygons().collect();
        assert_eq!(runs.len(), 3);
        for (run, (_, face)) in runs.iter().zip(mesh.faces()) {
            assert_eq!(run.len(), face.valence);
        }
        assert_eq!(runs[0], &[0, 1, 2, 3]);
        assert_eq!(runs[1], &[3, 2, 4]);
        assert_eq!(runs[2], &[1, 5, 6, 7, 2]);
        assert_eq!(*attributes.polygon_indices.last().unwrap(), u32::MAX);
        assert_eq!(attributes.polygon_indices.len(), 4 + 3 + 5 + 3);
    }

    #[test]
    fn test_quad_indices_skip_other_faces() {
        let mut mesh = mixed_patch();
        let attributes = mesh.extract_attributes();
        assert_eq!(attributes.quad_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_coords_and_normals() {
        let mut mesh = mixed_patch();
        let attributes = mesh.extract_attributes();

        assert_eq!(attributes.coords.len(), 8);
        assert_eq!(attributes.normals.len(), 8);
        assert_eq!(attributes.coords[6], [2.5, 0.7, 0.0]);
        for n in &attributes.normals {
            assert!((n[2] - 1.0).abs() < 1e-6, "planar mesh normal {:?}", n);
        }
        assert_eq!(attributes.coords_bytes().len(), 8 * 12);
        assert_eq!(attributes.polygon_index_bytes().len(), 15 * 4);
    }

    #[test]
    fn test_cube_vertex_normals_point_outward() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        mesh.extract_attributes();

        let center = Vector3::new(0.5, 0.5, 0.5);
        for (v, vertex) in mesh.vertices() {
            let n = mesh.attributes().normals[v.index()];
            let n = Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64);
            assert!((n.norm() - 1.0).abs() < 1e-6);
            // Corner normals of a cube lie along the diagonal
            let diagonal = (vertex.position.coords - center).normalize();
            assert!((n - diagonal).norm() < 1e-6);
        }
        for (_, face) in mesh.faces() {
            assert!((face.normal.norm() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_small_index_buffers() {
        let mut mesh: HalfEdgeMesh<u16> = primitives::cube().unwrap();
        let attributes = mesh.extract_attributes();
        assert_eq!(attributes.num_polygons(), 6);
        assert_eq!(attributes.polygon_indices.len(), 30);
        assert_eq!(attributes.polygon_indices[4], u16::MAX);
        assert_eq!(attributes.quad_index_bytes().len(), 24 * 2);
    }
}

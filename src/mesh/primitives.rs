//! Small procedural meshes.
//!
//! Handy control meshes for tests, benchmarks and the CLI's built-in models.

use std::f64::consts::TAU;

use nalgebra::Point3;

use super::builder::build_from_polygons;
use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::{MeshError, Result};

/// Unit cube `[0, 1]^3` with six outward-facing quads.
pub fn cube<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let faces = vec![
        [0, 3, 2, 1], // bottom
        [4, 5, 6, 7], // top
        [0, 1, 5, 4], // front
        [2, 3, 7, 6], // back
        [0, 4, 7, 3], // left
        [1, 2, 6, 5], // right
    ];
    build_from_polygons(&vertices, &faces)
}

/// Open planar grid of `width x height` unit quads in the XY plane.
///
/// Vertex `(i, j)` has index `j * (width + 1) + i`; face `(i, j)` has index
/// `j * width + i` and corners wound counter-clockwise seen from +Z.
pub fn quad_grid<I: MeshIndex>(width: usize, height: usize) -> Result<HalfEdgeMesh<I>> {
    if width == 0 || height == 0 {
        return Err(MeshError::invalid_param(
            "grid size",
            format!("{}x{}", width, height),
            "must be at least 1x1",
        ));
    }

    let mut vertices = Vec::with_capacity((width + 1) * (height + 1));
    for j in 0..=height {
        for i in 0..=width {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(width * height);
    for j in 0..height {
        for i in 0..width {
            let v00 = j * (width + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (width + 1);
            let v11 = v01 + 1;
            faces.push([v00, v10, v11, v01]);
        }
    }

    build_from_polygons(&vertices, &faces)
}

/// Closed torus made of `rings x segments` quads.
///
/// Every vertex has valence 4, so every face is a regular patch. `major` is the
/// distance from the centre to the tube axis, `minor` the tube radius.
pub fn torus<I: MeshIndex>(
    rings: usize,
    segments: usize,
    major: f64,
    minor: f64,
) -> Result<HalfEdgeMesh<I>> {
    if rings < 3 || segments < 3 {
        return Err(MeshError::invalid_param(
            "torus resolution",
            format!("{}x{}", rings, segments),
            "needs at least 3 rings and 3 segments",
        ));
    }

    let mut vertices = Vec::with_capacity(rings * segments);
    for j in 0..segments {
        let phi = TAU * j as f64 / segments as f64;
        for i in 0..rings {
            let theta = TAU * i as f64 / rings as f64;
            let r = major + minor * phi.cos();
            vertices.push(Point3::new(r * theta.cos(), r * theta.sin(), minor * phi.sin()));
        }
    }

    let index = |i: usize, j: usize| (j % segments) * rings + (i % rings);
    let mut faces = Vec::with_capacity(rings * segments);
    for j in 0..segments {
        for i in 0..rings {
            faces.push([index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1)]);
        }
    }

    build_from_polygons(&vertices, &faces)
}

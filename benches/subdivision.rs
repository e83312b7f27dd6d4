//! Benchmarks for subdivision and patch extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subsurf::algo::patches::regular_patch_indices;
use subsurf::algo::subdivide::{catmull_clark_subdivide, limit_positions, SubdivisionHierarchy};
use subsurf::mesh::primitives;
use subsurf::prelude::*;

fn bench_mesh_construction(c: &mut Criterion) {
    let grid: HalfEdgeMesh = primitives::quad_grid(64, 64).unwrap();
    let (vertices, faces) = to_face_vertex(&grid);

    c.bench_function("build_grid_64x64", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
            mesh
        })
    });
}

fn bench_catmull_clark(c: &mut Criterion) {
    let torus: HalfEdgeMesh = primitives::torus(32, 16, 2.0, 0.5).unwrap();

    c.bench_function("catmull_clark_torus_2_levels", |b| {
        let options = SubdivideOptions::new(2);
        b.iter(|| catmull_clark_subdivide(black_box(&torus), &options).unwrap())
    });

    c.bench_function("catmull_clark_torus_2_levels_sequential", |b| {
        let options = SubdivideOptions::new(2).sequential();
        b.iter(|| catmull_clark_subdivide(black_box(&torus), &options).unwrap())
    });
}

fn bench_limit_and_patches(c: &mut Criterion) {
    let cube: HalfEdgeMesh = primitives::cube().unwrap();
    let mut hierarchy = SubdivisionHierarchy::new(cube);
    let refined = hierarchy.level(5).unwrap().clone();

    c.bench_function("limit_positions_cube_level_5", |b| {
        let options = SubdivideOptions::default();
        b.iter(|| limit_positions(black_box(&refined), &options))
    });

    c.bench_function("regular_patches_cube_level_5", |b| {
        b.iter(|| regular_patch_indices(black_box(&refined)))
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_catmull_clark,
    bench_limit_and_patches
);
criterion_main!(benches);

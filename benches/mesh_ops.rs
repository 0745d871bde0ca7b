//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;
use subdmesh::algo::dual::{dual, CenterMode};
use subdmesh::algo::subdivide::{catmull_clark, SubdivideOptions};
use subdmesh::algo::truncate::truncate_vertices;
use subdmesh::prelude::*;

fn grid_data(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11, v01]);
        }
    }

    (vertices, faces)
}

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let (vertices, faces) = grid_data(n);
    build_from_quads(&vertices, &faces).unwrap()
}

fn create_cube() -> HalfEdgeMesh {
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
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ];
    build_from_quads(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (vertices, faces) = grid_data(30);

    c.bench_function("build_quad_grid_30x30", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_mesh_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("vertex_neighbors_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.vertex_neighbors(v).count();
            }
            count
        });
    });

    c.bench_function("face_centers_all", |b| {
        b.iter(|| {
            let mut sum = nalgebra::Vector3::zeros();
            for f in mesh.face_ids() {
                sum += mesh.face_center(f).unwrap().coords;
            }
            sum
        });
    });
}

fn bench_catmull_clark(c: &mut Criterion) {
    let cube = create_cube();
    let mut group = c.benchmark_group("catmull_clark_cube");

    for iterations in [2, 4] {
        group.bench_with_input(
            BenchmarkId::new("sequential", iterations),
            &iterations,
            |b, &n| b.iter(|| catmull_clark(&cube, &SubdivideOptions::new(n)).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", iterations),
            &iterations,
            |b, &n| {
                let options = SubdivideOptions::new(n).with_parallel(true);
                b.iter(|| catmull_clark(&cube, &options).unwrap())
            },
        );
    }
    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let mesh = catmull_clark(&create_cube(), &SubdivideOptions::new(3)).unwrap();

    c.bench_function("dual_subdivided_cube", |b| {
        b.iter(|| dual(&mesh, CenterMode::Barycenter).unwrap());
    });

    c.bench_function("truncate_subdivided_cube", |b| {
        b.iter(|| truncate_vertices(&mesh, 0.25).unwrap());
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_mesh_traversal,
    bench_catmull_clark,
    bench_operators
);
criterion_main!(benches);

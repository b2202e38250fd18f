//! Benchmarks for the patch pipeline.

use criterion::{criterion_group, criterion_main, Criterion};
use gregory::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
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

    build_from_quads(&vertices, &faces).unwrap()
}

fn create_torus_mesh(nu: usize, nv: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        let phi = j as f64 * std::f64::consts::TAU / nv as f64;
        for i in 0..nu {
            let theta = i as f64 * std::f64::consts::TAU / nu as f64;
            let r = 3.0 + phi.cos();
            vertices.push(Point3::new(r * theta.cos(), r * theta.sin(), phi.sin()));
        }
    }

    let idx = |i: usize, j: usize| (j % nv) * nu + (i % nu);
    let mut faces = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        for i in 0..nu {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

fn bench_classify(c: &mut Criterion) {
    let grid = create_grid_mesh(100);

    c.bench_function("classify_grid_100x100", |b| {
        b.iter(|| classify_patches(&grid).unwrap());
    });
}

fn bench_assemble(c: &mut Criterion) {
    let grid = create_grid_mesh(100);
    let grid_groups = classify_patches(&grid).unwrap();
    let torus = create_torus_mesh(128, 64);
    let torus_groups = classify_patches(&torus).unwrap();

    c.bench_function("assemble_grid_100x100", |b| {
        let options = GregoryOptions::default();
        b.iter(|| create_gregory_patches(&grid, &grid_groups, &options).unwrap());
    });

    c.bench_function("assemble_grid_100x100_sequential", |b| {
        let options = GregoryOptions::default().sequential();
        b.iter(|| create_gregory_patches(&grid, &grid_groups, &options).unwrap());
    });

    c.bench_function("assemble_torus_128x64", |b| {
        let options = GregoryOptions::default();
        b.iter(|| create_gregory_patches(&torus, &torus_groups, &options).unwrap());
    });
}

fn bench_pack(c: &mut Criterion) {
    let torus = create_torus_mesh(128, 64);
    let groups = classify_patches(&torus).unwrap();
    let patches = create_gregory_patches(&torus, &groups, &GregoryOptions::default()).unwrap();

    c.bench_function("pack_torus_128x64", |b| {
        b.iter(|| pack_patches(&patches, &torus).unwrap());
    });
}

criterion_group!(benches, bench_classify, bench_assemble, bench_pack);
criterion_main!(benches);

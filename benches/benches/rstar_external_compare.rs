// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_proximity::{GridIndex, LatticeConfig, Point3, ProximityIndex};

use rstar::RTree;

fn gen_lattice_points(n: usize, spacing: f32) -> Vec<Point3<f32>> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                out.push(Point3::new(
                    x as f32 * spacing,
                    y as f32 * spacing,
                    z as f32 * spacing,
                ));
            }
        }
    }
    out
}

fn bench_rstar_external_compare_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_external_compare_f32");
    for &n in &[16usize, 32] {
        let spacing = 4.0;
        let points = gen_lattice_points(n, spacing);
        let edge = n as f32 * spacing;
        let center = Point3::splat(edge * 0.5);
        let radius = edge * 0.25;
        group.throughput(Throughput::Elements((n * n * n) as u64));

        group.bench_function(format!("understory_build_query_n{}", n), |b| {
            b.iter_batched(
                || {
                    let config = LatticeConfig::cube(Point3::splat(0.0), edge, (n / 2) as u32);
                    GridIndex::<f32, u32>::new(config).unwrap()
                },
                |mut idx| {
                    for (i, &p) in points.iter().enumerate() {
                        let t = idx.allocate_token(i as u32);
                        idx.update_position(t, p);
                    }
                    let mut out = Vec::new();
                    idx.find_neighbors(center, radius, &mut out);
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || points.iter().map(|p| [p.x, p.y, p.z]).collect::<Vec<_>>(),
                |raw| {
                    let tree = RTree::bulk_load(raw);
                    let hits = tree
                        .locate_within_distance([center.x, center.y, center.z], radius * radius)
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_external_compare_f32);
criterion_main!(benches);

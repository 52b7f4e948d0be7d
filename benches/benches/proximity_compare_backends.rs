// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_proximity::{
    BruteForceIndex, GridIndex, LatticeConfig, Point3, ProximityIndex, Token,
};

const WORLD: f32 = 1000.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

fn gen_uniform_points(count: usize) -> Vec<Point3<f32>> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            Point3::new(
                rng.next_f32() * WORLD,
                rng.next_f32() * WORLD,
                rng.next_f32() * WORLD,
            )
        })
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f32) -> Vec<Point3<f32>> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let c = Point3::new(
            rng.next_f32() * WORLD,
            rng.next_f32() * WORLD,
            rng.next_f32() * WORLD,
        );
        for _ in 0..per_cluster {
            out.push(Point3::new(
                c.x + (rng.next_f32() - 0.5) * spread,
                c.y + (rng.next_f32() - 0.5) * spread,
                c.z + (rng.next_f32() - 0.5) * spread,
            ));
        }
    }
    out
}

fn grid_index() -> GridIndex<f32, u32> {
    GridIndex::new(LatticeConfig::cube(Point3::splat(0.0), WORLD, 20)).unwrap()
}

fn populate<I: ProximityIndex<f32, u32>>(idx: &mut I, points: &[Point3<f32>]) -> Vec<Token> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let t = idx.allocate_token(i as u32);
            idx.update_position(t, p);
            t
        })
        .collect()
}

/// One steering tick: every object moves a little, then asks for its neighbors.
fn tick<I: ProximityIndex<f32, u32>>(idx: &mut I, tokens: &[Token], step: f32, radius: f32) {
    let mut out = Vec::new();
    let mut total = 0usize;
    for (j, &t) in tokens.iter().enumerate() {
        if let Some(p) = idx.position(t) {
            let d = if j % 2 == 0 { step } else { -step };
            let moved = Point3::new(p.x + d, p.y, p.z - d);
            idx.update_position(t, moved);
            out.clear();
            idx.find_neighbors(moved, radius, &mut out);
            total += out.len();
        }
    }
    black_box(total);
}

fn bench_populate_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate_and_query");
    for &n in &[256usize, 1024, 4096] {
        let points = gen_uniform_points(n);
        let center = Point3::splat(WORLD * 0.5);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("brute_force_n{}", n), |b| {
            b.iter_batched(
                BruteForceIndex::<f32, u32>::new,
                |mut idx| {
                    populate(&mut idx, &points);
                    let mut out = Vec::new();
                    idx.find_neighbors(center, 100.0, &mut out);
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                grid_index,
                |mut idx| {
                    populate(&mut idx, &points);
                    let mut out = Vec::new();
                    idx.find_neighbors(center, 100.0, &mut out);
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_steering_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("steering_tick");
    for &n in &[256usize, 1024] {
        let points = gen_uniform_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("brute_force_n{}", n), |b| {
            b.iter_batched(
                || {
                    let mut idx = BruteForceIndex::<f32, u32>::new();
                    let tokens = populate(&mut idx, &points);
                    (idx, tokens)
                },
                |(mut idx, tokens)| tick(&mut idx, &tokens, 3.0, 50.0),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || {
                    let mut idx = grid_index();
                    let tokens = populate(&mut idx, &points);
                    (idx, tokens)
                },
                |(mut idx, tokens)| tick(&mut idx, &tokens, 3.0, 50.0),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_clustered_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_clustered");
    let points = gen_clustered_points(16, 256, 60.0);
    group.bench_function("build_then_many_queries", |b| {
        b.iter_batched(
            || {
                let mut idx = grid_index();
                populate(&mut idx, &points);
                idx
            },
            |idx| {
                let mut out = Vec::new();
                for &p in points.iter().step_by(16) {
                    out.clear();
                    idx.find_neighbors(p, 25.0, &mut out);
                    black_box(out.len());
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_populate_and_query,
    bench_steering_tick,
    bench_clustered_grid,
);
criterion_main!(benches);

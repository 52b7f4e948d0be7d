// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Proximity: allocate, move, query, remove.

use understory_proximity::{GridIndex, LatticeConfig, Point3, ProximityIndex};

fn main() {
    let config = LatticeConfig::cube(Point3::splat(0.0_f32), 100.0, 10);
    let mut idx: GridIndex<f32, &str> = GridIndex::new(config).expect("valid lattice");

    let a = idx.allocate_token("a");
    let b = idx.allocate_token("b");
    let c = idx.allocate_token("c");
    idx.update_position(a, Point3::new(5.0, 5.0, 5.0));
    idx.update_position(b, Point3::new(15.0, 5.0, 5.0));
    idx.update_position(c, Point3::new(95.0, 5.0, 5.0));

    let mut near = Vec::new();
    idx.find_neighbors(Point3::new(5.0, 5.0, 5.0), 12.0, &mut near);
    println!("near (5,5,5): {near:?}");

    // Move b across the lattice
    idx.update_position(b, Point3::new(50.0, 50.0, 50.0));
    near.clear();
    idx.find_neighbors(Point3::new(5.0, 5.0, 5.0), 12.0, &mut near);
    println!("near (5,5,5) after move: {near:?}");

    idx.remove_token(c);
    println!(
        "population={}, bins={:?}",
        idx.population(),
        idx.bin_population_stats()
    );
}

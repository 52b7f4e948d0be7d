// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Agents own `ProximityToken`s; despawning an agent drops its token, which
//! removes it from the shared index.

use understory_proximity::{GridIndex, LatticeConfig, Point3, ProximityToken, SharedIndex};

type Db = GridIndex<f32, &'static str>;

struct Ship {
    name: &'static str,
    token: ProximityToken<f32, &'static str, Db>,
}

fn main() {
    env_logger::init();
    let config = LatticeConfig::cube(Point3::splat(-50.0), 100.0, 8);
    let db = SharedIndex::new(Db::new(config).expect("valid lattice"));

    let mut ships: Vec<Ship> = [("red", -10.0), ("green", 0.0), ("blue", 8.0), ("far", 45.0)]
        .into_iter()
        .map(|(name, x)| {
            let mut token = db.allocate(name);
            token.update_position(Point3::new(x, 0.0, 0.0));
            Ship { name, token }
        })
        .collect();

    for ship in &ships {
        let mut near = Vec::new();
        ship.token.find_neighbors(15.0, &mut near);
        println!(
            "{}: neighbors {:?}, nearest other {:?}",
            ship.name,
            near,
            ship.token.find_nearest(15.0)
        );
    }

    // "far" flies off the east edge; the lattice wraps it to the west buckets.
    ships[3].token.update_position(Point3::new(52.0, 0.0, 0.0));
    log::info!("far is now at {:?}", ships[3].token.position());

    ships.retain(|s| s.name != "green");
    println!(
        "after despawning green: population {}",
        db.population()
    );

    let stats = db.bin_population_stats();
    println!("bins: min={} max={} avg={:.2}", stats.min, stats.max, stats.average);
}

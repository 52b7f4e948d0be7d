// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A swarm of wandering agents that look up their neighbors every tick.
//!
//! The proximity backend is picked at runtime:
//!
//! ```text
//! RUST_LOG=info cargo run -p understory_proximity_demos --example wander_swarm -- grid
//! RUST_LOG=info cargo run -p understory_proximity_demos --example wander_swarm -- brute
//! ```

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use understory_proximity::{
    BruteForceIndex, GridIndex, LatticeConfig, Point3, ProximityIndex, Token,
};

const WORLD: f32 = 200.0;
const AGENTS: usize = 2000;
const TICKS: usize = 120;
const SENSE_RADIUS: f32 = 12.0;
const MAX_SPEED: f32 = 2.0;

struct Agent {
    token: Token,
    position: Point3<f32>,
    velocity: Point3<f32>,
}

fn make_index(kind: &str) -> Box<dyn ProximityIndex<f32, usize>> {
    match kind {
        "brute" => Box::new(BruteForceIndex::new()),
        _ => {
            let config = LatticeConfig::cube(Point3::splat(0.0), WORLD, 16);
            match GridIndex::new(config) {
                Ok(grid) => Box::new(grid),
                Err(err) => {
                    log::error!("invalid lattice ({err}); falling back to brute force");
                    Box::new(BruteForceIndex::new())
                }
            }
        }
    }
}

fn random_vector(rng: &mut StdRng, scale: f32) -> Point3<f32> {
    Point3::new(
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
    )
}

fn clamp_speed(v: Point3<f32>) -> Point3<f32> {
    let len = v.distance_squared(Point3::splat(0.0)).sqrt();
    if len <= MAX_SPEED {
        return v;
    }
    let k = MAX_SPEED / len;
    Point3::new(v.x * k, v.y * k, v.z * k)
}

/// Wrap a coordinate back into the world, like the lattice does for indexing.
fn wrap(v: f32) -> f32 {
    v.rem_euclid(WORLD)
}

fn main() {
    env_logger::init();
    let kind = std::env::args().nth(1).unwrap_or_else(|| "grid".to_owned());
    let mut index = make_index(&kind);
    let mut rng = StdRng::seed_from_u64(0x5EED);

    let mut agents: Vec<Agent> = (0..AGENTS)
        .map(|i| {
            let token = index.allocate_token(i);
            let position = Point3::new(
                rng.gen_range(0.0..WORLD),
                rng.gen_range(0.0..WORLD),
                rng.gen_range(0.0..WORLD),
            );
            index.update_position(token, position);
            Agent {
                token,
                position,
                velocity: random_vector(&mut rng, MAX_SPEED),
            }
        })
        .collect();
    log::info!("{kind}: spawned {} agents", index.population());

    let start = Instant::now();
    let mut neighbors = Vec::new();
    let mut total_neighbors = 0usize;
    for tick in 0..TICKS {
        for agent in &mut agents {
            let jitter = random_vector(&mut rng, 0.3);
            agent.velocity = clamp_speed(Point3::new(
                agent.velocity.x + jitter.x,
                agent.velocity.y + jitter.y,
                agent.velocity.z + jitter.z,
            ));
            agent.position = Point3::new(
                wrap(agent.position.x + agent.velocity.x),
                wrap(agent.position.y + agent.velocity.y),
                wrap(agent.position.z + agent.velocity.z),
            );
            index.update_position(agent.token, agent.position);

            neighbors.clear();
            index.find_neighbors(agent.position, SENSE_RADIUS, &mut neighbors);
            total_neighbors += neighbors.len().saturating_sub(1);
        }
        if tick % 30 == 0 {
            let stats = index.bin_population_stats();
            log::info!(
                "tick {tick}: bins min={} max={} avg={:.2}",
                stats.min,
                stats.max,
                stats.average
            );
        }
    }
    let elapsed = start.elapsed();

    // Despawn a third of the swarm.
    for agent in agents.drain(..AGENTS / 3) {
        index.remove_token(agent.token);
    }

    println!(
        "{kind}: {TICKS} ticks x {AGENTS} agents in {elapsed:?}, avg {:.2} neighbors, {} left",
        total_neighbors as f64 / (TICKS * AGENTS) as f64,
        index.population()
    );
}

//! Worker pool and result aggregation.
//!
//! Every worker owns a value copy of the canonical [`Spot`], a private
//! small-state RNG seeded from its index and a trial quota; workers share
//! nothing inside the hot loop. The merge happens once, after the pool has
//! joined.

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::spot::{PlayerResult, Spot};

struct Worker {
    spot: Spot,
    rng: SmallRng,
    quota: u64,
    results: Vec<PlayerResult>,
}

impl Worker {
    fn new(spot: &Spot, index: u64, seed: u64, quota: u64) -> Worker {
        Worker {
            spot: spot.clone(),
            rng: SmallRng::seed_from_u64(seed.wrapping_add(index)),
            quota,
            results: vec![PlayerResult::default(); spot.players()],
        }
    }

    fn run(&mut self) {
        for _ in 0..self.quota {
            self.spot.run(&mut self.rng, &mut self.results);
        }
    }
}

/// Run `games` trials of `spot` across `workers` OS threads and merge the
/// per-player counters. `workers == 0` selects the logical CPU count. The
/// trial count is split as evenly as possible, remainder spread one extra
/// trial per worker.
pub fn simulate(spot: &Spot, games: u64, workers: usize, seed: u64) -> Vec<PlayerResult> {
    let workers = if workers == 0 { num_cpus::get() } else { workers };
    let base = games / workers as u64;
    let extra = (games % workers as u64) as usize;

    let mut pool: Vec<Worker> = (0..workers)
        .map(|i| Worker::new(spot, i as u64, seed, base + (i < extra) as u64))
        .collect();

    debug!("simulating {games} trials of `{spot}` over {workers} workers");

    pool.par_iter_mut().for_each(Worker::run);

    let mut totals = vec![PlayerResult::default(); spot.players()];
    for worker in &pool {
        for (total, partial) in totals.iter_mut().zip(&worker.results) {
            total.merge(*partial);
        }
    }
    totals
}

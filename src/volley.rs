//! Batch fire and impact-spread statistics.
//!
//! Fires N dispersed rounds at the same aim point in parallel and
//! reduces the impacts to group statistics: mean point of impact,
//! radial spread, and hit count against an optional target. Each round
//! gets its own counter-based ChaCha stream derived from one master
//! seed, so a batch is reproducible regardless of how rayon schedules
//! it.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::integrator::{Outcome, TargetTrack};
use crate::solver::{AimPoint, Solver};

/// Golden-ratio increment decorrelates per-round seed streams.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Batch parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolleyParams {
    pub rounds: usize,
    /// Barrel heat fraction applied to every round in the batch
    pub heat_fraction: f64,
    /// Master seed; same seed, same statistics
    pub seed: u64,
}

/// Reduced impact statistics for one volley.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolleyStats {
    pub rounds: usize,
    /// Rounds that terminated on the target
    pub hits: usize,
    /// Mean point of impact over non-target terminations
    pub mean_impact: Vector3<f64>,
    /// RMS horizontal distance of impacts from the mean point
    pub radial_std_m: f64,
    /// Largest horizontal distance of any impact from the mean point
    pub max_radial_m: f64,
    pub mean_flight_time_s: f64,
}

/// Fire a volley and reduce it to statistics.
pub fn fire_volley(
    solver: &Solver,
    aim: &AimPoint,
    params: &VolleyParams,
    target: Option<&(dyn TargetTrack + Sync)>,
) -> VolleyStats {
    let results: Vec<_> = (0..params.rounds)
        .into_par_iter()
        .map(|i| {
            let seed = params.seed.wrapping_add(SEED_STRIDE.wrapping_mul(i as u64 + 1));
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            solver.fire_with_rng(
                aim,
                params.heat_fraction,
                target.map(|t| t as &dyn TargetTrack),
                &mut rng,
            )
        })
        .collect();

    let hits = results
        .iter()
        .filter(|r| r.outcome == Outcome::TargetImpact)
        .count();

    let misses: Vec<_> = results
        .iter()
        .filter(|r| r.outcome != Outcome::TargetImpact)
        .collect();

    let (mean_impact, radial_std_m, max_radial_m) = if misses.is_empty() {
        (Vector3::zeros(), 0.0, 0.0)
    } else {
        let n = misses.len() as f64;
        let mean = misses
            .iter()
            .fold(Vector3::zeros(), |acc, r| acc + r.impact_position)
            / n;

        let mut sum_sq = 0.0;
        let mut max_r: f64 = 0.0;
        for r in &misses {
            let dx = r.impact_position.x - mean.x;
            let dy = r.impact_position.y - mean.y;
            let radial = (dx * dx + dy * dy).sqrt();
            sum_sq += radial * radial;
            max_r = max_r.max(radial);
        }
        (mean, (sum_sq / n).sqrt(), max_r)
    };

    let mean_flight_time_s = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.flight_time_s).sum::<f64>() / results.len() as f64
    };

    VolleyStats {
        rounds: params.rounds,
        hits,
        mean_impact,
        radial_std_m,
        max_radial_m,
        mean_flight_time_s,
    }
}

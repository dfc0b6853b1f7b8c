//! Mechanical dispersion.
//!
//! Dispersion is not a continuous force: it is a one-time angular
//! perturbation of the launch direction, sampled from a zero-mean
//! Gaussian. The cone opens as the barrel heats; the turret
//! collaborator supplies its accumulated heat as a fraction in [0, 1].

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::MOA_TO_RAD;

/// Documented mechanical dispersion of a fresh barrel, minutes of
/// angle (total cone).
pub const BASE_DISPERSION_MOA: f64 = 2.0;

/// Linear growth of the dispersion cone with heat fraction. At full
/// heat the cone is (1 + gain) times the base, roughly the worn-barrel
/// behavior of a gun overdue for a barrel change.
pub const HEAT_DISPERSION_GAIN: f64 = 2.0;

/// Per-axis Gaussian standard deviation in radians for a given barrel
/// state.
///
/// The quoted MOA figure is the full cone; each angular axis gets half
/// of it as its standard deviation. Strictly increasing in
/// `heat_fraction`; the fraction is clamped to [0, 1].
pub fn dispersion_sigma_rad(base_moa: f64, heat_gain: f64, heat_fraction: f64) -> f64 {
    let heat = heat_fraction.clamp(0.0, 1.0);
    let cone_rad = base_moa * MOA_TO_RAD * (1.0 + heat_gain * heat);
    cone_rad / 2.0
}

/// Sample one launch perturbation: (azimuth offset, elevation offset)
/// in radians.
pub fn sample_offset<R: Rng + ?Sized>(rng: &mut R, sigma_rad: f64) -> (f64, f64) {
    if sigma_rad <= 0.0 {
        return (0.0, 0.0);
    }
    // Construction only fails for non-finite or negative sigma, which
    // the guard excludes.
    let Ok(normal) = Normal::new(0.0, sigma_rad) else {
        return (0.0, 0.0);
    };
    (normal.sample(rng), normal.sample(rng))
}

//! Solver driver: the single entry point collaborators call.
//!
//! One `Solver` holds the validated projectile, the round's
//! atmosphere, and the firing policy. Each `fire` call samples a
//! dispersion offset, seeds the initial kinematic state from the
//! muzzle pose, and runs the integrator to a terminal condition. A
//! solver is immutable and carries no per-shot state, so overlapping
//! shots may share one instance across threads freely.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::atmosphere::{Atmosphere, Environment};
use crate::dispersion::{
    dispersion_sigma_rad, sample_offset, BASE_DISPERSION_MOA, HEAT_DISPERSION_GAIN,
};
use crate::error::{require_positive, ConfigError};
use crate::forces::{earth_omega, ForceModel};
use crate::integrator::{
    integrate, IntegrationLimits, KinematicState, TargetTrack, TrajectoryResult,
};
use crate::projectile::ProjectileSpec;

/// Firing policy and integration limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Horizontal range at which rounds are abandoned, m
    pub max_range_m: f64,
    /// Safety timeout per solve, s
    pub max_flight_time_s: f64,
    /// Record every Nth integration step for tracer rendering;
    /// 0 disables recording
    pub record_interval: usize,
    /// Rolling cap on retained trail points
    pub max_trail_points: usize,
    /// Fresh-barrel dispersion cone, minutes of angle
    pub base_dispersion_moa: f64,
    /// Growth of the cone with barrel heat fraction
    pub heat_dispersion_gain: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_range_m: 7000.0,
            max_flight_time_s: 30.0,
            record_interval: 10,
            max_trail_points: 60,
            base_dispersion_moa: BASE_DISPERSION_MOA,
            heat_dispersion_gain: HEAT_DISPERSION_GAIN,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("max_range_m", self.max_range_m)?;
        require_positive("max_flight_time_s", self.max_flight_time_s)?;
        crate::error::require_in_range(
            "base_dispersion_moa",
            self.base_dispersion_moa,
            0.0,
            60.0,
        )?;
        crate::error::require_in_range(
            "heat_dispersion_gain",
            self.heat_dispersion_gain,
            0.0,
            100.0,
        )?;
        Ok(())
    }
}

/// Where the barrel points and where its tip sits, supplied by the
/// turret collaborator.
///
/// Azimuth 0 = North (+Y), increasing clockwise (East = π/2);
/// elevation 0 = horizontal, positive up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AimPoint {
    pub azimuth_rad: f64,
    pub elevation_rad: f64,
    /// Muzzle (barrel tip) position in ENU world coordinates, m
    pub muzzle_position: Vector3<f64>,
}

/// One shot's solver: validated once, then infallible and reusable.
#[derive(Debug, Clone)]
pub struct Solver {
    spec: ProjectileSpec,
    atmosphere: Atmosphere,
    config: SolverConfig,
    forces: ForceModel,
}

impl Solver {
    /// Build a solver for one round's conditions.
    ///
    /// All configuration errors surface here; after construction,
    /// firing cannot fail.
    pub fn new(
        spec: ProjectileSpec,
        env: &Environment,
        config: SolverConfig,
    ) -> Result<Self, ConfigError> {
        spec.validate()?;
        config.validate()?;
        let atmosphere = Atmosphere::new(env)?;
        let omega = env.latitude_deg.map(earth_omega);
        let forces = ForceModel::new(&spec, &atmosphere, omega);
        Ok(Solver {
            spec,
            atmosphere,
            config,
            forces,
        })
    }

    pub fn spec(&self) -> &ProjectileSpec {
        &self.spec
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Fire one round with mechanical dispersion drawn from `rng`.
    ///
    /// `heat_fraction` is the turret's accumulated barrel heat in
    /// [0, 1]; hotter barrels throw wider. If `target` is supplied it
    /// is queried live during flight for the intercept test.
    pub fn fire_with_rng<R: Rng + ?Sized>(
        &self,
        aim: &AimPoint,
        heat_fraction: f64,
        target: Option<&dyn TargetTrack>,
        rng: &mut R,
    ) -> TrajectoryResult {
        let sigma = dispersion_sigma_rad(
            self.config.base_dispersion_moa,
            self.config.heat_dispersion_gain,
            heat_fraction,
        );
        let (d_az, d_el) = sample_offset(rng, sigma);
        let initial = self.muzzle_state(aim, d_az, d_el);
        integrate(
            initial,
            &self.forces,
            &self.atmosphere,
            &self.limits(),
            target,
        )
    }

    /// Fire one round using the thread-local RNG.
    pub fn fire(
        &self,
        aim: &AimPoint,
        heat_fraction: f64,
        target: Option<&dyn TargetTrack>,
    ) -> TrajectoryResult {
        self.fire_with_rng(aim, heat_fraction, target, &mut rand::rng())
    }

    /// Fire the undisturbed trajectory: no dispersion sample.
    ///
    /// Used for zeroing solutions and for reproducibility checks.
    pub fn fire_true(
        &self,
        aim: &AimPoint,
        target: Option<&dyn TargetTrack>,
    ) -> TrajectoryResult {
        let initial = self.muzzle_state(aim, 0.0, 0.0);
        integrate(
            initial,
            &self.forces,
            &self.atmosphere,
            &self.limits(),
            target,
        )
    }

    fn limits(&self) -> IntegrationLimits {
        IntegrationLimits {
            max_range_m: self.config.max_range_m,
            max_flight_time_s: self.config.max_flight_time_s,
            record_interval: self.config.record_interval,
            max_trail_points: self.config.max_trail_points,
        }
    }

    /// Initial kinematic state from the muzzle pose plus an angular
    /// dispersion offset.
    fn muzzle_state(&self, aim: &AimPoint, d_az: f64, d_el: f64) -> KinematicState {
        let v0 = self.spec.muzzle_velocity_mps;
        let cos_el = aim.elevation_rad.cos();
        let sin_el = aim.elevation_rad.sin();

        let mut vx = v0 * cos_el * aim.azimuth_rad.sin();
        let mut vy = v0 * cos_el * aim.azimuth_rad.cos();
        let mut vz = v0 * sin_el;

        // Small-angle perturbation of the launch direction: azimuth
        // error swings the horizontal component, elevation error the
        // vertical.
        if d_az != 0.0 || d_el != 0.0 {
            let cos_az = aim.azimuth_rad.cos();
            let sin_az = aim.azimuth_rad.sin();
            vx += v0 * d_az * cos_el * cos_az;
            vy -= v0 * d_az * cos_el * sin_az;
            vz += v0 * d_el;
        }

        KinematicState::new(aim.muzzle_position, Vector3::new(vx, vy, vz))
    }
}

//! # gunnery-core
//!
//! Exterior ballistics core for a simulated anti-air gun emplacement.
//! Computes the flight path of a fired round from muzzle to impact (or
//! range exhaustion): table-based aerodynamic drag, weather-adjusted
//! atmosphere, spin drift, Coriolis deflection, wind, and heat-scaled
//! mechanical dispersion, integrated with adaptive-step RK4.
//!
//! The surrounding application supplies the muzzle pose, weather, and
//! barrel heat, and consumes the trajectory result and optional tracer
//! trail. Everything here is synchronous, CPU-bound, and stateless
//! between shots apart from the immutable shared drag tables, so
//! overlapping solves can run on independent threads without locks.

// Re-export the main types and functions
pub use atmosphere::{Atmosphere, AtmosphericSample, Environment};
pub use drag::{drag_coefficient, drag_table, DragTable};
pub use drag_model::DragLaw;
pub use error::ConfigError;
pub use forces::{earth_omega, miller_stability, ForceModel};
pub use integrator::{
    integrate, IntegrationLimits, KinematicState, MovingTarget, Outcome, TargetTrack,
    TrailPoint, TrajectoryResult,
};
pub use projectile::ProjectileSpec;
pub use solver::{AimPoint, Solver, SolverConfig};
pub use volley::{fire_volley, VolleyParams, VolleyStats};

// Module declarations
pub mod atmosphere;
mod constants;
pub mod dispersion;
pub mod drag;
mod drag_model;
mod drag_tables;
mod error;
pub mod forces;
pub mod integrator;
pub mod projectile;
pub mod solver;
pub mod volley;

pub use constants::{
    DEFAULT_LATITUDE_DEG, G_ACCEL_MPS2, ISA_DENSITY, ISA_PRESSURE_PA, ISA_SPEED_OF_SOUND,
    ISA_TEMP_K,
};

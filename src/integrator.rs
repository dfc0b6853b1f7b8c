//! Trajectory integration.
//!
//! 4th-order Runge-Kutta over the 6-dimensional state (position,
//! velocity). The step size adapts to the flight regime: the drag
//! curve changes steeply through the transonic band, so steps shrink
//! there and stretch when the round is clearly supersonic, subsonic,
//! or slow. After every step the stop conditions are evaluated in
//! priority order; ground and target impacts are reported at the
//! interpolated crossing point rather than the post-step state, so
//! results carry no step-size bias.
//!
//! For fixed inputs and the fixed step policy the solution is
//! bit-for-bit reproducible: no randomness, no time sources, no
//! iteration-order ambiguity.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::atmosphere::Atmosphere;
use crate::forces::ForceModel;

// Step policy (seconds). Full precision through the transonic band,
// where Cd varies fastest with Mach.
const DT_TRANSONIC: f64 = 0.001;
const DT_COARSE: f64 = 0.002;
const DT_SLOW: f64 = 0.005;
const TRANSONIC_MACH_LOW: f64 = 0.88;
const TRANSONIC_MACH_HIGH: f64 = 1.15;
const SLOW_SPEED_MPS: f64 = 100.0;

/// Position and velocity of one projectile, ENU frame.
///
/// Owned exclusively by one in-flight solve; mutated only by the
/// integrator, once per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl KinematicState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        KinematicState { position, velocity }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// How a solve terminated.
///
/// Timeout is an ordinary outcome, never an error: game logic treats
/// "fell beyond max range" and "never converged" as misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    GroundImpact,
    TargetImpact,
    MaxRange,
    Timeout,
}

/// One recorded point of a tracer trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub time_s: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub speed: f64,
    pub mach: f64,
}

/// Terminal output of one solve.
///
/// The caller owns it; the core retains nothing across shots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub outcome: Outcome,
    /// Where the round ended: the interpolated crossing for impacts,
    /// the final integrated state otherwise.
    pub impact_position: Vector3<f64>,
    /// Time of the impact (interpolated for impacts).
    pub impact_time_s: f64,
    /// Total simulated flight time.
    pub flight_time_s: f64,
    pub terminal_speed_mps: f64,
    pub terminal_mach: f64,
    /// RK4 steps taken.
    pub steps: usize,
    /// Sparse sampled states for tracer rendering, if recording was
    /// requested. Bounded rolling window plus the terminal point.
    pub trail: Option<Vec<TrailPoint>>,
}

impl TrajectoryResult {
    /// Consume the tracer trail, leaving `None` behind.
    ///
    /// The renderer is the only consumer and reads it exactly once;
    /// taking it avoids cloning the points out.
    pub fn take_trail(&mut self) -> impl Iterator<Item = TrailPoint> {
        self.trail.take().unwrap_or_default().into_iter()
    }
}

/// Live view of a moving target during a solve.
///
/// The integrator queries this every step with the current flight
/// time, so the target may move while the round is in the air;
/// implementations must not snapshot.
pub trait TargetTrack {
    /// Target center and effective collision radius at a flight time.
    fn sample(&self, time_s: f64) -> (Vector3<f64>, f64);
}

/// Straight-line constant-velocity target, the common case for the
/// drones this emplacement engages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovingTarget {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub radius_m: f64,
}

impl TargetTrack for MovingTarget {
    fn sample(&self, time_s: f64) -> (Vector3<f64>, f64) {
        (self.position + self.velocity * time_s, self.radius_m)
    }
}

/// Integration limits and recording policy for one solve.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationLimits {
    /// Horizontal range beyond which the round is abandoned, m
    pub max_range_m: f64,
    /// Safety timeout, s
    pub max_flight_time_s: f64,
    /// Record every Nth step into the trail; 0 disables recording
    pub record_interval: usize,
    /// Rolling cap on retained trail points
    pub max_trail_points: usize,
}

/// Shortest distance from point `p` to segment `a`–`b`, and the
/// parameter of the closest point along the segment.
fn segment_point_distance(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    p: &Vector3<f64>,
) -> (f64, f64) {
    let ab = b - a;
    let ab_sq = ab.norm_squared();
    if ab_sq < 1e-12 {
        return ((p - a).norm(), 0.0);
    }
    let t = ((p - a).dot(&ab) / ab_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    ((p - closest).norm(), t)
}

/// One full trajectory solve.
///
/// Advances `initial` until a stop condition is met and returns the
/// terminal result. `forces` and `atmosphere` are read-only shared
/// context; the state is owned here.
pub fn integrate(
    initial: KinematicState,
    forces: &ForceModel,
    atmosphere: &Atmosphere,
    limits: &IntegrationLimits,
    target: Option<&dyn TargetTrack>,
) -> TrajectoryResult {
    let mut state = initial;
    let mut time = 0.0_f64;
    let mut steps = 0_usize;

    let max_range_sq = limits.max_range_m * limits.max_range_m;
    let mut trail: Option<Vec<TrailPoint>> = if limits.record_interval > 0 {
        Some(vec![trail_point(&state, 0.0, atmosphere)])
    } else {
        None
    };

    loop {
        // Step size by flight regime.
        let sample_here = atmosphere.sample(state.position.z.max(0.0));
        let speed = state.speed();
        let mach = speed / sample_here.speed_of_sound;
        let dt = if !(TRANSONIC_MACH_LOW..=TRANSONIC_MACH_HIGH).contains(&mach) {
            if speed < SLOW_SPEED_MPS {
                DT_SLOW
            } else {
                DT_COARSE
            }
        } else {
            DT_TRANSONIC
        };

        let previous = state;
        state = rk4_step(&state, time, dt, forces, atmosphere);
        time += dt;
        steps += 1;

        if let Some(points) = trail.as_mut() {
            if steps % limits.record_interval == 0 {
                points.push(trail_point(&state, time, atmosphere));
                if points.len() > limits.max_trail_points {
                    let excess = points.len() - limits.max_trail_points;
                    points.drain(..excess);
                }
            }
        }

        // Stop conditions, first satisfied wins.

        if let Some(track) = target {
            let (target_pos, radius) = track.sample(time);
            // Swept test: a supersonic round can cross the whole
            // target between two steps.
            let (dist, s) =
                segment_point_distance(&previous.position, &state.position, &target_pos);
            if dist <= radius {
                let hit_pos =
                    previous.position + (state.position - previous.position) * s;
                let hit_vel =
                    previous.velocity + (state.velocity - previous.velocity) * s;
                let hit_time = time - dt + dt * s;
                return finish(
                    Outcome::TargetImpact,
                    hit_pos,
                    hit_vel,
                    hit_time,
                    steps,
                    trail,
                    atmosphere,
                );
            }
        }

        if state.position.z <= 0.0 {
            // Interpolate the exact ground crossing inside the step.
            let dz = previous.position.z - state.position.z;
            let s = if dz.abs() > 1e-12 {
                (previous.position.z / dz).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let hit_pos = previous.position + (state.position - previous.position) * s;
            let hit_vel = previous.velocity + (state.velocity - previous.velocity) * s;
            let hit_time = time - dt + dt * s;
            return finish(
                Outcome::GroundImpact,
                hit_pos,
                hit_vel,
                hit_time,
                steps,
                trail,
                atmosphere,
            );
        }

        let horiz_sq =
            state.position.x * state.position.x + state.position.y * state.position.y;
        if horiz_sq > max_range_sq {
            return finish(
                Outcome::MaxRange,
                state.position,
                state.velocity,
                time,
                steps,
                trail,
                atmosphere,
            );
        }

        if time >= limits.max_flight_time_s {
            return finish(
                Outcome::Timeout,
                state.position,
                state.velocity,
                time,
                steps,
                trail,
                atmosphere,
            );
        }
    }
}

/// One RK4 stage update of the full 6-D state.
fn rk4_step(
    state: &KinematicState,
    time: f64,
    dt: f64,
    forces: &ForceModel,
    atmosphere: &Atmosphere,
) -> KinematicState {
    let deriv = |s: &KinematicState, t: f64| -> (Vector3<f64>, Vector3<f64>) {
        let sample = atmosphere.sample(s.position.z.max(0.0));
        (s.velocity, forces.acceleration(&s.velocity, t, &sample))
    };

    let half = 0.5 * dt;
    let t_half = time + half;

    let (k1_p, k1_v) = deriv(state, time);
    let s2 = KinematicState {
        position: state.position + k1_p * half,
        velocity: state.velocity + k1_v * half,
    };
    let (k2_p, k2_v) = deriv(&s2, t_half);
    let s3 = KinematicState {
        position: state.position + k2_p * half,
        velocity: state.velocity + k2_v * half,
    };
    let (k3_p, k3_v) = deriv(&s3, t_half);
    let s4 = KinematicState {
        position: state.position + k3_p * dt,
        velocity: state.velocity + k3_v * dt,
    };
    let (k4_p, k4_v) = deriv(&s4, time + dt);

    let sixth = dt / 6.0;
    KinematicState {
        position: state.position + (k1_p + k2_p * 2.0 + k3_p * 2.0 + k4_p) * sixth,
        velocity: state.velocity + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * sixth,
    }
}

fn trail_point(state: &KinematicState, time: f64, atmosphere: &Atmosphere) -> TrailPoint {
    let speed = state.speed();
    let sos = atmosphere
        .sample(state.position.z.max(0.0))
        .speed_of_sound;
    TrailPoint {
        time_s: time,
        position: state.position,
        velocity: state.velocity,
        speed,
        mach: speed / sos,
    }
}

fn finish(
    outcome: Outcome,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    time: f64,
    steps: usize,
    mut trail: Option<Vec<TrailPoint>>,
    atmosphere: &Atmosphere,
) -> TrajectoryResult {
    let terminal = KinematicState { position, velocity };
    if let Some(points) = trail.as_mut() {
        points.push(trail_point(&terminal, time, atmosphere));
    }
    let speed = velocity.norm();
    let sos = atmosphere.sample(position.z.max(0.0)).speed_of_sound;
    TrajectoryResult {
        outcome,
        impact_position: position,
        impact_time_s: time,
        flight_time_s: time,
        terminal_speed_mps: speed,
        terminal_mach: speed / sos,
        steps,
        trail,
    }
}

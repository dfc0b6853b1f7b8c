//! End-to-end reference shots for the standard 12.7 mm round.
//!
//! Range figures are checked against the documented reference
//! trajectories for M33 ball (G7 BC 0.337, 890 m/s) on a standard dry
//! day with wind, Coriolis, and dispersion disabled.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gunnery_core::{
    AimPoint, Environment, MovingTarget, Outcome, ProjectileSpec, Solver, SolverConfig,
    VolleyParams,
};

fn reference_env() -> Environment {
    Environment {
        temperature_c: 15.0,
        pressure_hpa: 1013.25,
        humidity_pct: 0.0,
        wind_speed_mps: 0.0,
        wind_from_deg: 0.0,
        altitude_m: 0.0,
        latitude_deg: None,
    }
}

fn reference_solver() -> Solver {
    Solver::new(
        ProjectileSpec::m33_ball(),
        &reference_env(),
        SolverConfig::default(),
    )
    .unwrap()
}

fn aim_north(elevation_deg: f64) -> AimPoint {
    AimPoint {
        azimuth_rad: 0.0,
        elevation_rad: elevation_deg.to_radians(),
        muzzle_position: Vector3::new(0.0, 0.0, 1.5),
    }
}

fn horizontal_range(p: &Vector3<f64>) -> f64 {
    (p.x * p.x + p.y * p.y).sqrt()
}

#[test]
fn reference_range_45_degrees() {
    let solver = reference_solver();
    let result = solver.fire_true(&aim_north(45.0), None);

    assert_eq!(result.outcome, Outcome::GroundImpact);
    let range = horizontal_range(&result.impact_position);
    let expected = 4700.0;
    assert!(
        (range - expected).abs() / expected < 0.05,
        "45 deg range {range} m, expected ~{expected} m"
    );
    // A 45-degree lob of this round stays up for tens of seconds.
    assert!(result.flight_time_s > 10.0 && result.flight_time_s < 30.0);
}

#[test]
fn reference_range_5_degrees() {
    let solver = reference_solver();
    let result = solver.fire_true(&aim_north(5.0), None);

    assert_eq!(result.outcome, Outcome::GroundImpact);
    let range = horizontal_range(&result.impact_position);
    let expected = 2900.0;
    assert!(
        (range - expected).abs() / expected < 0.05,
        "5 deg range {range} m, expected ~{expected} m"
    );
}

#[test]
fn spin_drift_rightward_at_1000_m() {
    // Right-hand twist, northbound, no wind or Coriolis: the only
    // lateral influence is spin drift, which must push east by a few
    // tens of centimeters at 1000 m.
    let solver = Solver::new(
        ProjectileSpec::m33_ball(),
        &reference_env(),
        SolverConfig {
            max_range_m: 1000.0,
            ..SolverConfig::default()
        },
    )
    .unwrap();

    let result = solver.fire_true(&aim_north(2.0), None);
    assert_eq!(result.outcome, Outcome::MaxRange);
    let drift = result.impact_position.x;
    assert!(drift > 0.0, "right-hand twist must drift right: {drift}");
    assert!(
        (0.05..0.6).contains(&drift),
        "spin drift at 1000 m out of reference band: {drift} m"
    );
}

#[test]
fn left_twist_mirrors_drift() {
    let mut spec = ProjectileSpec::m33_ball();
    spec.twist_right = false;
    let solver = Solver::new(
        spec,
        &reference_env(),
        SolverConfig {
            max_range_m: 1000.0,
            ..SolverConfig::default()
        },
    )
    .unwrap();

    let result = solver.fire_true(&aim_north(2.0), None);
    assert!(result.impact_position.x < 0.0);
}

#[test]
fn coriolis_deflects_at_long_range() {
    let mut env = reference_env();
    env.latitude_deg = Some(45.0);
    let with = Solver::new(ProjectileSpec::m33_ball(), &env, SolverConfig::default())
        .unwrap()
        .fire_true(&aim_north(45.0), None);
    let without = reference_solver().fire_true(&aim_north(45.0), None);

    let deflection = (with.impact_position - without.impact_position).norm();
    // Earth rotation moves a 20-second flight by meters, not
    // millimeters and not kilometers.
    assert!(
        deflection > 0.5 && deflection < 100.0,
        "Coriolis deflection {deflection} m"
    );
}

#[test]
fn headwind_shortens_range() {
    let mut env = reference_env();
    env.wind_speed_mps = 10.0;
    env.wind_from_deg = 0.0; // from the north, straight into the shot
    let into_wind = Solver::new(ProjectileSpec::m33_ball(), &env, SolverConfig::default())
        .unwrap()
        .fire_true(&aim_north(5.0), None);
    let calm = reference_solver().fire_true(&aim_north(5.0), None);

    let r_wind = horizontal_range(&into_wind.impact_position);
    let r_calm = horizontal_range(&calm.impact_position);
    assert!(
        r_wind < r_calm - 10.0,
        "headwind should cost range: {r_wind} vs {r_calm}"
    );
}

#[test]
fn solves_are_bit_reproducible() {
    let solver = reference_solver();
    let aim = aim_north(12.5);
    let a = solver.fire_true(&aim, None);
    let b = solver.fire_true(&aim, None);
    assert_eq!(a.impact_position, b.impact_position);
    assert_eq!(a.impact_time_s, b.impact_time_s);
    assert_eq!(a.terminal_speed_mps, b.terminal_speed_mps);
    assert_eq!(a.steps, b.steps);
}

#[test]
fn direct_shot_hits_enclosing_target() {
    let solver = reference_solver();
    let target = MovingTarget {
        position: Vector3::new(0.0, 500.0, 1.5),
        velocity: Vector3::zeros(),
        radius_m: 3.0,
    };
    let result = solver.fire_true(&aim_north(0.0), Some(&target));
    assert_eq!(
        result.outcome,
        Outcome::TargetImpact,
        "straight shot through the target must report a target impact"
    );
}

#[test]
fn crossing_drone_intercepted_mid_flight() {
    // A drone crossing the fire line is hit where it is at arrival
    // time, not where it was at trigger pull.
    let solver = reference_solver();
    let drone = MovingTarget {
        position: Vector3::new(-30.0, 800.0, 120.0),
        velocity: Vector3::new(33.0, 0.0, 0.0),
        radius_m: 4.0,
    };
    // Rounds reach 800 m in roughly 1.17 s; lay the barrel on the
    // predicted intercept.
    let lead_time = 1.17;
    let predicted = drone.position + drone.velocity * lead_time;
    let azimuth = predicted.x.atan2(predicted.y);
    let horiz = (predicted.x * predicted.x + predicted.y * predicted.y).sqrt();
    // Superelevate for gravity drop over the flight.
    let drop_comp = 0.5 * 9.80665 * lead_time * lead_time;
    let elevation = ((predicted.z - 1.5 + drop_comp) / horiz).atan();

    let aim = AimPoint {
        azimuth_rad: azimuth,
        elevation_rad: elevation,
        muzzle_position: Vector3::new(0.0, 0.0, 1.5),
    };
    let result = solver.fire_true(&aim, Some(&drone));
    assert_eq!(result.outcome, Outcome::TargetImpact);
    assert!(
        result.impact_position.x > 0.0,
        "intercept should happen near the predicted crossing, not the spawn point, got x {}",
        result.impact_position.x
    );
}

#[test]
fn timeout_is_an_outcome_not_an_error() {
    let solver = Solver::new(
        ProjectileSpec::m33_ball(),
        &reference_env(),
        SolverConfig {
            max_flight_time_s: 1.0,
            ..SolverConfig::default()
        },
    )
    .unwrap();
    let result = solver.fire_true(&aim_north(45.0), None);
    assert_eq!(result.outcome, Outcome::Timeout);
}

#[test]
fn tracer_trail_suitable_for_rendering() {
    let solver = reference_solver();
    let mut result = solver.fire_true(&aim_north(30.0), None);
    let trail: Vec<_> = result.take_trail().collect();

    assert!(trail.len() >= 2);
    assert!(trail.len() <= solver.config().max_trail_points + 1);
    let last = trail.last().unwrap();
    assert!((last.position - result.impact_position).norm() < 1e-9);
    for point in &trail {
        assert!(point.speed > 0.0);
        assert!(point.mach > 0.0);
    }
    // One-shot: a second take yields nothing.
    assert_eq!(result.take_trail().count(), 0);
}

#[test]
fn dispersed_volley_reproducible_and_heat_sensitive() {
    let solver = Solver::new(
        ProjectileSpec::m33_ball(),
        &reference_env(),
        SolverConfig {
            record_interval: 0,
            ..SolverConfig::default()
        },
    )
    .unwrap();
    let aim = aim_north(5.0);

    let cold = VolleyParams {
        rounds: 120,
        heat_fraction: 0.0,
        seed: 2024,
    };
    let hot = VolleyParams {
        rounds: 120,
        heat_fraction: 1.0,
        seed: 2024,
    };

    let cold_a = gunnery_core::fire_volley(&solver, &aim, &cold, None);
    let cold_b = gunnery_core::fire_volley(&solver, &aim, &cold, None);
    assert_eq!(cold_a.radial_std_m, cold_b.radial_std_m);

    let hot_stats = gunnery_core::fire_volley(&solver, &aim, &hot, None);
    assert!(hot_stats.radial_std_m > 1.5 * cold_a.radial_std_m);
}

#[test]
fn individual_dispersed_shots_scatter() {
    let solver = reference_solver();
    let aim = aim_north(5.0);
    let truth = solver.fire_true(&aim, None);

    let mut rng = ChaCha8Rng::seed_from_u64(314);
    let mut deviations = Vec::new();
    for _ in 0..20 {
        let shot = solver.fire(&aim, 0.0, None);
        let _ = shot; // thread-rng path stays exercised
        let seeded = solver.fire_with_rng(&aim, 0.0, None, &mut rng);
        deviations.push((seeded.impact_position - truth.impact_position).norm());
    }
    let moved = deviations.iter().filter(|d| **d > 0.1).count();
    assert!(moved > 10, "2 MOA at ~2.9 km should visibly scatter");
}

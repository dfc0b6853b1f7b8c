/// Physical constants used throughout the ballistics core.
///
/// All internal computation is metric (SI) in an East-North-Up frame.

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Earth rotation rate in rad/s (sidereal)
pub const EARTH_OMEGA_RAD_S: f64 = 7.2921159e-5;

/// Default firing latitude in degrees (affects Coriolis deflection)
pub const DEFAULT_LATITUDE_DEG: f64 = 45.0;

// ICAO International Standard Atmosphere reference conditions at sea level.

/// ISA sea-level temperature (15 °C)
pub const ISA_TEMP_K: f64 = 288.15;

/// ISA sea-level pressure
pub const ISA_PRESSURE_PA: f64 = 101_325.0;

/// ISA sea-level air density (kg/m³)
pub const ISA_DENSITY: f64 = 1.225;

/// ISA sea-level speed of sound (m/s)
pub const ISA_SPEED_OF_SOUND: f64 = 340.294;

/// Specific gas constant for dry air, J/(kg·K)
pub const R_DRY: f64 = 287.058;

/// Specific gas constant for water vapor, J/(kg·K)
pub const R_VAPOR: f64 = 461.495;

/// Ratio of specific heats for air
pub const GAMMA_AIR: f64 = 1.4;

/// Tropospheric temperature lapse rate, K/m
pub const LAPSE_RATE_K_PER_M: f64 = 0.0065;

/// Temperature floor at the tropopause (K); the lapse profile flattens here
pub const TROPOPAUSE_TEMP_K: f64 = 216.65;

/// Conversion: minutes of angle to radians
pub const MOA_TO_RAD: f64 = std::f64::consts::PI / 10_800.0;

/// Conversion: inches to meters (twist rates are quoted in inches/turn)
pub const INCHES_TO_METERS: f64 = 0.0254;

// Numerical stability thresholds.

/// Minimum airspeed magnitude below which drag and spin terms are dropped
pub const MIN_VELOCITY_THRESHOLD: f64 = 1e-6;

/// Minimum denominator for safe division in interpolation
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

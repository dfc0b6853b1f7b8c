//! Atmospheric model.
//!
//! Converts weather at the firing point into local air density, speed
//! of sound, and dynamic viscosity at any altitude along a trajectory.
//! Temperature follows the tropospheric lapse rate (flattened at the
//! tropopause), pressure the barometric formula, and density the moist
//! air equation of state: humid air is *less* dense than dry air at
//! equal pressure and temperature, because water vapor is lighter than
//! the nitrogen and oxygen it displaces.
//!
//! Density queries in the integration hot path go through a
//! precomputed altitude lookup table (10 m bins to 5 km) with linear
//! interpolation; above the table ceiling they fall back to the full
//! computation. All outputs are continuous in altitude and in every
//! weather input.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LATITUDE_DEG, GAMMA_AIR, G_ACCEL_MPS2, ISA_DENSITY, LAPSE_RATE_K_PER_M, R_DRY,
    R_VAPOR, TROPOPAUSE_TEMP_K,
};
use crate::error::{require_finite, require_in_range, ConfigError};

// Sutherland's law reference values for air.
const SUTHERLAND_T0_K: f64 = 273.15;
const SUTHERLAND_MU0: f64 = 1.716e-5;
const SUTHERLAND_S_K: f64 = 110.4;

// Density lookup table: 10 m bins from the firing point up to 5 km.
const DENSITY_LUT_STEP_M: f64 = 10.0;
const DENSITY_LUT_MAX_M: f64 = 5000.0;
const DENSITY_LUT_SIZE: usize = 501;
const DENSITY_LUT_INV_STEP: f64 = 1.0 / DENSITY_LUT_STEP_M;

/// Weather measured at the firing point, one instance per round.
///
/// Owned by the caller; the core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Temperature at the firing point, °C
    pub temperature_c: f64,
    /// Barometric pressure at the firing point, hPa
    pub pressure_hpa: f64,
    /// Relative humidity, 0–100 %
    pub humidity_pct: f64,
    /// Wind speed, m/s (horizontal)
    pub wind_speed_mps: f64,
    /// Direction the wind blows FROM, degrees (0 = North, 90 = East)
    pub wind_from_deg: f64,
    /// Firing-point altitude above sea level, m
    pub altitude_m: f64,
    /// Firing latitude in degrees for Coriolis; `None` disables it
    pub latitude_deg: Option<f64>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            temperature_c: 15.0,
            pressure_hpa: 1013.25,
            humidity_pct: 50.0,
            wind_speed_mps: 0.0,
            wind_from_deg: 0.0,
            altitude_m: 0.0,
            latitude_deg: Some(DEFAULT_LATITUDE_DEG),
        }
    }
}

impl Environment {
    /// Reject configurations that would corrupt every subsequent shot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_in_range("temperature_c", self.temperature_c, -90.0, 60.0)?;
        require_in_range("pressure_hpa", self.pressure_hpa, 300.0, 1100.0)?;
        require_in_range("humidity_pct", self.humidity_pct, 0.0, 100.0)?;
        require_in_range("wind_speed_mps", self.wind_speed_mps, 0.0, 150.0)?;
        require_finite("wind_from_deg", self.wind_from_deg)?;
        require_in_range("altitude_m", self.altitude_m, -500.0, 10_000.0)?;
        if let Some(lat) = self.latitude_deg {
            require_in_range("latitude_deg", lat, -90.0, 90.0)?;
        }
        Ok(())
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_c + 273.15
    }

    pub fn pressure_pa(&self) -> f64 {
        self.pressure_hpa * 100.0
    }

    /// Wind vector in ENU world coordinates.
    ///
    /// Direction is where the wind comes FROM: wind from the north
    /// blows toward −Y.
    pub fn wind_vector(&self) -> Vector3<f64> {
        let rad = self.wind_from_deg.to_radians();
        Vector3::new(
            -self.wind_speed_mps * rad.sin(),
            -self.wind_speed_mps * rad.cos(),
            0.0,
        )
    }
}

/// Local air properties at one altitude, computed fresh each
/// integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericSample {
    /// Air density, kg/m³
    pub density: f64,
    /// Speed of sound, m/s
    pub speed_of_sound: f64,
    /// Dynamic viscosity, Pa·s
    pub viscosity: f64,
}

/// Atmosphere model for one round's weather.
///
/// Immutable after construction; shared by reference across all
/// concurrent solves for the round.
#[derive(Debug, Clone)]
pub struct Atmosphere {
    temperature0_k: f64,
    pressure0_pa: f64,
    humidity_pct: f64,
    wind: Vector3<f64>,
    sea_level_density: f64,
    sea_level_speed_of_sound: f64,
    density_lut: Vec<f64>,
}

impl Atmosphere {
    pub fn new(env: &Environment) -> Result<Self, ConfigError> {
        env.validate()?;

        let t0 = env.temperature_k();
        let p0 = env.pressure_pa();
        let hum = env.humidity_pct;

        let mut atmosphere = Atmosphere {
            temperature0_k: t0,
            pressure0_pa: p0,
            humidity_pct: hum,
            wind: env.wind_vector(),
            sea_level_density: air_density(t0, p0, hum),
            sea_level_speed_of_sound: speed_of_sound(t0, p0, hum),
            density_lut: Vec::with_capacity(DENSITY_LUT_SIZE),
        };

        for i in 0..DENSITY_LUT_SIZE {
            let alt = i as f64 * DENSITY_LUT_STEP_M;
            let (t, p) = atmosphere.temperature_pressure_at(alt);
            atmosphere.density_lut.push(air_density(t, p, hum));
        }

        Ok(atmosphere)
    }

    /// Density at the firing point, kg/m³.
    pub fn surface_density(&self) -> f64 {
        self.sea_level_density
    }

    /// Speed of sound at the firing point, m/s.
    pub fn surface_speed_of_sound(&self) -> f64 {
        self.sea_level_speed_of_sound
    }

    /// Ratio of firing-point density to the ISA standard.
    pub fn density_ratio(&self) -> f64 {
        self.sea_level_density / ISA_DENSITY
    }

    /// Wind vector in ENU coordinates.
    pub fn wind(&self) -> Vector3<f64> {
        self.wind
    }

    /// Mach number of a speed at firing-point conditions.
    pub fn mach(&self, speed_mps: f64) -> f64 {
        speed_mps / self.sea_level_speed_of_sound
    }

    /// Temperature and pressure at an altitude above the firing point.
    ///
    /// Lapse-rate profile up to the tropopause, isothermal above;
    /// pressure follows the matching barometric form in each regime, so
    /// both outputs are continuous at the transition.
    fn temperature_pressure_at(&self, altitude_m: f64) -> (f64, f64) {
        let alt = altitude_m.max(0.0);
        let t0 = self.temperature0_k;
        let p0 = self.pressure0_pa;
        let exponent = G_ACCEL_MPS2 / (LAPSE_RATE_K_PER_M * R_DRY);

        // Altitude at which the lapse profile reaches the tropopause floor.
        let iso_alt = (t0 - TROPOPAUSE_TEMP_K) / LAPSE_RATE_K_PER_M;
        if alt <= iso_alt {
            let t = t0 - LAPSE_RATE_K_PER_M * alt;
            let p = p0 * (t / t0).powf(exponent);
            (t, p)
        } else {
            let p_iso = p0 * (TROPOPAUSE_TEMP_K / t0).powf(exponent);
            let p = p_iso
                * (-G_ACCEL_MPS2 * (alt - iso_alt) / (R_DRY * TROPOPAUSE_TEMP_K)).exp();
            (TROPOPAUSE_TEMP_K, p)
        }
    }

    /// Air density at an altitude above the firing point, kg/m³.
    ///
    /// O(1) via the lookup table within its range.
    pub fn density_at(&self, altitude_m: f64) -> f64 {
        if altitude_m <= 0.0 {
            return self.density_lut[0];
        }
        if altitude_m >= DENSITY_LUT_MAX_M {
            let (t, p) = self.temperature_pressure_at(altitude_m);
            return air_density(t, p, self.humidity_pct);
        }

        let idx_f = altitude_m * DENSITY_LUT_INV_STEP;
        let idx = idx_f as usize;
        let frac = idx_f - idx as f64;
        self.density_lut[idx] + frac * (self.density_lut[idx + 1] - self.density_lut[idx])
    }

    /// Full atmospheric sample at an altitude above the firing point.
    pub fn sample(&self, altitude_m: f64) -> AtmosphericSample {
        let (t, p) = self.temperature_pressure_at(altitude_m);
        AtmosphericSample {
            density: self.density_at(altitude_m),
            speed_of_sound: speed_of_sound(t, p, self.humidity_pct),
            viscosity: dynamic_viscosity(t),
        }
    }
}

/// Saturation vapor pressure over water, Pa (Buck equation).
fn saturation_vapor_pressure(temp_k: f64) -> f64 {
    let tc = temp_k - 273.15;
    611.21 * ((18.678 - tc / 234.5) * (tc / (257.14 + tc))).exp()
}

/// Moist air density from the equation of state, kg/m³.
///
/// rho = p_dry / (R_dry T) + e / (R_vapor T), where e is the actual
/// vapor pressure.
fn air_density(temp_k: f64, pressure_pa: f64, humidity_pct: f64) -> f64 {
    let e = humidity_pct / 100.0 * saturation_vapor_pressure(temp_k);
    let p_dry = (pressure_pa - e).max(0.0);
    p_dry / (R_DRY * temp_k) + e / (R_VAPOR * temp_k)
}

/// Speed of sound in moist air, m/s.
///
/// Humidity lowers the mean molecular weight and the effective gamma;
/// the net effect raises the speed of sound by up to ~0.5 % at
/// saturation.
fn speed_of_sound(temp_k: f64, pressure_pa: f64, humidity_pct: f64) -> f64 {
    let e = humidity_pct / 100.0 * saturation_vapor_pressure(temp_k);
    let x_v = (e / pressure_pa).clamp(0.0, 1.0);
    let gamma_moist = GAMMA_AIR - 0.07 * x_v;
    let r_moist = R_DRY * (1.0 + (R_VAPOR / R_DRY - 1.0) * x_v);
    (gamma_moist * r_moist * temp_k).sqrt()
}

/// Dynamic viscosity of air via Sutherland's law, Pa·s.
///
/// Retained for completeness; the drag model is table-based and applies
/// no Reynolds-number correction.
pub fn dynamic_viscosity(temp_k: f64) -> f64 {
    SUTHERLAND_MU0 * (SUTHERLAND_T0_K + SUTHERLAND_S_K) / (temp_k + SUTHERLAND_S_K)
        * (temp_k / SUTHERLAND_T0_K).powf(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_day() -> Environment {
        Environment {
            temperature_c: 15.0,
            pressure_hpa: 1013.25,
            humidity_pct: 0.0,
            ..Environment::default()
        }
    }

    #[test]
    fn test_isa_sea_level_density() {
        let atmo = Atmosphere::new(&standard_day()).unwrap();
        let rho = atmo.surface_density();
        assert!(
            (rho - 1.225).abs() / 1.225 < 0.005,
            "ISA density off: {rho}"
        );
        let sos = atmo.surface_speed_of_sound();
        assert!((sos - 340.3).abs() < 1.5, "ISA speed of sound off: {sos}");
    }

    #[test]
    fn test_density_decreases_with_altitude() {
        let atmo = Atmosphere::new(&standard_day()).unwrap();
        let mut prev = atmo.density_at(0.0);
        let mut alt = 250.0;
        while alt <= 11_000.0 {
            let rho = atmo.density_at(alt);
            assert!(
                rho < prev,
                "density not decreasing at {alt} m: {rho} >= {prev}"
            );
            prev = rho;
            alt += 250.0;
        }
    }

    #[test]
    fn test_humid_air_less_dense() {
        let dry = Atmosphere::new(&standard_day()).unwrap();
        let humid = Atmosphere::new(&Environment {
            humidity_pct: 90.0,
            ..standard_day()
        })
        .unwrap();

        assert!(humid.surface_density() < dry.surface_density());
        assert!(humid.surface_speed_of_sound() > dry.surface_speed_of_sound());
    }

    #[test]
    fn test_continuity_across_lut_ceiling() {
        let atmo = Atmosphere::new(&standard_day()).unwrap();
        let below = atmo.density_at(4_999.0);
        let above = atmo.density_at(5_001.0);
        assert!((below - above).abs() < 1e-4);
    }

    #[test]
    fn test_continuity_across_tropopause() {
        // Flattened lapse above the tropopause keeps both outputs
        // continuous.
        let atmo = Atmosphere::new(&standard_day()).unwrap();
        let a = atmo.sample(10_990.0);
        let b = atmo.sample(11_010.0);
        assert!((a.density - b.density).abs() / a.density < 0.01);
        assert!((a.speed_of_sound - b.speed_of_sound).abs() < 0.5);
    }

    #[test]
    fn test_sutherland_viscosity() {
        // ~1.8e-5 Pa·s at 15 °C.
        let mu = dynamic_viscosity(288.15);
        assert!((mu - 1.79e-5).abs() < 0.05e-5, "viscosity off: {mu}");
        // Viscosity of a gas grows with temperature.
        assert!(dynamic_viscosity(320.0) > dynamic_viscosity(250.0));
    }

    #[test]
    fn test_wind_vector_from_direction() {
        let env = Environment {
            wind_speed_mps: 10.0,
            wind_from_deg: 90.0, // from the east
            ..Environment::default()
        };
        let w = env.wind_vector();
        assert!((w.x + 10.0).abs() < 1e-9); // blows west
        assert!(w.y.abs() < 1e-9);
        assert_eq!(w.z, 0.0);
    }

    #[test]
    fn test_validation_rejects_bad_weather() {
        let too_humid = Environment {
            humidity_pct: 120.0,
            ..Environment::default()
        };
        assert!(Atmosphere::new(&too_humid).is_err());

        let vacuum = Environment {
            pressure_hpa: -5.0,
            ..Environment::default()
        };
        assert!(Atmosphere::new(&vacuum).is_err());

        let nan_temp = Environment {
            temperature_c: f64::NAN,
            ..Environment::default()
        };
        assert!(Atmosphere::new(&nan_temp).is_err());

        let off_globe = Environment {
            latitude_deg: Some(123.0),
            ..Environment::default()
        };
        assert!(Atmosphere::new(&off_globe).is_err());
    }

    #[test]
    fn test_sample_matches_lut_density() {
        let atmo = Atmosphere::new(&standard_day()).unwrap();
        for alt in [0.0, 15.0, 333.3, 1200.0, 4990.0] {
            let s = atmo.sample(alt);
            assert_eq!(s.density, atmo.density_at(alt));
            assert!(s.viscosity > 0.0);
        }
    }

    #[test]
    fn test_density_continuous_in_weather_inputs() {
        // A tiny nudge of any weather input nudges density by a tiny
        // amount.
        let base = Atmosphere::new(&standard_day()).unwrap();
        let nudged = Atmosphere::new(&Environment {
            temperature_c: 15.001,
            pressure_hpa: 1013.26,
            humidity_pct: 0.01,
            ..standard_day()
        })
        .unwrap();
        assert!((base.surface_density() - nudged.surface_density()).abs() < 1e-4);
    }
}

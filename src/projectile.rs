use serde::{Deserialize, Serialize};

use crate::constants::INCHES_TO_METERS;
use crate::drag_model::DragLaw;
use crate::error::{require_positive, ConfigError};

/// Static aerodynamic and mass properties of one ammunition type.
///
/// Created once at startup, validated, and shared read-only across all
/// shots; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub name: String,
    /// Projectile mass, kg
    pub mass_kg: f64,
    /// Reference (bore) diameter, m
    pub diameter_m: f64,
    /// Sectional density in the ballistics convention, lb/in²
    pub sectional_density: f64,
    /// Ballistic coefficient referenced to `drag_law`, lb/in²
    pub ballistic_coefficient: f64,
    /// Drag law the BC is referenced to
    pub drag_law: DragLaw,
    /// Muzzle velocity, m/s
    pub muzzle_velocity_mps: f64,
    /// Barrel twist rate, inches per turn
    pub twist_rate_inches: f64,
    /// Right-hand twist drifts right
    pub twist_right: bool,
    /// Projectile length in calibers (gyroscopic stability estimate)
    pub length_calibers: f64,
}

impl ProjectileSpec {
    /// Reject non-physical specifications before any shot is solved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("mass_kg", self.mass_kg)?;
        require_positive("diameter_m", self.diameter_m)?;
        require_positive("sectional_density", self.sectional_density)?;
        require_positive("ballistic_coefficient", self.ballistic_coefficient)?;
        require_positive("muzzle_velocity_mps", self.muzzle_velocity_mps)?;
        require_positive("twist_rate_inches", self.twist_rate_inches)?;
        require_positive("length_calibers", self.length_calibers)?;
        Ok(())
    }

    /// Frontal cross-section, m²
    pub fn frontal_area_m2(&self) -> f64 {
        std::f64::consts::PI * (self.diameter_m / 2.0).powi(2)
    }

    /// Form factor relating this projectile's drag to the reference
    /// shape: i = SD / BC.
    pub fn form_factor(&self) -> f64 {
        self.sectional_density / self.ballistic_coefficient
    }

    /// Spin rate leaving the muzzle, rad/s, from twist and muzzle
    /// velocity.
    pub fn muzzle_spin_rate_rad_s(&self) -> f64 {
        let twist_m = self.twist_rate_inches * INCHES_TO_METERS;
        2.0 * std::f64::consts::PI * self.muzzle_velocity_mps / twist_m
    }

    /// Twist direction sign: +1 right-hand, -1 left-hand.
    pub fn twist_sign(&self) -> f64 {
        if self.twist_right {
            1.0
        } else {
            -1.0
        }
    }

    /// 12.7×99 mm NATO M33 Ball, the emplacement's standard round.
    ///
    /// Data: 647 gr, G7 BC 0.337, 890 m/s, 1:15" right-hand twist.
    pub fn m33_ball() -> Self {
        ProjectileSpec {
            name: "12.7x99mm NATO M33 Ball".to_string(),
            mass_kg: 0.04174,
            diameter_m: 0.0127,
            sectional_density: 0.412,
            ballistic_coefficient: 0.337,
            drag_law: DragLaw::G7,
            muzzle_velocity_mps: 890.0,
            twist_rate_inches: 15.0,
            twist_right: true,
            length_calibers: 4.65,
        }
    }
}

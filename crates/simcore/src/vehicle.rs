use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, ensure_in_range, ensure_positive};
use crate::presets::GravityPreset;

/// Physical parameters of the vehicle and its environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Vehicle mass (kg)
    pub mass: f64,
    /// Gravitational acceleration (m/s²)
    #[serde(deserialize_with = "crate::presets::deserialize_gravity")]
    pub gravity: f64,
    /// Tire/ground friction coefficient (dimensionless)
    pub friction_coefficient: f64,
    /// Distance between front and rear axle (m)
    pub wheelbase: f64,
    /// Steering range is [-max_steering_angle, max_steering_angle] (rad)
    #[serde(rename = "max_steering_angle_deg", with = "crate::units::degrees")]
    pub max_steering_angle: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        VehicleParams {
            mass: 500.0,
            gravity: GravityPreset::Earth.acceleration(),
            friction_coefficient: 0.7,
            wheelbase: 2.5,
            max_steering_angle: FRAC_PI_4,
        }
    }
}

impl VehicleParams {
    pub const MAX_FRICTION_COEFFICIENT: f64 = 2.0;

    pub fn new(mass: f64, gravity: f64, friction_coefficient: f64) -> Self {
        Self {
            mass,
            gravity,
            friction_coefficient,
            ..Default::default()
        }
    }

    pub fn with_wheelbase(mut self, wheelbase: f64) -> Self {
        self.wheelbase = wheelbase;
        self
    }

    /// Set the steering limit (rad)
    pub fn with_max_steering_angle(mut self, max_steering_angle: f64) -> Self {
        self.max_steering_angle = max_steering_angle;
        self
    }

    pub fn with_gravity(mut self, gravity: impl Into<crate::GravitySetting>) -> Self {
        self.gravity = gravity.into().acceleration();
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive("mass", self.mass)?;
        ensure_positive("gravity", self.gravity)?;
        ensure_positive("friction_coefficient", self.friction_coefficient)?;
        ensure_in_range(
            "friction_coefficient",
            self.friction_coefficient,
            0.0,
            Self::MAX_FRICTION_COEFFICIENT,
        )?;
        ensure_positive("wheelbase", self.wheelbase)?;
        ensure_positive("max_steering_angle", self.max_steering_angle)?;
        if self.max_steering_angle > FRAC_PI_2 {
            return Err(SimError::validation(
                "max_steering_angle",
                format!(
                    "must be at most 90 degrees, got {}",
                    self.max_steering_angle.to_degrees()
                ),
            ));
        }
        Ok(())
    }

    /// Clamp an angle into the permitted steering range
    pub fn clamp_steering(&self, angle: f64) -> f64 {
        angle.clamp(-self.max_steering_angle, self.max_steering_angle)
    }
}

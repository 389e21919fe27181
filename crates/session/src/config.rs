//! Session configuration and partial parameter updates

use std::f64::consts::FRAC_PI_2;

use control::{PidGains, PidLimits};
use serde::{Deserialize, Serialize};
use simcore::{
    GravitySetting, IntegratorKind, SimError, SimResult, VehicleParams, ensure_finite, ensure_in_range,
    ensure_non_negative,
};

pub const MIN_TIME_STEP: f64 = 1e-4;
pub const MAX_TIME_STEP: f64 = 1.0;
/// Longest duration (s) a single `run` may cover
pub const MAX_DURATION: f64 = 300.0;
/// Target angles beyond ±90° are rejected rather than clamped (rad)
pub const MAX_TARGET_ANGLE: f64 = FRAC_PI_2;

/// How the yaw rate responds once the tires are past their friction limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipResponse {
    /// Follow the bicycle-model yaw rate regardless; slip is only reported
    #[default]
    Kinematic,
    /// Cap the yaw rate at μ·g / v while slipping
    FrictionLimited,
}

/// Everything a session is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub vehicle: VehicleParams,
    pub pid_gains: PidGains,
    pub pid_limits: PidLimits,
    /// Speed at creation and after a plain reset (m/s)
    pub initial_velocity: f64,
    /// Fixed integration step (s)
    #[serde(alias = "dt")]
    pub time_step: f64,
    pub integrator: IntegratorKind,
    pub slip_response: SlipResponse,
    /// Clear the controller memory whenever an update replaces the gains
    pub reset_pid_on_gain_change: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            vehicle: VehicleParams::default(),
            pid_gains: PidGains::default(),
            pid_limits: PidLimits::default(),
            initial_velocity: 10.0,
            time_step: 0.01,
            integrator: IntegratorKind::default(),
            slip_response: SlipResponse::default(),
            reset_pid_on_gain_change: false,
        }
    }
}

impl SimulationConfig {
    pub fn new(vehicle: VehicleParams) -> Self {
        Self {
            vehicle,
            ..Default::default()
        }
    }

    pub fn with_pid_gains(mut self, gains: impl Into<PidGains>) -> Self {
        self.pid_gains = gains.into();
        self
    }

    pub fn with_pid_limits(mut self, limits: PidLimits) -> Self {
        self.pid_limits = limits;
        self
    }

    pub fn with_initial_velocity(mut self, velocity: f64) -> Self {
        self.initial_velocity = velocity;
        self
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_slip_response(mut self, slip_response: SlipResponse) -> Self {
        self.slip_response = slip_response;
        self
    }

    pub fn with_pid_reset_on_gain_change(mut self, reset: bool) -> Self {
        self.reset_pid_on_gain_change = reset;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        self.vehicle.validate()?;
        self.pid_gains.validate()?;
        self.pid_limits.validate()?;
        ensure_non_negative("initial_velocity", self.initial_velocity)?;
        ensure_in_range("time_step", self.time_step, MIN_TIME_STEP, MAX_TIME_STEP)?;
        Ok(())
    }
}

/// Check a requested target angle (rad) and clamp it into the steering range
pub fn checked_target_angle(target_angle: f64, vehicle: &VehicleParams) -> SimResult<f64> {
    ensure_finite("target_angle", target_angle)?;
    if target_angle.abs() > MAX_TARGET_ANGLE {
        return Err(SimError::validation(
            "target_angle",
            format!(
                "must be between -90 and 90 degrees, got {}",
                target_angle.to_degrees()
            ),
        ));
    }
    Ok(vehicle.clamp_steering(target_angle))
}

/// Partial gain replacement; absent gains keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainsUpdate {
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
}

impl GainsUpdate {
    pub fn apply_to(&self, gains: PidGains) -> PidGains {
        PidGains {
            kp: self.kp.unwrap_or(gains.kp),
            ki: self.ki.unwrap_or(gains.ki),
            kd: self.kd.unwrap_or(gains.kd),
        }
    }
}

impl From<PidGains> for GainsUpdate {
    fn from(gains: PidGains) -> Self {
        GainsUpdate {
            kp: Some(gains.kp),
            ki: Some(gains.ki),
            kd: Some(gains.kd),
        }
    }
}

/// Live parameter change. Present fields overwrite, absent fields are left
/// alone, and the whole record is validated before anything is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamUpdate {
    /// Current speed (m/s); changes the live state, not the reset speed
    pub velocity: Option<f64>,
    pub mass: Option<f64>,
    pub friction_coefficient: Option<f64>,
    pub gravity: Option<GravitySetting>,
    pub pid_gains: Option<GainsUpdate>,
}

impl ParamUpdate {
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_friction_coefficient(mut self, friction_coefficient: f64) -> Self {
        self.friction_coefficient = Some(friction_coefficient);
        self
    }

    pub fn with_gravity(mut self, gravity: impl Into<GravitySetting>) -> Self {
        self.gravity = Some(gravity.into());
        self
    }

    pub fn with_pid_gains(mut self, gains: impl Into<GainsUpdate>) -> Self {
        self.pid_gains = Some(gains.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ParamUpdate::default()
    }

    /// Merged and validated configuration; `config` itself is not touched
    pub fn merge(&self, config: &SimulationConfig) -> SimResult<SimulationConfig> {
        let mut next = config.clone();
        if let Some(mass) = self.mass {
            next.vehicle.mass = mass;
        }
        if let Some(friction_coefficient) = self.friction_coefficient {
            next.vehicle.friction_coefficient = friction_coefficient;
        }
        if let Some(gravity) = self.gravity {
            next.vehicle.gravity = gravity.acceleration();
        }
        if let Some(gains) = self.pid_gains {
            next.pid_gains = gains.apply_to(next.pid_gains);
        }
        next.validate()?;
        Ok(next)
    }

    pub fn checked_velocity(&self) -> SimResult<Option<f64>> {
        self.velocity
            .map(|v| ensure_non_negative("velocity", v))
            .transpose()
    }
}

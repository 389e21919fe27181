//! PID steering controller
//!
//! A closed-loop controller with integral clamping, output saturation and
//! conditional-integration anti-windup. The output is a steering RATE (rad/s);
//! the caller integrates it over the step to get the commanded angle.

use std::f64::consts::FRAC_PI_3;

use serde::{Deserialize, Serialize};
use simcore::{Model, SimResult, ensure_non_negative, ensure_positive};

/// Controller gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        crate::PidPreset::Balanced.gains()
    }
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative("kp", self.kp)?;
        ensure_non_negative("ki", self.ki)?;
        ensure_non_negative("kd", self.kd)?;
        Ok(())
    }
}

/// Saturation limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidLimits {
    /// Maximum integral accumulator magnitude (rad·s)
    pub i_max: f64,
    /// Maximum output magnitude (rad/s)
    #[serde(rename = "max_rate_deg_s", with = "simcore::units::degrees")]
    pub max_rate: f64,
}

impl Default for PidLimits {
    /// Tight enough that the balanced gains settle within a degree of a
    /// 15° target on a low-grip lunar turn; looser limits overshoot it.
    fn default() -> Self {
        Self {
            i_max: 0.05,
            max_rate: FRAC_PI_3,
        }
    }
}

impl PidLimits {
    /// Set integral anti-windup limit
    pub fn with_i_max(mut self, i_max: f64) -> Self {
        self.i_max = i_max;
        self
    }

    /// Set output saturation (rad/s)
    pub fn with_max_rate(mut self, max_rate: f64) -> Self {
        self.max_rate = max_rate;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative("i_max", self.i_max)?;
        ensure_positive("max_rate", self.max_rate)?;
        Ok(())
    }
}

/// Mutable controller memory
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub integral: f64,
    pub prev_error: f64,
    pub prev_output: f64,
    pub saturated: bool,
}

/// PID Controller with state
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    limits: PidLimits,
    state: PidState,
}

impl PidController {
    pub fn new(gains: PidGains, limits: PidLimits) -> Self {
        Self {
            gains,
            limits,
            state: PidState::default(),
        }
    }

    /// Update the controller and return the saturated steering rate (rad/s)
    ///
    /// The derivative acts on the error. A non-positive `dt` contributes
    /// neither integral nor derivative.
    pub fn update(&mut self, target: f64, measurement: f64, dt: f64) -> f64 {
        let error = target - measurement;

        let provisional_integral = if dt > 0.0 {
            (self.state.integral + error * dt).clamp(-self.limits.i_max, self.limits.i_max)
        } else {
            self.state.integral
        };

        let derivative = if dt > 0.0 {
            (error - self.state.prev_error) / dt
        } else {
            0.0
        };

        let raw = self.gains.kp * error + self.gains.ki * provisional_integral + self.gains.kd * derivative;
        let output = raw.clamp(-self.limits.max_rate, self.limits.max_rate);
        let saturated = output != raw;

        // Anti-windup: hold the integral while the output is pinned
        if !saturated {
            self.state.integral = provisional_integral;
        }
        self.state.prev_error = error;
        self.state.prev_output = output;
        self.state.saturated = saturated;

        output
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Replace the gains, keeping the accumulated state
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn limits(&self) -> PidLimits {
        self.limits
    }

    pub fn state(&self) -> PidState {
        self.state
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.state.integral
    }
}

impl Model for PidController {
    /// Clears integral and derivative memory; gains are untouched
    fn reset(&mut self) {
        self.state = PidState::default();
    }
}

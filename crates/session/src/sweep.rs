//! One-parameter sweeps over throwaway sessions
//!
//! Every value gets its own freshly built session; nothing is shared between
//! iterations and nothing is registered, so results depend only on the
//! request.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use simcore::{SimError, SimResult, VehicleState, ensure_finite};

use crate::Diagnostics;
use crate::config::{SimulationConfig, checked_target_angle};
use crate::session::SimulationSession;
use crate::statistics::SummaryStatistics;

/// Upper bound on values per sweep request
pub const MAX_SWEEP_VALUES: usize = 50;

/// Configuration field a sweep varies. Values for `MaxSteeringAngle` are
/// degrees, the same unit the serialized config uses for that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    Mass,
    Gravity,
    FrictionCoefficient,
    Wheelbase,
    MaxSteeringAngle,
    InitialVelocity,
    #[serde(alias = "dt")]
    TimeStep,
    Kp,
    Ki,
    Kd,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 10] = [
        SweepParameter::Mass,
        SweepParameter::Gravity,
        SweepParameter::FrictionCoefficient,
        SweepParameter::Wheelbase,
        SweepParameter::MaxSteeringAngle,
        SweepParameter::InitialVelocity,
        SweepParameter::TimeStep,
        SweepParameter::Kp,
        SweepParameter::Ki,
        SweepParameter::Kd,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SweepParameter::Mass => "mass",
            SweepParameter::Gravity => "gravity",
            SweepParameter::FrictionCoefficient => "friction_coefficient",
            SweepParameter::Wheelbase => "wheelbase",
            SweepParameter::MaxSteeringAngle => "max_steering_angle",
            SweepParameter::InitialVelocity => "initial_velocity",
            SweepParameter::TimeStep => "time_step",
            SweepParameter::Kp => "kp",
            SweepParameter::Ki => "ki",
            SweepParameter::Kd => "kd",
        }
    }

    /// `base` with this parameter overridden; not validated here
    pub fn apply(self, base: &SimulationConfig, value: f64) -> SimulationConfig {
        let mut config = base.clone();
        match self {
            SweepParameter::Mass => config.vehicle.mass = value,
            SweepParameter::Gravity => config.vehicle.gravity = value,
            SweepParameter::FrictionCoefficient => config.vehicle.friction_coefficient = value,
            SweepParameter::Wheelbase => config.vehicle.wheelbase = value,
            SweepParameter::MaxSteeringAngle => config.vehicle.max_steering_angle = value.to_radians(),
            SweepParameter::InitialVelocity => config.initial_velocity = value,
            SweepParameter::TimeStep => config.time_step = value,
            SweepParameter::Kp => config.pid_gains.kp = value,
            SweepParameter::Ki => config.pid_gains.ki = value,
            SweepParameter::Kd => config.pid_gains.kd = value,
        }
        config
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepParameter {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "dt" {
            return Ok(SweepParameter::TimeStep);
        }
        SweepParameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| SimError::validation("parameter", format!("unknown sweep parameter '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
    /// Simulated time per value (s)
    pub duration: f64,
    #[serde(rename = "target_angle_deg", with = "simcore::units::degrees")]
    pub target_angle: f64,
    #[serde(default)]
    pub base_config: SimulationConfig,
}

impl SweepRequest {
    pub fn new(parameter: SweepParameter, values: Vec<f64>, duration: f64, target_angle: f64) -> Self {
        SweepRequest {
            parameter,
            values,
            duration,
            target_angle,
            base_config: SimulationConfig::default(),
        }
    }

    pub fn with_base_config(mut self, base_config: SimulationConfig) -> Self {
        self.base_config = base_config;
        self
    }

    /// Checks that make the whole request unusable, as opposed to a single
    /// value that yields an invalid configuration
    pub fn validate(&self) -> SimResult<()> {
        if self.values.is_empty() {
            return Err(SimError::validation("values", "at least one value is required"));
        }
        if self.values.len() > MAX_SWEEP_VALUES {
            return Err(SimError::validation(
                "values",
                format!("at most {MAX_SWEEP_VALUES} values per sweep, got {}", self.values.len()),
            ));
        }
        for value in &self.values {
            ensure_finite("values", *value)?;
        }
        ensure_finite("duration", self.duration)?;
        if !(self.duration > 0.0 && self.duration <= crate::config::MAX_DURATION) {
            return Err(SimError::validation(
                "duration",
                format!("must be in (0, {}] seconds, got {}", crate::config::MAX_DURATION, self.duration),
            ));
        }
        ensure_finite("target_angle", self.target_angle)?;
        if self.target_angle.abs() > crate::config::MAX_TARGET_ANGLE {
            return Err(SimError::validation(
                "target_angle",
                format!("must be between -90 and 90 degrees, got {}", self.target_angle.to_degrees()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    Completed {
        final_state: VehicleState,
        diagnostics: Diagnostics,
        statistics: SummaryStatistics,
    },
    Failed {
        error: String,
    },
}

impl SweepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SweepOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub parameter_value: f64,
    #[serde(flatten)]
    pub outcome: SweepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub parameter: SweepParameter,
    /// Same order as the request's values
    pub results: Vec<SweepResult>,
    pub total_iterations: usize,
    pub successful_iterations: usize,
}

fn run_one(request: &SweepRequest, value: f64) -> SimResult<SweepOutcome> {
    let config = request.parameter.apply(&request.base_config, value);
    let mut session = SimulationSession::new(config)?;
    let target = checked_target_angle(request.target_angle, &session.config().vehicle)?;
    let last = session.run_to_end(request.duration, target)?;
    Ok(SweepOutcome::Completed {
        final_state: last.state,
        diagnostics: last.diagnostics,
        statistics: session.statistics(),
    })
}

/// Run `request` value by value, in order
pub fn run_sweep(request: &SweepRequest) -> SimResult<SweepReport> {
    request.validate()?;

    let results: Vec<SweepResult> = request
        .values
        .iter()
        .map(|&value| {
            let outcome = run_one(request, value).unwrap_or_else(|err| {
                warn!("sweep {} = {value} failed: {err}", request.parameter);
                SweepOutcome::Failed { error: err.to_string() }
            });
            SweepResult {
                parameter_value: value,
                outcome,
            }
        })
        .collect();

    let successful_iterations = results.iter().filter(|r| r.outcome.is_completed()).count();
    Ok(SweepReport {
        parameter: request.parameter,
        total_iterations: results.len(),
        successful_iterations,
        results,
    })
}

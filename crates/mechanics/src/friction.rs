//! Friction envelope
//!
//! Coulomb model of the lateral grip available to the tires:
//! - Normal force N = m·g
//! - Maximum friction force F_max = μ·N
//! - Utilization = |F_required| / F_max, as a percentage
//!
//! Utilization above 100% means the tires cannot supply the centripetal force
//! and the vehicle slips. Nothing here is stateful; identical inputs always
//! give identical reports.

use serde::{Deserialize, Serialize};
use simcore::VehicleParams;

const FORCE_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionModel {
    pub friction_coefficient: f64,
    pub gravity: f64,
    /// N = m·g (N)
    pub normal_force: f64,
    /// F_max = μ·N (N)
    pub max_friction_force: f64,
}

/// Outcome of checking one centripetal requirement against the envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionReport {
    pub normal_force: f64,
    pub max_friction_force: f64,
    /// Percent of the available friction in use (not capped at 100)
    pub friction_utilization: f64,
    pub can_turn: bool,
}

impl FrictionModel {
    pub fn from_params(params: &VehicleParams) -> Self {
        let normal_force = params.mass * params.gravity;
        FrictionModel {
            friction_coefficient: params.friction_coefficient,
            gravity: params.gravity,
            normal_force,
            max_friction_force: params.friction_coefficient * normal_force,
        }
    }

    /// Percent utilization for a required lateral force. A zero envelope with
    /// zero demand is 0%; any demand against a zero envelope is infinite.
    pub fn utilization(&self, required_force: f64) -> f64 {
        let demand = required_force.abs();
        if self.max_friction_force < FORCE_EPSILON {
            if demand < FORCE_EPSILON { 0.0 } else { f64::INFINITY }
        } else {
            demand / self.max_friction_force * 100.0
        }
    }

    pub fn evaluate(&self, required_force: f64) -> FrictionReport {
        let friction_utilization = self.utilization(required_force);
        FrictionReport {
            normal_force: self.normal_force,
            max_friction_force: self.max_friction_force,
            friction_utilization,
            can_turn: friction_utilization <= 100.0,
        }
    }

    /// Yaw rate the tires can sustain while sliding: lateral acceleration is
    /// capped at μ·g, so ω_max = μ·g / v, signed like the steering input.
    pub fn limited_yaw_rate(&self, velocity: f64, steering_angle: f64) -> f64 {
        if velocity.abs() < FORCE_EPSILON || steering_angle == 0.0 {
            return 0.0;
        }
        self.friction_coefficient * self.gravity / velocity.abs() * steering_angle.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::{TurnKinematics, turn_radius};
    use approx::assert_relative_eq;
    use simcore::GravityPreset;

    fn moon_rover() -> VehicleParams {
        VehicleParams::new(500.0, GravityPreset::Moon.acceleration(), 0.7)
    }

    #[test]
    fn test_envelope_forces() {
        let model = FrictionModel::from_params(&moon_rover());
        assert_eq!(model.normal_force, 500.0 * 1.62);
        assert_eq!(model.max_friction_force, 0.7 * (500.0 * 1.62));
    }

    #[test]
    fn test_zero_demand_is_zero_utilization() {
        let report = FrictionModel::from_params(&moon_rover()).evaluate(0.0);
        assert_eq!(report.friction_utilization, 0.0);
        assert!(report.can_turn);
    }

    #[test]
    fn test_utilization_uses_magnitude() {
        let model = FrictionModel::from_params(&moon_rover());
        let half = model.max_friction_force / 2.0;
        assert_relative_eq!(model.utilization(half), 50.0, max_relative = 1e-12);
        assert_relative_eq!(model.utilization(-half), 50.0, max_relative = 1e-12);
    }

    #[test]
    fn test_slip_just_past_the_envelope() {
        let params = moon_rover();
        let model = FrictionModel::from_params(&params);
        let steering = 0.1;
        let radius = turn_radius(steering, params.wheelbase).finite().unwrap();

        // Speed at which m·v²/R sits a hair above μ·m·g
        let v = (model.max_friction_force * radius / params.mass * (1.0 + 1e-6)).sqrt();
        let kin = TurnKinematics::compute(&params, steering, v);
        let report = model.evaluate(kin.centripetal_force);
        assert!(kin.centripetal_force > model.max_friction_force);
        assert!(report.friction_utilization > 100.0);
        assert!(!report.can_turn);

        // And a hair below it still holds
        let v = (model.max_friction_force * radius / params.mass * (1.0 - 1e-6)).sqrt();
        let kin = TurnKinematics::compute(&params, steering, v);
        assert!(model.evaluate(kin.centripetal_force).can_turn);
    }

    #[test]
    fn test_limited_yaw_rate_follows_steering_sign() {
        let model = FrictionModel::from_params(&moon_rover());
        assert_relative_eq!(model.limited_yaw_rate(10.0, 0.3), 0.7 * 1.62 / 10.0, max_relative = 1e-12);
        assert_relative_eq!(model.limited_yaw_rate(10.0, -0.3), -0.7 * 1.62 / 10.0, max_relative = 1e-12);
        assert_eq!(model.limited_yaw_rate(0.0, 0.3), 0.0);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let a = FrictionModel::from_params(&moon_rover()).evaluate(1234.5);
        let b = FrictionModel::from_params(&moon_rover()).evaluate(1234.5);
        assert_eq!(a, b);
    }
}

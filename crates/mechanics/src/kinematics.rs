//! Bicycle-model kinematics
//!
//! Closed-form turn geometry for a single-track vehicle:
//! - Turn radius R = L / tan(δ), unbounded for near-zero steering
//! - Yaw rate ω = v / R
//! - Required centripetal force F = m·v² / R (signed like R)
//! - Highest speed the available friction can hold on that radius, √(μ·g·|R|)

use serde::{Deserialize, Serialize};
use simcore::VehicleParams;

/// Steering angles (rad) below this are treated as straight-line motion
pub const STEERING_EPSILON: f64 = 1e-8;

/// Turn radius of the rear axle (m). `Unbounded` serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnRadius {
    Finite(f64),
    Unbounded,
}

impl TurnRadius {
    pub fn finite(self) -> Option<f64> {
        match self {
            TurnRadius::Finite(r) => Some(r),
            TurnRadius::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, TurnRadius::Unbounded)
    }
}

pub fn turn_radius(steering_angle: f64, wheelbase: f64) -> TurnRadius {
    if steering_angle.abs() < STEERING_EPSILON {
        return TurnRadius::Unbounded;
    }
    let tan = steering_angle.tan();
    if !tan.is_finite() || tan.abs() < STEERING_EPSILON {
        return TurnRadius::Unbounded;
    }
    TurnRadius::Finite(wheelbase / tan)
}

pub fn angular_velocity(velocity: f64, radius: TurnRadius) -> f64 {
    match radius {
        TurnRadius::Finite(r) => velocity / r,
        TurnRadius::Unbounded => 0.0,
    }
}

pub fn centripetal_force(mass: f64, velocity: f64, radius: TurnRadius) -> f64 {
    match radius {
        TurnRadius::Finite(r) => mass * velocity.powi(2) / r,
        TurnRadius::Unbounded => 0.0,
    }
}

/// `None` when the path is straight and any speed is safe
pub fn max_safe_velocity(friction_coefficient: f64, gravity: f64, radius: TurnRadius) -> Option<f64> {
    radius
        .finite()
        .map(|r| (friction_coefficient * gravity * r.abs()).sqrt())
}

/// Kinematic quantities for one steering angle and speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnKinematics {
    pub turn_radius: TurnRadius,
    pub angular_velocity: f64,
    pub centripetal_force: f64,
}

impl TurnKinematics {
    pub fn compute(params: &VehicleParams, steering_angle: f64, velocity: f64) -> Self {
        let turn_radius = turn_radius(steering_angle, params.wheelbase);
        TurnKinematics {
            turn_radius,
            angular_velocity: angular_velocity(velocity, turn_radius),
            centripetal_force: centripetal_force(params.mass, velocity, turn_radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_straight_steering_is_unbounded() {
        assert_eq!(turn_radius(0.0, 2.5), TurnRadius::Unbounded);
        assert_eq!(turn_radius(1e-10, 2.5), TurnRadius::Unbounded);
        assert_eq!(turn_radius(-1e-10, 2.5), TurnRadius::Unbounded);

        let kin = TurnKinematics::compute(&VehicleParams::default(), 1e-12, 10.0);
        assert!(kin.turn_radius.is_unbounded());
        assert_eq!(kin.angular_velocity, 0.0);
        assert_eq!(kin.centripetal_force, 0.0);
    }

    #[test]
    fn test_bicycle_geometry() {
        let radius = turn_radius(FRAC_PI_4, 2.5);
        assert_relative_eq!(radius.finite().unwrap(), 2.5, max_relative = 1e-12);

        assert_relative_eq!(angular_velocity(5.0, radius), 2.0, max_relative = 1e-12);
        assert_relative_eq!(centripetal_force(100.0, 5.0, radius), 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_sign_follows_steering() {
        let left = TurnKinematics::compute(&VehicleParams::default(), 0.2, 10.0);
        let right = TurnKinematics::compute(&VehicleParams::default(), -0.2, 10.0);
        assert!(left.angular_velocity > 0.0);
        assert!(right.angular_velocity < 0.0);
        assert_relative_eq!(left.centripetal_force, -right.centripetal_force, max_relative = 1e-12);
    }

    #[test]
    fn test_clamp_boundary_is_finite() {
        let params = VehicleParams::default();
        let kin = TurnKinematics::compute(&params, params.max_steering_angle, 30.0);
        assert!(kin.angular_velocity.is_finite());
        assert!(kin.centripetal_force.is_finite());
    }

    #[test]
    fn test_max_safe_velocity() {
        let radius = TurnRadius::Finite(-10.0);
        assert_relative_eq!(
            max_safe_velocity(0.5, 9.81, radius).unwrap(),
            (0.5f64 * 9.81 * 10.0).sqrt(),
            max_relative = 1e-12
        );
        assert_eq!(max_safe_velocity(0.5, 9.81, TurnRadius::Unbounded), None);
    }

    #[test]
    fn test_unbounded_serializes_as_null() {
        assert_eq!(serde_json::to_string(&TurnRadius::Unbounded).unwrap(), "null");
        assert_eq!(serde_json::to_string(&TurnRadius::Finite(2.5)).unwrap(), "2.5");
    }
}

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Positions beyond this magnitude (m) are treated as a diverged integration
pub const DIVERGENCE_POSITION_LIMIT: f64 = 1e9;

#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    pub dt: f64,
    pub t: f64,
}

/// Planar state of a single-track vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Simulation time (s)
    pub time: f64,
    /// Rear-axle position in the world frame (m)
    pub position: Vector2<f64>,
    /// Speed along the heading (m/s)
    pub velocity: f64,
    /// Heading from the world x axis (rad)
    #[serde(rename = "heading_deg", with = "crate::units::degrees")]
    pub heading: f64,
    /// Yaw rate (rad/s)
    #[serde(rename = "angular_velocity_deg_s", with = "crate::units::degrees")]
    pub angular_velocity: f64,
    /// Front wheel steering angle (rad)
    #[serde(rename = "steering_angle_deg", with = "crate::units::degrees")]
    pub steering_angle: f64,
}

impl VehicleState {
    /// State at session creation: origin, zero heading, wheels straight
    pub fn initial(velocity: f64) -> Self {
        VehicleState {
            time: 0.0,
            position: Vector2::zeros(),
            velocity,
            heading: 0.0,
            angular_velocity: 0.0,
            steering_angle: 0.0,
        }
    }

    pub fn position_x(&self) -> f64 {
        self.position.x
    }

    pub fn position_y(&self) -> f64 {
        self.position.y
    }

    /// True once the integration has produced non-finite or runaway values
    pub fn has_diverged(&self) -> bool {
        let finite = self.time.is_finite()
            && self.position.iter().all(|c| c.is_finite())
            && self.velocity.is_finite()
            && self.heading.is_finite()
            && self.angular_velocity.is_finite()
            && self.steering_angle.is_finite();
        !finite || self.position.norm() > DIVERGENCE_POSITION_LIMIT
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        VehicleState::initial(0.0)
    }
}

pub trait Model {
    fn reset(&mut self);
}

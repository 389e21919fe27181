use mechanics::{FrictionReport, TurnKinematics, TurnRadius};
use serde::{Deserialize, Serialize};

/// Per-step derived quantities. Recomputed every step, never stored on their
/// own outside a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// N = m·g (N)
    pub normal_force: f64,
    /// μ·N (N)
    pub max_friction_force: f64,
    /// m·v²/R, signed like the steering (N)
    pub centripetal_force_required: f64,
    /// Percent of available friction in use
    pub friction_utilization: f64,
    /// `null` on the wire while driving straight
    pub turn_radius: TurnRadius,
    pub can_turn: bool,
    /// Speed the current radius can hold without slipping; `None` when straight
    pub max_safe_velocity: Option<f64>,
    /// Target minus steering angle after the step (rad)
    #[serde(rename = "pid_error_deg", with = "simcore::units::degrees")]
    pub pid_error: f64,
    /// Controller integral accumulator (rad·s)
    pub pid_integral: f64,
    /// Steering rate commanded this step (rad/s)
    #[serde(rename = "control_signal_deg_s", with = "simcore::units::degrees")]
    pub control_signal: f64,
    /// Set when the state has gone non-finite or run away; the step still completed
    pub numerically_unstable: bool,
}

impl Diagnostics {
    pub(crate) fn from_parts(kinematics: &TurnKinematics, friction: &FrictionReport) -> Self {
        Diagnostics {
            normal_force: friction.normal_force,
            max_friction_force: friction.max_friction_force,
            centripetal_force_required: kinematics.centripetal_force,
            friction_utilization: friction.friction_utilization,
            turn_radius: kinematics.turn_radius,
            can_turn: friction.can_turn,
            max_safe_velocity: None,
            pid_error: 0.0,
            pid_integral: 0.0,
            control_signal: 0.0,
            numerically_unstable: false,
        }
    }
}

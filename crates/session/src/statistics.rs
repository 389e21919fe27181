//! Summary metrics over a session's retained history

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::history::History;

/// Steering counts as settled once it stays within this band of the target (rad)
pub const SETTLING_BAND: f64 = 0.5 * std::f64::consts::PI / 180.0;

/// Statistics are computed over the retained window only, so for long runs
/// they describe the most recent steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_time: f64,
    pub total_steps: usize,
    /// Straight-line distance from the origin to the final position (m)
    pub total_distance: f64,
    /// Distance travelled along the retained path (m)
    pub path_length: f64,
    pub final_position: Vector2<f64>,
    #[serde(rename = "final_heading_deg", with = "simcore::units::degrees")]
    pub final_heading: f64,
    #[serde(rename = "final_steering_angle_deg", with = "simcore::units::degrees")]
    pub final_steering_angle: f64,
    #[serde(rename = "mean_steering_error_deg", with = "simcore::units::degrees")]
    pub mean_steering_error: f64,
    #[serde(rename = "max_steering_error_deg", with = "simcore::units::degrees")]
    pub max_steering_error: f64,
    #[serde(rename = "rms_steering_error_deg", with = "simcore::units::degrees")]
    pub rms_steering_error: f64,
    /// Mean absolute error over the last 10% of the window
    #[serde(rename = "steady_state_error_deg", with = "simcore::units::degrees")]
    pub steady_state_error: f64,
    /// Time from which the steering stays inside the settling band; `None` if it never does
    pub settling_time: Option<f64>,
    /// Peak steering beyond the final target, as a percent of the target
    pub overshoot_percent: f64,
    pub max_friction_utilization: f64,
    /// Steps where the friction limit was exceeded
    pub slip_steps: usize,
}

impl SummaryStatistics {
    pub fn empty() -> Self {
        SummaryStatistics {
            total_time: 0.0,
            total_steps: 0,
            total_distance: 0.0,
            path_length: 0.0,
            final_position: Vector2::zeros(),
            final_heading: 0.0,
            final_steering_angle: 0.0,
            mean_steering_error: 0.0,
            max_steering_error: 0.0,
            rms_steering_error: 0.0,
            steady_state_error: 0.0,
            settling_time: None,
            overshoot_percent: 0.0,
            max_friction_utilization: 0.0,
            slip_steps: 0,
        }
    }

    pub fn from_history(history: &History) -> Self {
        let (Some(first), Some(last)) = (history.iter().next(), history.latest()) else {
            return Self::empty();
        };
        let n = history.len();

        let errors: Vec<f64> = history
            .iter()
            .map(|e| (e.target_angle - e.state.steering_angle).abs())
            .collect();
        let mean = errors.iter().sum::<f64>() / n as f64;
        let max = errors.iter().cloned().fold(0.0, f64::max);
        let rms = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();

        let tail_start = ((0.9 * n as f64) as usize).max(1).min(n - 1);
        let tail = &errors[tail_start..];
        let steady_state_error = tail.iter().sum::<f64>() / tail.len() as f64;

        let entries = history.to_vec();
        let path_length = entries
            .windows(2)
            .map(|w| (w[1].state.position - w[0].state.position).norm())
            .sum();

        let settling_time = match errors.iter().rposition(|e| *e > SETTLING_BAND) {
            None => Some(first.time),
            Some(i) if i + 1 < n => Some(entries[i + 1].time),
            Some(_) => None,
        };

        let target = last.target_angle;
        let overshoot_percent = if target.abs() > f64::EPSILON {
            let peak = entries
                .iter()
                .map(|e| e.state.steering_angle * target.signum())
                .fold(f64::MIN, f64::max);
            ((peak - target.abs()) / target.abs() * 100.0).max(0.0)
        } else {
            0.0
        };

        SummaryStatistics {
            total_time: last.time,
            total_steps: n,
            total_distance: last.state.position.norm(),
            path_length,
            final_position: last.state.position,
            final_heading: last.state.heading,
            final_steering_angle: last.state.steering_angle,
            mean_steering_error: mean,
            max_steering_error: max,
            rms_steering_error: rms,
            steady_state_error,
            settling_time,
            overshoot_percent,
            max_friction_utilization: entries
                .iter()
                .map(|e| e.diagnostics.friction_utilization)
                .fold(0.0, f64::max),
            slip_steps: entries.iter().filter(|e| !e.diagnostics.can_turn).count(),
        }
    }
}

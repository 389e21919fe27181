//! One simulated vehicle: configuration, live state, controller and history
//!
//! A step runs, in order: target clamp → PID rate → steering clamp →
//! kinematics → friction check → heading/position integration → time advance
//! → history append. All failure checks happen before the first mutation, so
//! a rejected call leaves the session exactly as it was.

use control::{PidController, PidState};
use log::warn;
use mechanics::{FrictionModel, TurnKinematics, max_safe_velocity};
use serde::{Deserialize, Serialize};
use simcore::{
    Integrator, Model, SimContext, SimError, SimResult, VehicleState, ensure_in_range, ensure_non_negative,
    ensure_positive,
};

use crate::Diagnostics;
use crate::config::{MAX_DURATION, ParamUpdate, SimulationConfig, SlipResponse, checked_target_angle};
use crate::history::{History, HistoryEntry};
use crate::statistics::SummaryStatistics;

/// State and diagnostics produced by one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: VehicleState,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct SimulationSession {
    config: SimulationConfig,
    state: VehicleState,
    pid: PidController,
    history: History,
    target_angle: f64,
    instability_reported: bool,
}

impl SimulationSession {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(SimulationSession {
            state: VehicleState::initial(config.initial_velocity),
            pid: PidController::new(config.pid_gains, config.pid_limits),
            history: History::default(),
            target_angle: 0.0,
            instability_reported: false,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn pid_state(&self) -> PidState {
        self.pid.state()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Last clamped target the session was driven toward (rad)
    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    /// Advance one time step toward `target_angle` (rad)
    pub fn step(&mut self, target_angle: f64) -> SimResult<StepOutcome> {
        let target = checked_target_angle(target_angle, &self.config.vehicle)?;
        Ok(self.advance(target))
    }

    /// Repeat `step` `round(duration / dt)` times with the same target and
    /// return every step's outcome, oldest first
    pub fn run(&mut self, duration: f64, target_angle: f64) -> SimResult<Vec<StepOutcome>> {
        let steps = self.steps_for(duration)?;
        let target = checked_target_angle(target_angle, &self.config.vehicle)?;
        Ok((0..steps).map(|_| self.advance(target)).collect())
    }

    /// Same steps as `run`, keeping only the final outcome
    pub fn run_to_end(&mut self, duration: f64, target_angle: f64) -> SimResult<StepOutcome> {
        let steps = self.steps_for(duration)?;
        let target = checked_target_angle(target_angle, &self.config.vehicle)?;
        let mut last = self.advance(target);
        for _ in 1..steps {
            last = self.advance(target);
        }
        Ok(last)
    }

    /// Number of steps `run` would take for `duration` seconds
    pub fn steps_for(&self, duration: f64) -> SimResult<usize> {
        ensure_positive("duration", duration)?;
        ensure_in_range("duration", duration, 0.0, MAX_DURATION)?;
        let steps = (duration / self.config.time_step).round();
        if steps < 1.0 {
            return Err(SimError::validation(
                "duration",
                format!("shorter than one time step ({} s)", self.config.time_step),
            ));
        }
        Ok(steps as usize)
    }

    /// Apply a partial update atomically
    pub fn update_params(&mut self, update: &ParamUpdate) -> SimResult<()> {
        let next = update.merge(&self.config)?;
        let velocity = update.checked_velocity()?;

        let gains_changed = next.pid_gains != self.config.pid_gains;
        self.pid.set_gains(next.pid_gains);
        if gains_changed && next.reset_pid_on_gain_change {
            self.pid.reset();
        }
        if let Some(velocity) = velocity {
            self.state.velocity = velocity;
        }
        self.config = next;
        Ok(())
    }

    /// Back to creation state: origin, zero heading and steering, empty
    /// history, cleared controller. `initial_velocity` overrides the
    /// configured starting speed for this reset only.
    pub fn reset(&mut self, initial_velocity: Option<f64>) -> SimResult<()> {
        let velocity = match initial_velocity {
            Some(v) => ensure_non_negative("initial_velocity", v)?,
            None => self.config.initial_velocity,
        };
        self.state = VehicleState::initial(velocity);
        self.pid.reset();
        self.history.reset();
        self.target_angle = 0.0;
        self.instability_reported = false;
        Ok(())
    }

    pub fn statistics(&self) -> SummaryStatistics {
        SummaryStatistics::from_history(&self.history)
    }

    fn advance(&mut self, target: f64) -> StepOutcome {
        let dt = self.config.time_step;
        let params = self.config.vehicle;
        let velocity = self.state.velocity;

        let rate = self.pid.update(target, self.state.steering_angle, dt);
        let steering = params.clamp_steering(self.state.steering_angle + rate * dt);

        let kinematics = TurnKinematics::compute(&params, steering, velocity);
        let friction = FrictionModel::from_params(&params);
        let report = friction.evaluate(kinematics.centripetal_force);

        let angular_velocity = match self.config.slip_response {
            SlipResponse::FrictionLimited if !report.can_turn => friction.limited_yaw_rate(velocity, steering),
            _ => kinematics.angular_velocity,
        };

        self.state.steering_angle = steering;
        self.state.angular_velocity = angular_velocity;
        let ctx = SimContext { dt, t: self.state.time };
        self.config.integrator.step(&ctx, &mut self.state);
        self.state.time += dt;
        self.target_angle = target;

        let unstable = self.state.has_diverged();
        if unstable && !self.instability_reported {
            warn!(
                "integration diverged at t = {} s (dt = {} s); results past this point are not meaningful",
                self.state.time, dt
            );
            self.instability_reported = true;
        }

        let diagnostics = Diagnostics {
            max_safe_velocity: max_safe_velocity(
                params.friction_coefficient,
                params.gravity,
                kinematics.turn_radius,
            ),
            pid_error: target - steering,
            pid_integral: self.pid.integral(),
            control_signal: rate,
            numerically_unstable: unstable,
            ..Diagnostics::from_parts(&kinematics, &report)
        };

        self.history.push(HistoryEntry {
            time: self.state.time,
            state: self.state,
            diagnostics,
            target_angle: target,
        });

        StepOutcome {
            state: self.state,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GainsUpdate;
    use crate::history::HISTORY_CAPACITY;
    use approx::assert_abs_diff_eq;
    use control::{PidGains, PidPreset};
    use mechanics::TurnRadius;
    use simcore::{GravityPreset, IntegratorKind, VehicleParams};

    fn moon_config() -> SimulationConfig {
        SimulationConfig::new(VehicleParams::new(500.0, GravityPreset::Moon.acceleration(), 0.7))
            .with_pid_gains(PidPreset::Balanced)
            .with_initial_velocity(10.0)
            .with_time_step(0.1)
    }

    #[test]
    fn test_friction_identities_hold_every_step() {
        let config = moon_config();
        let mut session = SimulationSession::new(config.clone()).unwrap();
        for _ in 0..50 {
            let outcome = session.step(15f64.to_radians()).unwrap();
            let d = outcome.diagnostics;
            assert_eq!(d.normal_force, config.vehicle.mass * config.vehicle.gravity);
            assert_eq!(d.max_friction_force, config.vehicle.friction_coefficient * d.normal_force);
        }
    }

    #[test]
    fn test_time_advances_one_step_at_a_time() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        for n in 1..=37 {
            let outcome = session.step(0.1).unwrap();
            assert_abs_diff_eq!(outcome.state.time, n as f64 * 0.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pid_converges_on_the_moon() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        let trace = session.run(10.0, 15f64.to_radians()).unwrap();

        assert_eq!(trace.len(), 100);
        let steering_deg = session.state().steering_angle.to_degrees();
        assert!((steering_deg - 15.0).abs() < 1.0, "steering settled at {steering_deg} deg");
    }

    #[test]
    fn test_straight_target_keeps_radius_unbounded() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        let outcome = session.step(0.0).unwrap();
        assert_eq!(outcome.diagnostics.turn_radius, TurnRadius::Unbounded);
        assert_eq!(outcome.state.angular_velocity, 0.0);
        assert_eq!(outcome.diagnostics.friction_utilization, 0.0);
        assert!(outcome.diagnostics.can_turn);
        assert_eq!(outcome.diagnostics.max_safe_velocity, None);
    }

    #[test]
    fn test_slip_reported_on_sharp_moon_turn() {
        // 10 m/s at 15° needs ~5.4 kN of grip; the Moon offers ~567 N
        let mut session = SimulationSession::new(moon_config()).unwrap();
        let trace = session.run(10.0, 15f64.to_radians()).unwrap();
        let last = trace.last().unwrap().diagnostics;
        assert!(!last.can_turn);
        assert!(last.friction_utilization > 100.0);
    }

    #[test]
    fn test_friction_limited_response_caps_yaw_rate() {
        let config = moon_config().with_slip_response(SlipResponse::FrictionLimited);
        let mut session = SimulationSession::new(config).unwrap();
        let outcome = session.run(5.0, 15f64.to_radians()).unwrap().pop().unwrap();
        assert!(!outcome.diagnostics.can_turn);
        assert_abs_diff_eq!(outcome.state.angular_velocity, 0.7 * 1.62 / 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_steering_never_leaves_range() {
        let config = moon_config().with_pid_gains(PidPreset::Aggressive);
        let limit = config.vehicle.max_steering_angle;
        let mut session = SimulationSession::new(config).unwrap();
        for outcome in session.run(20.0, 80f64.to_radians()).unwrap() {
            assert!(outcome.state.steering_angle.abs() <= limit);
        }
    }

    #[test]
    fn test_target_out_of_range_rejected_without_side_effects() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        session.step(0.1).unwrap();
        let before = *session.state();

        assert!(matches!(
            session.step(120f64.to_radians()),
            Err(SimError::Validation { field: "target_angle", .. })
        ));
        assert!(session.run(0.0, 0.1).is_err());
        assert!(session.run(MAX_DURATION + 1.0, 0.1).is_err());
        assert!(session.run(0.01, 0.1).is_err());
        assert_eq!(*session.state(), before);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        session.run(3.0, 0.2).unwrap();

        session.reset(None).unwrap();
        let first = (*session.state(), session.pid_state(), session.history().len());
        session.reset(None).unwrap();
        let second = (*session.state(), session.pid_state(), session.history().len());

        assert_eq!(first, second);
        assert_eq!(first.0, VehicleState::initial(10.0));
        assert_eq!(first.1, PidState::default());
        assert_eq!(first.2, 0);
    }

    #[test]
    fn test_reset_velocity_override_applies_once() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        session.reset(Some(4.0)).unwrap();
        assert_eq!(session.state().velocity, 4.0);
        session.reset(None).unwrap();
        assert_eq!(session.state().velocity, 10.0);
        assert!(session.reset(Some(-1.0)).is_err());
    }

    #[test]
    fn test_update_params_is_all_or_nothing() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        let before = session.config().clone();

        let bad = ParamUpdate::default().with_mass(800.0).with_gravity(-1.0);
        assert!(session.update_params(&bad).is_err());
        assert_eq!(*session.config(), before);

        let bad_velocity = ParamUpdate::default().with_mass(800.0).with_velocity(-3.0);
        assert!(session.update_params(&bad_velocity).is_err());
        assert_eq!(*session.config(), before);
        assert_eq!(session.state().velocity, 10.0);

        let good = ParamUpdate::default().with_mass(800.0).with_velocity(12.0);
        session.update_params(&good).unwrap();
        assert_eq!(session.config().vehicle.mass, 800.0);
        assert_eq!(session.state().velocity, 12.0);
        assert_eq!(session.config().initial_velocity, 10.0);
    }

    #[test]
    fn test_gain_change_keeps_pid_memory_by_default() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        session.run(1.0, 0.2).unwrap();
        let memory = session.pid_state();

        let update = ParamUpdate::default().with_pid_gains(PidGains::new(1.0, 0.2, 0.3));
        session.update_params(&update).unwrap();
        assert_eq!(session.pid_state(), memory);
        assert_eq!(session.config().pid_gains, PidGains::new(1.0, 0.2, 0.3));
    }

    #[test]
    fn test_gain_change_can_reset_pid_memory() {
        let config = moon_config().with_pid_reset_on_gain_change(true);
        let mut session = SimulationSession::new(config).unwrap();
        session.run(1.0, 0.2).unwrap();

        let update = ParamUpdate::default().with_pid_gains(GainsUpdate {
            kp: Some(0.9),
            ..Default::default()
        });
        session.update_params(&update).unwrap();
        assert_eq!(session.pid_state(), PidState::default());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = SimulationSession::new(moon_config()).unwrap();
        session.run(25.0, 0.1).unwrap();
        assert_eq!(session.history().len(), HISTORY_CAPACITY);
        let latest = session.history().latest().unwrap();
        assert_abs_diff_eq!(latest.time, 25.0, epsilon = 1e-9);
        assert_eq!(latest.state, *session.state());
    }

    #[test]
    fn test_large_time_step_flags_divergence_but_completes() {
        let mut session = SimulationSession::new(moon_config().with_time_step(1.0)).unwrap();
        session.update_params(&ParamUpdate::default().with_velocity(1e12)).unwrap();
        let outcome = session.step(0.0).unwrap();
        assert!(outcome.diagnostics.numerically_unstable);
        assert_abs_diff_eq!(outcome.state.time, 1.0);
    }

    #[test]
    fn test_run_to_end_matches_last_step_of_run() {
        let mut traced = SimulationSession::new(moon_config()).unwrap();
        let mut silent = SimulationSession::new(moon_config()).unwrap();

        let last = traced.run(7.3, 15f64.to_radians()).unwrap().pop().unwrap();
        let end = silent.run_to_end(7.3, 15f64.to_radians()).unwrap();

        assert_eq!(end, last);
        assert_eq!(silent.state(), traced.state());
        assert_eq!(silent.history().len(), traced.history().len());
        assert!(silent.run_to_end(0.01, 0.1).is_err());
        assert_eq!(silent.state(), traced.state());
    }

    #[test]
    fn test_midpoint_integrator_selectable() {
        let config = moon_config().with_integrator(IntegratorKind::Midpoint);
        let mut euler = SimulationSession::new(moon_config()).unwrap();
        let mut midpoint = SimulationSession::new(config).unwrap();
        let a = euler.run(2.0, 0.2).unwrap().pop().unwrap();
        let b = midpoint.run(2.0, 0.2).unwrap().pop().unwrap();
        assert_eq!(a.state.heading, b.state.heading);
        assert_ne!(a.state.position, b.state.position);
    }
}

use serde::{Deserialize, Serialize};

use crate::units::wrap_angle;
use crate::{SimContext, VehicleState};

/// Time steps above this (s) can make the heading/position update diverge.
/// Not enforced; callers that need the guarantee pick a smaller step.
pub const STABILITY_TIME_STEP: f64 = 0.1;

/// A generic integration strategy trait.
pub trait Integrator {
    /// Advances heading and position by one timestep.
    fn step(&self, ctx: &SimContext, state: &mut VehicleState);
}

/// Semi-implicit Euler integrator (Symplectic Euler).
/// The yaw rate is refreshed by the kinematics before this runs; the heading
/// is advanced first and the NEW heading drives the position update.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiImplicitEuler;

impl Integrator for SemiImplicitEuler {
    fn step(&self, ctx: &SimContext, state: &mut VehicleState) {
        let dt = ctx.dt;

        state.heading = wrap_angle(state.heading + state.angular_velocity * dt);

        state.position.x += state.velocity * state.heading.cos() * dt;
        state.position.y += state.velocity * state.heading.sin() * dt;
    }
}

/// Midpoint-heading integrator.
/// Advances position along the heading halfway through the step, which follows
/// a constant-yaw-rate arc more closely than either Euler variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Midpoint;

impl Integrator for Midpoint {
    fn step(&self, ctx: &SimContext, state: &mut VehicleState) {
        let dt = ctx.dt;
        let mid_heading = state.heading + 0.5 * state.angular_velocity * dt;

        state.position.x += state.velocity * mid_heading.cos() * dt;
        state.position.y += state.velocity * mid_heading.sin() * dt;

        state.heading = wrap_angle(state.heading + state.angular_velocity * dt);
    }
}

/// Integrator selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    #[default]
    SemiImplicitEuler,
    Midpoint,
}

impl Integrator for IntegratorKind {
    fn step(&self, ctx: &SimContext, state: &mut VehicleState) {
        match self {
            IntegratorKind::SemiImplicitEuler => SemiImplicitEuler.step(ctx, state),
            IntegratorKind::Midpoint => Midpoint.step(ctx, state),
        }
    }
}

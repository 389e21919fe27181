//! Steering control
//!
//! This crate provides:
//! - A PID controller with anti-windup and output saturation
//! - Tuning presets

pub mod pid;
pub mod presets;

pub use pid::*;
pub use presets::*;

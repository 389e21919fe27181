//! Core types shared by the steering simulation crates
//!
//! This crate provides:
//! - Vehicle state and parameter records
//! - The error taxonomy and validation helpers
//! - Gravity presets
//! - Heading/position integrators

pub mod error;
pub mod integrators;
pub mod presets;
pub mod traits;
pub mod units;
pub mod vehicle;

pub use error::*;
pub use integrators::*;
pub use presets::*;
pub use traits::*;
pub use vehicle::*;

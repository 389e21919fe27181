//! Error taxonomy shared by the session layer
//!
//! Kinematics, friction and the controller are total over finite input and
//! never return these. Only session and registry operations do, and every
//! variant is a recoverable per-request failure.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Out-of-range or non-finite configuration field, or a malformed request value
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// Unknown session identifier
    #[error("simulation {id} not found")]
    NotFound { id: String },
    /// Registry already holds its maximum number of sessions
    #[error("maximum number of simulations ({limit}) reached, delete a simulation first")]
    Capacity { limit: usize },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(id: impl ToString) -> Self {
        SimError::NotFound { id: id.to_string() }
    }
}

pub fn ensure_finite(field: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::validation(field, format!("must be a finite number, got {value}")))
    }
}

/// Finite and strictly greater than zero
pub fn ensure_positive(field: &'static str, value: f64) -> SimResult<f64> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::validation(field, format!("must be positive, got {value}")))
    }
}

pub fn ensure_non_negative(field: &'static str, value: f64) -> SimResult<f64> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::validation(field, format!("must be non-negative, got {value}")))
    }
}

/// Inclusive on both ends
pub fn ensure_in_range(field: &'static str, value: f64, min: f64, max: f64) -> SimResult<f64> {
    ensure_finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SimError::validation(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ))
    }
}

//! Error types for structured error handling.
//!
//! This module provides:
//! - `ConfigError`: Errors from validating solver and line-search settings

use thiserror::Error;

/// Invalid solver or line-search configuration.
///
/// Raised by the `validate()` methods of configuration types before a
/// minimisation starts, so that a bad setting never surfaces as a
/// silent numerical failure half-way through a run.
///
/// # Variants
/// - `ZeroCount`: An iteration budget or window size is zero
/// - `NotPositive`: A scalar that must be strictly positive is not
/// - `Negative`: A scalar that must be non-negative is negative
/// - `OutOfRange`: A scalar lies outside its open interval
/// - `Inconsistent`: Two settings contradict each other
///
/// # Examples
/// ```
/// use descent_core::types::ConfigError;
///
/// let err = ConfigError::ZeroCount { name: "max_iterations" };
/// assert_eq!(format!("{}", err), "max_iterations must be > 0");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count (iterations, history window) is zero.
    #[error("{name} must be > 0")]
    ZeroCount {
        /// Name of the setting
        name: &'static str,
    },

    /// A scalar setting must be strictly positive.
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Name of the setting
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A scalar setting must be non-negative.
    #[error("{name} must be non-negative, got {value}")]
    Negative {
        /// Name of the setting
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A scalar setting lies outside the open interval `(min, max)`.
    #[error("{name} must lie in ({min}, {max}), got {value}")]
    OutOfRange {
        /// Name of the setting
        name: &'static str,
        /// Offending value
        value: f64,
        /// Lower bound (exclusive)
        min: f64,
        /// Upper bound (exclusive)
        max: f64,
    },

    /// Two settings contradict each other.
    #[error("Inconsistent settings: {0}")]
    Inconsistent(String),
}

impl ConfigError {
    /// Create a zero-count error.
    pub fn zero_count(name: &'static str) -> Self {
        Self::ZeroCount { name }
    }

    /// Create a not-positive error.
    pub fn not_positive(name: &'static str, value: f64) -> Self {
        Self::NotPositive { name, value }
    }

    /// Create a negative-value error.
    pub fn negative(name: &'static str, value: f64) -> Self {
        Self::Negative { name, value }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(name: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            name,
            value,
            min,
            max,
        }
    }

    /// Create an inconsistent-settings error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent(message.into())
    }

    /// Name of the offending setting, when the error concerns a single one.
    pub fn setting(&self) -> Option<&'static str> {
        match self {
            Self::ZeroCount { name }
            | Self::NotPositive { name, .. }
            | Self::Negative { name, .. }
            | Self::OutOfRange { name, .. } => Some(*name),
            Self::Inconsistent(_) => None,
        }
    }
}

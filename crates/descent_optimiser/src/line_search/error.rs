//! Line-search error types.

use super::LineSearchMethod;
use descent_core::types::ConfigError;
use thiserror::Error;

/// Errors that can occur while selecting a step length.
///
/// # Variants
///
/// - `Exhausted`: The trial budget ran out before the stopping condition held
/// - `Unsupported`: The selected method has no implementation
/// - `Config`: The line-search settings are invalid
///
/// # Examples
///
/// ```
/// use descent_optimiser::line_search::LineSearchError;
///
/// let err = LineSearchError::exhausted(1000);
/// assert!(err.is_exhausted());
/// assert!(format!("{}", err).contains("1000"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineSearchError {
    /// No acceptable step was found within the trial budget.
    #[error("Line search exhausted after {iterations} trials without an acceptable step")]
    Exhausted {
        /// Number of trial steps evaluated
        iterations: usize,
    },

    /// The selected method is declared but not implemented.
    #[error("Line search method {method:?} is not implemented")]
    Unsupported {
        /// The method that was requested
        method: LineSearchMethod,
    },

    /// Invalid line-search settings.
    #[error("Invalid line search configuration: {0}")]
    Config(#[from] ConfigError),
}

impl LineSearchError {
    /// Create an exhausted-budget error.
    pub fn exhausted(iterations: usize) -> Self {
        Self::Exhausted { iterations }
    }

    /// Create an unsupported-method error.
    pub fn unsupported(method: LineSearchMethod) -> Self {
        Self::Unsupported { method }
    }

    /// Check if the trial budget was exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Check if the method is unsupported.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

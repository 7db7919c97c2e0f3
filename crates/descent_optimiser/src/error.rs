//! Minimiser error types.

use crate::line_search::LineSearchError;
use descent_core::types::ConfigError;
use thiserror::Error;

/// Errors returned by [`Minimizer::minimize`](crate::minimizers::Minimizer::minimize).
///
/// Running out of iterations is not an error; it is reported through
/// [`Termination::MaxIterations`](crate::minimizers::Termination::MaxIterations).
///
/// # Variants
///
/// - `LineSearch`: A line search failed in a way the minimiser treats as fatal
/// - `Config`: The minimiser settings are invalid
/// - `NonFiniteInput`: The starting point contains NaN or infinity
/// - `NonFiniteIterate`: An update produced a non-finite iterate (rolled back)
///
/// # Examples
///
/// ```
/// use descent_optimiser::MinimizerError;
///
/// let err = MinimizerError::non_finite_iterate(7);
/// assert!(err.is_non_finite());
/// assert!(format!("{}", err).contains("7"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MinimizerError {
    /// Wrapped line-search failure.
    #[error("Line search failed: {0}")]
    LineSearch(#[from] LineSearchError),

    /// Invalid minimiser settings.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The starting point is not finite.
    #[error("Starting point contains non-finite components")]
    NonFiniteInput,

    /// A step produced a non-finite iterate; `x` holds the last finite one.
    #[error("Non-finite iterate produced at iteration {iteration}")]
    NonFiniteIterate {
        /// Zero-based iteration that produced the bad step
        iteration: usize,
    },
}

impl MinimizerError {
    /// Create a non-finite iterate error.
    pub fn non_finite_iterate(iteration: usize) -> Self {
        Self::NonFiniteIterate { iteration }
    }

    /// Check if this is a line-search failure.
    pub fn is_line_search(&self) -> bool {
        matches!(self, Self::LineSearch(_))
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this concerns a non-finite input or iterate.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Self::NonFiniteInput | Self::NonFiniteIterate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Conversion Tests
    // ========================================

    #[test]
    fn test_from_line_search_error() {
        let err: MinimizerError = LineSearchError::exhausted(1000).into();
        assert!(err.is_line_search());
        assert!(!err.is_config());
        assert!(format!("{}", err).contains("1000"));
    }

    #[test]
    fn test_from_config_error() {
        let err: MinimizerError = ConfigError::zero_count("history_size").into();
        assert!(err.is_config());
        assert!(format!("{}", err).contains("history_size"));
    }

    // ========================================
    // Non-Finite Tests
    // ========================================

    #[test]
    fn test_non_finite_variants() {
        assert!(MinimizerError::NonFiniteInput.is_non_finite());
        assert!(MinimizerError::non_finite_iterate(3).is_non_finite());
        assert!(!MinimizerError::NonFiniteInput.is_line_search());
    }

    #[test]
    fn test_non_finite_iterate_display() {
        let display = format!("{}", MinimizerError::non_finite_iterate(12));
        assert!(display.contains("Non-finite"));
        assert!(display.contains("12"));
    }
}

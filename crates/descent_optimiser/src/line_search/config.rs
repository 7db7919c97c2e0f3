//! Line-search configuration types.

use descent_core::types::ConfigError;

/// Step-length selection method.
///
/// # Variants
///
/// - `None`: Take the initial step unchanged
/// - `MoreThuente`: Reserved; selecting it yields [`LineSearchError::Unsupported`]
/// - `Backtracking`: Armijo backtracking with a fixed decay factor (default)
/// - `BacktrackingCurvature`: Armijo backtracking with cubic interpolation
/// - `WeakWolfeBisection`: Bracketing bisection on the weak Wolfe conditions
///
/// [`LineSearchError::Unsupported`]: super::LineSearchError::Unsupported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineSearchMethod {
    /// Fixed step: `|alpha_init|`.
    None,

    /// Moré–Thuente interval search (not implemented).
    MoreThuente,

    /// Armijo backtracking, `α ← τα` on failure.
    #[default]
    Backtracking,

    /// Armijo backtracking with quadratic/cubic interpolation of the trial
    /// values.
    BacktrackingCurvature,

    /// Bisection on a bracket until both weak Wolfe conditions hold.
    WeakWolfeBisection,
}

impl LineSearchMethod {
    /// All methods, in declaration order.
    pub const ALL: [LineSearchMethod; 5] = [
        LineSearchMethod::None,
        LineSearchMethod::MoreThuente,
        LineSearchMethod::Backtracking,
        LineSearchMethod::BacktrackingCurvature,
        LineSearchMethod::WeakWolfeBisection,
    ];

    /// Whether a working strategy exists for this method.
    pub fn is_implemented(self) -> bool {
        !matches!(self, Self::MoreThuente)
    }
}

/// Settings shared by every line-search strategy.
///
/// Scalar settings are stored as `f64` and converted to the working scalar
/// type when a search runs.
///
/// # Examples
///
/// ```
/// use descent_optimiser::line_search::LineSearchConfig;
///
/// let config = LineSearchConfig::default()
///     .with_sufficient_decrease(1e-3)
///     .with_max_iterations(200);
/// assert!(config.validate().is_ok());
///
/// let bad = LineSearchConfig::default().with_curvature(1e-5);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchConfig {
    /// Armijo constant `c1` in `(0, 1)`.
    pub sufficient_decrease: f64,

    /// Wolfe curvature constant `c2` in `(c1, 1)`.
    pub curvature: f64,

    /// Shrink factor `τ` in `(0, 1)` for plain backtracking.
    pub decay: f64,

    /// Maximum number of trial steps per search.
    pub max_iterations: usize,

    /// Bisection stops once successive trials differ by less than this.
    pub min_change: f64,
}

impl Default for LineSearchConfig {
    /// Default values:
    /// - `sufficient_decrease`: 1e-4
    /// - `curvature`: 0.9
    /// - `decay`: 0.7
    /// - `max_iterations`: 1000
    /// - `min_change`: 1e-10
    fn default() -> Self {
        Self {
            sufficient_decrease: 1e-4,
            curvature: 0.9,
            decay: 0.7,
            max_iterations: 1000,
            min_change: 1e-10,
        }
    }
}

impl LineSearchConfig {
    /// Create a configuration with the given Armijo and curvature constants.
    pub fn new(sufficient_decrease: f64, curvature: f64) -> Self {
        Self {
            sufficient_decrease,
            curvature,
            ..Default::default()
        }
    }

    /// Set the Armijo constant `c1`.
    pub fn with_sufficient_decrease(mut self, c1: f64) -> Self {
        self.sufficient_decrease = c1;
        self
    }

    /// Set the curvature constant `c2`.
    pub fn with_curvature(mut self, c2: f64) -> Self {
        self.curvature = c2;
        self
    }

    /// Set the backtracking shrink factor.
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Set the trial budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the bisection stagnation threshold.
    pub fn with_min_change(mut self, min_change: f64) -> Self {
        self.min_change = min_change;
        self
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// The first offending setting as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sufficient_decrease > 0.0 && self.sufficient_decrease < 1.0) {
            return Err(ConfigError::out_of_range(
                "sufficient_decrease",
                self.sufficient_decrease,
                0.0,
                1.0,
            ));
        }
        if !(self.curvature > 0.0 && self.curvature < 1.0) {
            return Err(ConfigError::out_of_range("curvature", self.curvature, 0.0, 1.0));
        }
        if self.curvature <= self.sufficient_decrease {
            return Err(ConfigError::inconsistent(format!(
                "curvature ({}) must exceed sufficient_decrease ({})",
                self.curvature, self.sufficient_decrease
            )));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::out_of_range("decay", self.decay, 0.0, 1.0));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::zero_count("max_iterations"));
        }
        if !(self.min_change >= 0.0) {
            return Err(ConfigError::negative("min_change", self.min_change));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Method Tests
    // ========================================

    #[test]
    fn test_default_method_is_backtracking() {
        assert_eq!(LineSearchMethod::default(), LineSearchMethod::Backtracking);
    }

    #[test]
    fn test_only_more_thuente_unimplemented() {
        for method in LineSearchMethod::ALL {
            assert_eq!(method.is_implemented(), method != LineSearchMethod::MoreThuente);
        }
    }

    // ========================================
    // Config Tests
    // ========================================

    #[test]
    fn test_default_config() {
        let config = LineSearchConfig::default();
        assert_eq!(config.sufficient_decrease, 1e-4);
        assert_eq!(config.curvature, 0.9);
        assert_eq!(config.decay, 0.7);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.min_change, 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_config() {
        let config = LineSearchConfig::new(0.3, 0.6);
        assert_eq!(config.sufficient_decrease, 0.3);
        assert_eq!(config.curvature, 0.6);
        assert_eq!(config.max_iterations, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_constants() {
        let cases = [
            LineSearchConfig::default().with_sufficient_decrease(0.0),
            LineSearchConfig::default().with_sufficient_decrease(1.0),
            LineSearchConfig::default().with_curvature(1.0),
            LineSearchConfig::default().with_decay(0.0),
            LineSearchConfig::default().with_decay(f64::NAN),
            LineSearchConfig::default().with_max_iterations(0),
            LineSearchConfig::default().with_min_change(-1.0),
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_validate_requires_curvature_above_armijo() {
        let err = LineSearchConfig::new(0.5, 0.4).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn test_validate_names_setting() {
        let err = LineSearchConfig::default().with_decay(1.5).validate().unwrap_err();
        assert_eq!(err.setting(), Some("decay"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_document_uses_defaults() {
        let config: LineSearchConfig = serde_json::from_str(r#"{"decay": 0.5}"#).unwrap();
        assert_eq!(config.decay, 0.5);
        assert_eq!(config.max_iterations, 1000);
    }
}

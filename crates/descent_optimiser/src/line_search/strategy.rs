//! Configured line-search selection.

use super::{
    Backtracking, CubicBacktracking, FixedStep, LineSearch, LineSearchConfig, LineSearchError, LineSearchMethod,
    WolfeBisection,
};
use descent_core::traits::Problem;
use descent_core::types::ConfigError;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};

/// A [`LineSearchMethod`] together with its [`LineSearchConfig`].
///
/// This is the line-search setting carried by every minimiser
/// configuration. Dispatch is a `match` on the method, so the minimiser
/// loop stays monomorphic.
///
/// # Examples
///
/// ```
/// use descent_core::problems::Rosenbrock;
/// use descent_optimiser::line_search::{LineSearch, LineSearchMethod, LineSearchStrategy};
/// use nalgebra::Vector2;
///
/// let x = Vector2::new(0.0, 0.0);
/// let p = Vector2::new(2.0, 0.0);
///
/// let wolfe = LineSearchStrategy::weak_wolfe_bisection();
/// assert!(wolfe.search(&x, &p, &Rosenbrock::new(), 1.0).is_ok());
///
/// let more_thuente = LineSearchStrategy::new(LineSearchMethod::MoreThuente, Default::default());
/// assert!(more_thuente.search(&x, &p, &Rosenbrock::new(), 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchStrategy {
    /// Which step-length rule to apply.
    pub method: LineSearchMethod,
    /// Constants and trial budget.
    pub config: LineSearchConfig,
}

impl LineSearchStrategy {
    /// Create a strategy from a method and its settings.
    pub fn new(method: LineSearchMethod, config: LineSearchConfig) -> Self {
        Self { method, config }
    }

    /// Fixed step with default settings.
    pub fn fixed() -> Self {
        Self::new(LineSearchMethod::None, LineSearchConfig::default())
    }

    /// Armijo backtracking with default settings.
    pub fn backtracking() -> Self {
        Self::new(LineSearchMethod::Backtracking, LineSearchConfig::default())
    }

    /// Interpolating backtracking with default settings.
    pub fn cubic_backtracking() -> Self {
        Self::new(LineSearchMethod::BacktrackingCurvature, LineSearchConfig::default())
    }

    /// Weak Wolfe bisection with default settings.
    pub fn weak_wolfe_bisection() -> Self {
        Self::new(LineSearchMethod::WeakWolfeBisection, LineSearchConfig::default())
    }

    /// Replace the settings.
    pub fn with_config(mut self, config: LineSearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the settings. An unimplemented method is not a configuration
    /// error; it surfaces when searching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }
}

impl<T: RealField + Copy> LineSearch<T> for LineSearchStrategy {
    fn search<D, P>(
        &self,
        x: &OVector<T, D>,
        direction: &OVector<T, D>,
        problem: &P,
        alpha_init: T,
    ) -> Result<T, LineSearchError>
    where
        D: Dim,
        P: Problem<T, D> + ?Sized,
        DefaultAllocator: Allocator<D> + Allocator<D, D>,
    {
        self.validate()?;

        match self.method {
            LineSearchMethod::None => FixedStep.search(x, direction, problem, alpha_init),
            LineSearchMethod::MoreThuente => Err(LineSearchError::unsupported(self.method)),
            LineSearchMethod::Backtracking => Backtracking::new(self.config).search(x, direction, problem, alpha_init),
            LineSearchMethod::BacktrackingCurvature => {
                CubicBacktracking::new(self.config).search(x, direction, problem, alpha_init)
            }
            LineSearchMethod::WeakWolfeBisection => {
                WolfeBisection::new(self.config).search(x, direction, problem, alpha_init)
            }
        }
    }
}

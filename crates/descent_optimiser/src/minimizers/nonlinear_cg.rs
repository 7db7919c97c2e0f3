//! Nonlinear conjugate gradient.
//!
//! Directions follow `p ← −∇f + β p` with `β` from [`ConjugateGradientUpdate`]
//! and steps come from a line search started at `α = 1`. Without a restart
//! interval the only reset to steepest descent is the descent check.

use super::{check_start, take_step, MinimizeResult, Minimizer, Termination};
use crate::line_search::{LineSearch, LineSearchError, LineSearchStrategy};
use crate::MinimizerError;
use descent_core::traits::Problem;
use descent_core::types::{to_f64, ConfigError};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, DimMin, OVector, RealField};
use tracing::{debug, warn};

/// Formula for the conjugacy coefficient `β`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConjugateGradientUpdate {
    /// `β = gᵀg / g₋ᵀg₋`.
    #[default]
    FletcherReeves,

    /// `β = max(0, gᵀ(g − g₋) / g₋ᵀg₋)`.
    PolakRibierePlus,
}

impl ConjugateGradientUpdate {
    /// `β` from the current and previous gradients.
    pub fn beta<T, D>(self, grad: &OVector<T, D>, grad_prev: &OVector<T, D>) -> T
    where
        T: RealField + Copy,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        let denominator = grad_prev.norm_squared();
        match self {
            Self::FletcherReeves => grad.norm_squared() / denominator,
            Self::PolakRibierePlus => {
                let numerator = grad.dot(grad) - grad.dot(grad_prev);
                (numerator / denominator).max(T::zero())
            }
        }
    }
}

/// Configuration for [`ConjugateGradientMinimizer`].
///
/// # Examples
///
/// ```
/// use descent_optimiser::minimizers::{ConjugateGradientConfig, ConjugateGradientUpdate};
///
/// let config = ConjugateGradientConfig::default()
///     .with_update(ConjugateGradientUpdate::PolakRibierePlus)
///     .with_restart_interval(Some(10));
/// assert!(config.validate().is_ok());
/// assert!(config.with_restart_interval(Some(0)).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConjugateGradientConfig {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,

    /// Stop when `‖∇f‖∞` falls to this value.
    pub tolerance: f64,

    /// Conjugacy formula.
    pub update: ConjugateGradientUpdate,

    /// Reset to steepest descent every this many iterations.
    pub restart_interval: Option<usize>,

    /// Step-length rule, started from a unit step.
    pub line_search: LineSearchStrategy,
}

impl Default for ConjugateGradientConfig {
    /// Default values:
    /// - `max_iterations`: 100
    /// - `tolerance`: 0
    /// - `update`: Fletcher–Reeves
    /// - `restart_interval`: none
    /// - `line_search`: Armijo backtracking
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 0.0,
            update: ConjugateGradientUpdate::default(),
            restart_interval: None,
            line_search: LineSearchStrategy::backtracking(),
        }
    }
}

impl ConjugateGradientConfig {
    /// Create a configuration with the given budget and tolerance.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Default::default()
        }
    }

    /// Relaxed tolerance, modest budget.
    pub fn fast() -> Self {
        Self::new(100, 1e-6)
    }

    /// Tight tolerance, Polak–Ribière+ and a large budget.
    pub fn high_precision() -> Self {
        Self {
            update: ConjugateGradientUpdate::PolakRibierePlus,
            ..Self::new(5000, 1e-12)
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the conjugacy formula.
    pub fn with_update(mut self, update: ConjugateGradientUpdate) -> Self {
        self.update = update;
        self
    }

    /// Set or clear the restart interval.
    pub fn with_restart_interval(mut self, restart_interval: Option<usize>) -> Self {
        self.restart_interval = restart_interval;
        self
    }

    /// Set the step-length rule.
    pub fn with_line_search(mut self, line_search: LineSearchStrategy) -> Self {
        self.line_search = line_search;
        self
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::zero_count("max_iterations"));
        }
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::negative("tolerance", self.tolerance));
        }
        if self.restart_interval == Some(0) {
            return Err(ConfigError::zero_count("restart_interval"));
        }
        self.line_search.validate()
    }
}

/// Nonlinear conjugate gradient minimiser.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradientMinimizer {
    config: ConjugateGradientConfig,
}

impl ConjugateGradientMinimizer {
    /// Create a minimiser with the given settings.
    pub fn new(config: ConjugateGradientConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &ConjugateGradientConfig {
        &self.config
    }

    fn restarts_at(&self, iteration: usize) -> bool {
        self.config
            .restart_interval
            .is_some_and(|interval| iteration % interval == 0)
    }
}

/// `p ← −g + βp`, replaced by `−g` unless `pᵀg < 0`. Returns whether the
/// fallback was taken.
fn conjugate<T, D>(direction: &mut OVector<T, D>, grad: &OVector<T, D>, beta: T) -> bool
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    direction.axpy(-T::one(), grad, beta);
    if direction.dot(grad) < T::zero() {
        false
    } else {
        direction.copy_from(grad);
        direction.neg_mut();
        true
    }
}

impl<T: RealField + Copy> Minimizer<T> for ConjugateGradientMinimizer {
    fn minimize<D, P>(&mut self, problem: &P, x: &mut OVector<T, D>) -> Result<MinimizeResult<T>, MinimizerError>
    where
        D: Dim + DimMin<D, Output = D>,
        P: Problem<T, D> + ?Sized,
        DefaultAllocator: Allocator<D> + Allocator<D, D>,
    {
        self.config.validate()?;
        check_start(x)?;

        let tolerance = nalgebra::convert::<f64, T>(self.config.tolerance);
        let (rows, cols) = x.shape_generic();

        let mut grad = OVector::<T, D>::zeros_generic(rows, cols);
        let mut grad_prev = OVector::<T, D>::zeros_generic(rows, cols);
        let mut x_prev = x.clone();

        let mut value = problem.gradient(x, &mut grad);
        let mut direction = -&grad;
        let mut iterations = 0;

        let termination = loop {
            if grad.amax() <= tolerance {
                break Termination::GradientTolerance;
            }
            if iterations == self.config.max_iterations {
                break Termination::MaxIterations;
            }

            let alpha = match self.config.line_search.search(x, &direction, problem, T::one()) {
                Ok(alpha) => alpha,
                Err(LineSearchError::Exhausted { iterations: trials }) => {
                    warn!(iteration = iterations, trials, "conjugate gradient line search exhausted");
                    break Termination::LineSearchExhausted;
                }
                Err(err) => return Err(err.into()),
            };

            take_step(x, &mut x_prev, &direction, alpha, iterations)?;
            iterations += 1;

            grad_prev.copy_from(&grad);
            value = problem.gradient(x, &mut grad);
            debug!(
                iteration = iterations,
                value = to_f64(value),
                grad_norm = to_f64(grad.amax()),
                step = to_f64(alpha),
                "conjugate gradient iteration"
            );

            if problem.converged(&x_prev, x, &grad) {
                break Termination::ProblemConverged;
            }

            if self.restarts_at(iterations) {
                direction.copy_from(&grad);
                direction.neg_mut();
                continue;
            }

            let beta = self.config.update.beta(&grad, &grad_prev);
            if conjugate(&mut direction, &grad, beta) {
                warn!(iteration = iterations, beta = to_f64(beta), "conjugate direction not descent, restarting");
            }
        };

        Ok(MinimizeResult {
            iterations,
            termination,
            value,
        })
    }
}

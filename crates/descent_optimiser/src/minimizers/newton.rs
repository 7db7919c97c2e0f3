//! Newton's method with line-search globalisation.
//!
//! Each iteration solves `H Δx = −∇f` and steps along `Δx` with a line
//! search started from `α = 1`. Small fixed-size systems (`N ≤ 4`) are
//! solved through the closed-form inverse; anything larger or dynamically
//! sized goes through a Householder QR factorisation.

use super::{check_start, take_step, MinimizeResult, Minimizer, Termination};
use crate::line_search::{LineSearch, LineSearchStrategy};
use crate::MinimizerError;
use descent_core::traits::Problem;
use descent_core::types::{is_finite, to_f64, ConfigError};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, DimMin, OMatrix, OVector, RealField};
use tracing::{debug, warn};

/// Largest fixed dimension solved by explicit inversion.
const MAX_INVERSE_DIM: usize = 4;

/// Configuration for [`NewtonMinimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewtonConfig {
    /// Maximum number of Newton steps.
    pub max_iterations: usize,

    /// Stop when `‖∇f‖∞` falls to this value.
    pub tolerance: f64,

    /// Globalising line search, started from a unit step.
    pub line_search: LineSearchStrategy,
}

impl Default for NewtonConfig {
    /// Default values:
    /// - `max_iterations`: 20
    /// - `tolerance`: 0
    /// - `line_search`: Armijo backtracking
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 0.0,
            line_search: LineSearchStrategy::backtracking(),
        }
    }
}

impl NewtonConfig {
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
        Self::new(20, 1e-6)
    }

    /// Tight tolerance, generous budget.
    pub fn high_precision() -> Self {
        Self::new(200, 1e-12)
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
        self.line_search.validate()
    }
}

/// Newton minimiser.
///
/// # Example
///
/// ```
/// use descent_core::problems::QuadraticProblem;
/// use descent_optimiser::minimizers::{Minimizer, NewtonConfig, NewtonMinimizer};
/// use nalgebra::{Matrix2, Vector2};
///
/// let problem = QuadraticProblem::new(Matrix2::new(4.0, 1.0, 1.0, 3.0), Vector2::new(1.0, 2.0)).unwrap();
/// let mut x = Vector2::zeros();
///
/// let result = NewtonMinimizer::new(NewtonConfig::new(1, 0.0)).minimize(&problem, &mut x).unwrap();
/// assert_eq!(result.iterations, 1);
/// assert!(problem.residual_norm(&x) < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewtonMinimizer {
    config: NewtonConfig,
}

impl NewtonMinimizer {
    /// Create a minimiser with the given settings.
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }
}

/// Solves `H Δx = −g`. `None` if the system is singular or the solution is
/// not a finite descent direction.
fn newton_step<T, D>(hess: &OMatrix<T, D, D>, grad: &OVector<T, D>) -> Option<OVector<T, D>>
where
    T: RealField + Copy,
    D: Dim + DimMin<D, Output = D>,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    let rhs = -grad;
    let step = match D::try_to_usize() {
        Some(n) if n <= MAX_INVERSE_DIM => hess.clone().try_inverse().map(|inv| inv * rhs),
        _ => hess.clone().qr().solve(&rhs),
    }?;

    (is_finite(&step) && step.dot(grad) < T::zero()).then_some(step)
}

impl<T: RealField + Copy> Minimizer<T> for NewtonMinimizer {
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
        let mut hess = OMatrix::<T, D, D>::zeros_generic(rows, rows);
        let mut x_prev = x.clone();

        let mut value = problem.gradient(x, &mut grad);
        let mut iterations = 0;

        let termination = loop {
            if grad.amax() <= tolerance {
                break Termination::GradientTolerance;
            }
            if iterations == self.config.max_iterations {
                break Termination::MaxIterations;
            }

            problem.hessian(x, &mut hess);
            let direction = newton_step(&hess, &grad).unwrap_or_else(|| {
                warn!(iteration = iterations, "Newton system singular or not descent, using steepest descent");
                -&grad
            });

            let alpha = self.config.line_search.search(x, &direction, problem, T::one())?;
            take_step(x, &mut x_prev, &direction, alpha, iterations)?;
            iterations += 1;

            value = problem.gradient(x, &mut grad);
            debug!(
                iteration = iterations,
                value = to_f64(value),
                grad_norm = to_f64(grad.amax()),
                step = to_f64(alpha),
                "Newton iteration"
            );

            if problem.converged(&x_prev, x, &grad) {
                break Termination::ProblemConverged;
            }
        };

        Ok(MinimizeResult {
            iterations,
            termination,
            value,
        })
    }
}

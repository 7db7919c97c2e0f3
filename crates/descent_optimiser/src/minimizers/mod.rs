//! Gradient-based minimisers.
//!
//! Three algorithms share the [`Minimizer`] interface:
//! - [`LbfgsMinimizer`]: limited-memory BFGS with two-loop recursion
//! - [`NewtonMinimizer`]: Newton steps on the exact (or differenced) Hessian
//! - [`ConjugateGradientMinimizer`]: nonlinear conjugate gradient
//!
//! Every minimiser mutates `x` in place and reports how it stopped in a
//! [`MinimizeResult`]. Common policies:
//! - a non-finite starting point is rejected before any evaluation
//! - a step that would leave `x` non-finite is rolled back and reported
//! - a direction that is not a descent direction is replaced by steepest
//!   descent
//! - [`Problem::converged`] is consulted after every accepted step in
//!   addition to the gradient tolerance
//!
//! [`Problem::converged`]: descent_core::traits::Problem::converged

mod lbfgs;
mod newton;
mod nonlinear_cg;

pub use lbfgs::{CurvatureHistory, LbfgsConfig, LbfgsMinimizer};
pub use newton::{NewtonConfig, NewtonMinimizer};
pub use nonlinear_cg::{ConjugateGradientConfig, ConjugateGradientMinimizer, ConjugateGradientUpdate};

use crate::MinimizerError;
use descent_core::traits::Problem;
use descent_core::types::is_finite;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, DimMin, OVector, RealField};

/// Why a minimisation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Gradient infinity norm fell to the tolerance.
    GradientTolerance,
    /// Step length (`α‖q‖²` for L-BFGS) fell to the tolerance.
    StepTolerance,
    /// [`Problem::converged`](descent_core::traits::Problem::converged) returned `true`.
    ProblemConverged,
    /// The iteration budget was used up.
    MaxIterations,
    /// L-BFGS met `yᵀy ≤ 0` and stopped rather than corrupt its history.
    CurvatureBreakdown,
    /// The line search found no acceptable step; `x` is the last accepted iterate.
    LineSearchExhausted,
}

impl Termination {
    /// Whether this is a convergence criterion rather than a budget or a
    /// breakdown.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Self::GradientTolerance | Self::StepTolerance | Self::ProblemConverged
        )
    }
}

/// Outcome of a minimisation.
///
/// The minimiser itself is `x`, updated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeResult<T> {
    /// Outer iterations (accepted steps) performed.
    pub iterations: usize,
    /// Why the loop stopped.
    pub termination: Termination,
    /// Objective value at the final `x`.
    pub value: T,
}

impl<T> MinimizeResult<T> {
    /// Whether a convergence criterion was met.
    pub fn is_converged(&self) -> bool {
        self.termination.is_converged()
    }
}

/// A minimiser for problems of any dimension.
///
/// `minimize` can be called repeatedly on the same instance; only L-BFGS
/// carries state between calls, and only when warm start is enabled.
///
/// # Example
///
/// ```
/// use descent_core::problems::Rosenbrock;
/// use descent_optimiser::minimizers::{LbfgsConfig, LbfgsMinimizer, Minimizer};
/// use nalgebra::Vector2;
///
/// let mut minimizer = LbfgsMinimizer::new(LbfgsConfig::default().with_max_iterations(1000));
/// let mut x = Vector2::new(-1.2, 1.0);
///
/// let result = minimizer.minimize(&Rosenbrock::new(), &mut x).unwrap();
/// assert!((x - Vector2::new(1.0, 1.0)).norm() < 1e-4);
/// assert!(result.iterations <= 1000);
/// ```
pub trait Minimizer<T: RealField + Copy> {
    /// Minimise `problem` starting from `x`, leaving the result in `x`.
    ///
    /// # Errors
    ///
    /// - [`MinimizerError::Config`] for invalid settings
    /// - [`MinimizerError::NonFiniteInput`] if `x` is not finite on entry
    /// - [`MinimizerError::NonFiniteIterate`] if a step left the finite range
    /// - [`MinimizerError::LineSearch`] where the algorithm treats a line
    ///   search failure as fatal
    fn minimize<D, P>(&mut self, problem: &P, x: &mut OVector<T, D>) -> Result<MinimizeResult<T>, MinimizerError>
    where
        D: Dim + DimMin<D, Output = D>,
        P: Problem<T, D> + ?Sized,
        DefaultAllocator: Allocator<D> + Allocator<D, D>;
}

/// Rejects a non-finite starting point.
pub(crate) fn check_start<T, D>(x: &OVector<T, D>) -> Result<(), MinimizerError>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    if is_finite(x) {
        Ok(())
    } else {
        Err(MinimizerError::NonFiniteInput)
    }
}

/// `x ← x + α·direction`, saving the old iterate in `x_prev`.
///
/// A non-finite result is undone before the error is returned.
pub(crate) fn take_step<T, D>(
    x: &mut OVector<T, D>,
    x_prev: &mut OVector<T, D>,
    direction: &OVector<T, D>,
    alpha: T,
    iteration: usize,
) -> Result<(), MinimizerError>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    x_prev.copy_from(x);
    x.axpy(alpha, direction, T::one());
    if is_finite(x) {
        Ok(())
    } else {
        x.copy_from(x_prev);
        Err(MinimizerError::non_finite_iterate(iteration))
    }
}

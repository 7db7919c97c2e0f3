//! Step-length selection along a descent direction.
//!
//! Every strategy implements [`LineSearch`]: given a point `x`, a direction
//! `p` and a [`Problem`], return a step `α > 0` such that `x + αp` is an
//! acceptable next iterate.
//!
//! ## Strategies
//!
//! | Method | Type | Acceptance |
//! |---|---|---|
//! | `None` | [`FixedStep`] | always, `α = |α₀|` |
//! | `Backtracking` | [`Backtracking`] | Armijo, `α ← τα` |
//! | `BacktrackingCurvature` | [`CubicBacktracking`] | Armijo, interpolated shrink |
//! | `WeakWolfeBisection` | [`WolfeBisection`] | Armijo and weak curvature |
//! | `MoreThuente` | none | [`LineSearchError::Unsupported`] |
//!
//! [`LineSearchStrategy`] couples a [`LineSearchMethod`] with a
//! [`LineSearchConfig`] and is what the minimisers hold.
//!
//! ## Failure
//!
//! Running out of trials is reported as [`LineSearchError::Exhausted`],
//! never as a degenerate step. A successful search always returns a finite
//! positive step. Trial points whose objective value is not finite count as
//! a sufficient-decrease failure. The backtracking searches give up early
//! once `x + αp` rounds back to `x`, since no smaller step can move.
//!
//! [`Problem`]: descent_core::traits::Problem

mod backtracking;
mod config;
mod cubic;
mod error;
mod fixed;
mod strategy;
mod wolfe_bisection;

pub use backtracking::Backtracking;
pub use config::{LineSearchConfig, LineSearchMethod};
pub use cubic::CubicBacktracking;
pub use error::LineSearchError;
pub use fixed::FixedStep;
pub use strategy::LineSearchStrategy;
pub use wolfe_bisection::WolfeBisection;

use descent_core::traits::Problem;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};

/// A step-length selection rule.
///
/// Implementations must be pure with respect to their own state: two calls
/// with the same `(x, direction, alpha_init)` on a deterministic problem
/// return the same step.
pub trait LineSearch<T: RealField + Copy> {
    /// Find a step length along `direction` from `x`.
    ///
    /// `alpha_init` is the first trial step; its sign is ignored and a zero
    /// or non-finite value is replaced by one.
    ///
    /// # Errors
    ///
    /// [`LineSearchError::Exhausted`] when no acceptable step is found
    /// within the trial budget.
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
        DefaultAllocator: Allocator<D> + Allocator<D, D>;
}

/// First trial step: `|alpha_init|`, or one if that is zero or not finite.
pub(crate) fn initial_step<T: RealField + Copy>(alpha_init: T) -> T {
    let alpha = alpha_init.abs();
    if alpha.is_finite() && alpha > T::zero() {
        alpha
    } else {
        T::one()
    }
}

/// Writes `x + alpha * direction` into `trial`.
pub(crate) fn step_to<T, D>(trial: &mut OVector<T, D>, x: &OVector<T, D>, direction: &OVector<T, D>, alpha: T)
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    trial.copy_from(x);
    trial.axpy(alpha, direction, T::one());
}

/// Whether `trial`, built from `x` by [`step_to`], failed to move.
pub(crate) fn is_null_step<T, D>(trial: &OVector<T, D>, x: &OVector<T, D>) -> bool
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    trial == x
}

/// Objective value and directional derivative `∇f(x)ᵀp` at the start point.
pub(crate) fn start_point<T, D, P>(x: &OVector<T, D>, direction: &OVector<T, D>, problem: &P) -> (T, T)
where
    T: RealField + Copy,
    D: Dim,
    P: Problem<T, D> + ?Sized,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    let (rows, cols) = x.shape_generic();
    let mut grad = OVector::<T, D>::zeros_generic(rows, cols);
    let value = problem.gradient(x, &mut grad);
    (value, grad.dot(direction))
}

/// Armijo test `f(x + αp) ≤ f(x) + c1·α·slope`; `false` for NaN values.
pub(crate) fn sufficient_decrease<T: RealField + Copy>(f_trial: T, f0: T, c1: T, alpha: T, slope: T) -> bool {
    f_trial <= f0 + c1 * alpha * slope
}

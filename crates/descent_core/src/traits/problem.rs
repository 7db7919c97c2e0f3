//! Objective-function interface.

use crate::math::{finite_gradient, finite_hessian, FiniteDiffAccuracy};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OMatrix, OVector, RealField};

/// A differentiable scalar objective `f: R^n -> R`.
///
/// Only [`value`](Problem::value) is required. Gradient and Hessian fall
/// back to central finite differences; override them whenever analytic
/// derivatives are available.
///
/// All methods take `&self`: evaluation must not change any state a
/// minimiser could observe, so the same problem can be evaluated at
/// arbitrary trial points in any order.
///
/// # Type Parameters
///
/// * `T` - Scalar type (e.g. `f64`)
/// * `D` - Dimension, either `Const<N>` or `Dyn`
///
/// # Example
///
/// ```
/// use descent_core::traits::Problem;
/// use nalgebra::{U2, Vector2};
///
/// /// f(x) = (x0 - 1)² + 10 (x1 + 2)²
/// struct Bowl;
///
/// impl Problem<f64, U2> for Bowl {
///     fn value(&self, x: &Vector2<f64>) -> f64 {
///         (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2)
///     }
/// }
///
/// let x = Vector2::new(0.0, 0.0);
/// let mut grad = Vector2::zeros();
/// let f = Bowl.gradient(&x, &mut grad);
///
/// assert_eq!(f, 41.0);
/// assert!((grad[0] + 2.0).abs() < 1e-6);
/// assert!((grad[1] - 40.0).abs() < 1e-6);
/// ```
pub trait Problem<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    /// Objective value at `x`.
    fn value(&self, x: &OVector<T, D>) -> T;

    /// Gradient at `x`, written into `grad`; returns the objective value.
    ///
    /// Returning the value alongside the gradient lets implementations
    /// share work between the two. The default differences
    /// [`value`](Problem::value) with the stencil chosen by
    /// [`finite_diff_accuracy`](Problem::finite_diff_accuracy).
    fn gradient(&self, x: &OVector<T, D>, grad: &mut OVector<T, D>) -> T {
        finite_gradient(x, grad, self.finite_diff_accuracy(), |trial| {
            self.value(trial)
        });
        self.value(x)
    }

    /// Hessian at `x`, written into `hess`.
    ///
    /// The default differences [`gradient`](Problem::gradient), so an
    /// analytic gradient gives a noticeably better Hessian than a fully
    /// numerical one.
    fn hessian(&self, x: &OVector<T, D>, hess: &mut OMatrix<T, D, D>) {
        finite_hessian(x, hess, |trial, grad| {
            self.gradient(trial, grad);
        });
    }

    /// Problem-specific convergence test, consulted after every accepted
    /// step in addition to the minimiser's own tolerance.
    ///
    /// `x_prev` and `x_new` are the iterates before and after the step,
    /// `grad` the gradient at `x_new`. The default never declares
    /// convergence.
    fn converged(&self, x_prev: &OVector<T, D>, x_new: &OVector<T, D>, grad: &OVector<T, D>) -> bool {
        let _ = (x_prev, x_new, grad);
        false
    }

    /// Stencil used by the default [`gradient`](Problem::gradient).
    fn finite_diff_accuracy(&self) -> FiniteDiffAccuracy {
        FiniteDiffAccuracy::default()
    }
}

//! Two-dimensional Rosenbrock function.

use crate::math::FiniteDiffAccuracy;
use crate::traits::Problem;
use nalgebra::{Matrix2, RealField, Vector2, U2};

/// `f(x, y) = (1 − x)² + 100 (y − x²)²`
///
/// The global minimum is `f(1, 1) = 0`, at the end of a long curved
/// valley that defeats naive steepest descent.
///
/// Two flavours are provided:
/// - [`Rosenbrock::new`]: analytic gradient and Hessian
/// - [`Rosenbrock::finite_difference`]: value only, derivatives from the
///   [`Problem`] finite-difference defaults
///
/// # Example
///
/// ```
/// use descent_core::problems::Rosenbrock;
/// use descent_core::traits::Problem;
/// use nalgebra::Vector2;
///
/// let exact = Rosenbrock::new();
/// let numeric = Rosenbrock::finite_difference();
/// let x = Vector2::new(-1.2_f64, 1.0);
///
/// let (mut g1, mut g2) = (Vector2::zeros(), Vector2::zeros());
/// exact.gradient(&x, &mut g1);
/// numeric.gradient(&x, &mut g2);
/// assert!((g1 - g2).amax() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rosenbrock {
    analytic: bool,
    accuracy: FiniteDiffAccuracy,
}

impl Default for Rosenbrock {
    fn default() -> Self {
        Self::new()
    }
}

impl Rosenbrock {
    /// Rosenbrock with analytic derivatives.
    pub fn new() -> Self {
        Self {
            analytic: true,
            accuracy: FiniteDiffAccuracy::Second,
        }
    }

    /// Rosenbrock relying on finite-difference derivatives.
    pub fn finite_difference() -> Self {
        Self {
            analytic: false,
            accuracy: FiniteDiffAccuracy::Second,
        }
    }

    /// Set the stencil used when derivatives are differenced.
    pub fn with_accuracy(mut self, accuracy: FiniteDiffAccuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Whether gradient and Hessian are analytic.
    pub fn is_analytic(&self) -> bool {
        self.analytic
    }

    /// The global minimiser `(1, 1)`.
    pub fn minimizer<T: RealField + Copy>() -> Vector2<T> {
        Vector2::new(T::one(), T::one())
    }
}

impl<T: RealField + Copy> Problem<T, U2> for Rosenbrock {
    fn value(&self, x: &Vector2<T>) -> T {
        let hundred = nalgebra::convert::<f64, T>(100.0);
        let a = T::one() - x[0];
        let b = x[1] - x[0] * x[0];
        a * a + hundred * b * b
    }

    fn gradient(&self, x: &Vector2<T>, grad: &mut Vector2<T>) -> T {
        if !self.analytic {
            crate::math::finite_gradient(x, grad, self.accuracy, |v| self.value(v));
            return self.value(x);
        }

        let two = nalgebra::convert::<f64, T>(2.0);
        let b = x[1] - x[0] * x[0];
        grad[0] = -two * (T::one() - x[0]) - nalgebra::convert::<f64, T>(400.0) * x[0] * b;
        grad[1] = nalgebra::convert::<f64, T>(200.0) * b;
        self.value(x)
    }

    fn hessian(&self, x: &Vector2<T>, hess: &mut Matrix2<T>) {
        if !self.analytic {
            crate::math::finite_hessian(x, hess, |v, g| {
                self.gradient(v, g);
            });
            return;
        }

        let four_hundred = nalgebra::convert::<f64, T>(400.0);
        let three = nalgebra::convert::<f64, T>(3.0);
        let cross = -four_hundred * x[0];
        hess[(0, 0)] = nalgebra::convert::<f64, T>(2.0) - four_hundred * (x[1] - three * x[0] * x[0]);
        hess[(0, 1)] = cross;
        hess[(1, 0)] = cross;
        hess[(1, 1)] = nalgebra::convert::<f64, T>(200.0);
    }

    fn finite_diff_accuracy(&self) -> FiniteDiffAccuracy {
        self.accuracy
    }
}

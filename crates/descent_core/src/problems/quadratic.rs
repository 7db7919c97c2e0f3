//! Strictly convex quadratic objective.

use crate::traits::Problem;
use crate::types::ConfigError;
use nalgebra::allocator::Allocator;
use nalgebra::{DMatrix, DVector, DefaultAllocator, Dim, Dyn, OMatrix, OVector, RealField};

/// `f(x) = ½ xᵀA x − bᵀx` with `A` symmetric positive definite.
///
/// The gradient is the residual `Ax − b` and the Hessian is `A`, so the
/// unique minimiser solves `Ax = b`. [`residual_norm`](Self::residual_norm)
/// measures distance from it in the natural way.
///
/// # Example
///
/// ```
/// use descent_core::problems::QuadraticProblem;
/// use descent_core::traits::Problem;
/// use nalgebra::{Matrix2, Vector2};
///
/// let a = Matrix2::new(4.0, 1.0, 1.0, 3.0);
/// let b = Vector2::new(1.0, 2.0);
/// let problem = QuadraticProblem::new(a, b).unwrap();
///
/// let x = problem.solution().unwrap();
/// assert!(problem.residual_norm(&x) < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticProblem<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    matrix: OMatrix<T, D, D>,
    rhs: OVector<T, D>,
}

impl<T, D> QuadraticProblem<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    /// Build from `A` and `b`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Inconsistent` if `A` is not square or its size does
    /// not match `b`. Positive definiteness is not checked here; see
    /// [`solution`](Self::solution).
    pub fn new(matrix: OMatrix<T, D, D>, rhs: OVector<T, D>) -> Result<Self, ConfigError> {
        if matrix.nrows() != matrix.ncols() || matrix.nrows() != rhs.len() {
            return Err(ConfigError::inconsistent(format!(
                "matrix is {}x{} but right-hand side has length {}",
                matrix.nrows(),
                matrix.ncols(),
                rhs.len()
            )));
        }
        Ok(Self { matrix, rhs })
    }

    /// Number of unknowns.
    pub fn dim(&self) -> usize {
        self.rhs.len()
    }

    /// The matrix `A`.
    pub fn matrix(&self) -> &OMatrix<T, D, D> {
        &self.matrix
    }

    /// The right-hand side `b`.
    pub fn rhs(&self) -> &OVector<T, D> {
        &self.rhs
    }

    /// `Ax − b` at `x`.
    pub fn residual(&self, x: &OVector<T, D>) -> OVector<T, D> {
        &self.matrix * x - &self.rhs
    }

    /// `‖Ax − b‖₂` at `x`.
    pub fn residual_norm(&self, x: &OVector<T, D>) -> T {
        self.residual(x).norm()
    }

    /// The exact minimiser via Cholesky, or `None` if `A` is not
    /// positive definite.
    pub fn solution(&self) -> Option<OVector<T, D>> {
        self.matrix
            .clone()
            .cholesky()
            .map(|chol| chol.solve(&self.rhs))
    }
}

impl<T: RealField + Copy> QuadraticProblem<T, Dyn> {
    /// Deterministic, well-conditioned instance of size `n`.
    ///
    /// `A = RᵀR / n + I` with `R[i][j] = sin(1 + 1.7i + 0.9j + 0.3ij)` and
    /// `b[i] = cos(0.5 + 0.8i)`. The identity shift keeps every eigenvalue
    /// of `A` at or above one.
    pub fn well_conditioned(n: usize) -> Self {
        let r = DMatrix::<f64>::from_fn(n, n, |i, j| {
            let (i, j) = (i as f64, j as f64);
            (1.0 + 1.7 * i + 0.9 * j + 0.3 * i * j).sin()
        });
        let scale = 1.0 / n.max(1) as f64;
        let a = r.transpose() * &r * scale + DMatrix::<f64>::identity(n, n);
        let b = DVector::<f64>::from_fn(n, |i, _| (0.5 + 0.8 * i as f64).cos());

        Self {
            matrix: a.map(nalgebra::convert::<f64, T>),
            rhs: b.map(nalgebra::convert::<f64, T>),
        }
    }
}

impl<T, D> Problem<T, D> for QuadraticProblem<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    fn value(&self, x: &OVector<T, D>) -> T {
        let half = nalgebra::convert::<f64, T>(0.5);
        half * x.dot(&(&self.matrix * x)) - self.rhs.dot(x)
    }

    fn gradient(&self, x: &OVector<T, D>, grad: &mut OVector<T, D>) -> T {
        grad.copy_from(&self.residual(x));
        self.value(x)
    }

    fn hessian(&self, _x: &OVector<T, D>, hess: &mut OMatrix<T, D, D>) {
        hess.copy_from(&self.matrix);
    }
}

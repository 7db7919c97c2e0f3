//! Central finite-difference gradients and Hessians.
//!
//! # Gradient stencils
//!
//! For each coordinate `d` the derivative is approximated by
//!
//! ```text
//! ∂f/∂x_d ≈ Σ_k c_k f(x + o_k h e_d) / (D h)
//! ```
//!
//! with the offset/coefficient tables below. All stencils are centred at `x`.
//!
//! | accuracy | offsets `o_k`        | coefficients `c_k`                      | `D` |
//! |----------|----------------------|-----------------------------------------|-----|
//! | 2nd      | ±1                   | 1, -1                                   | 2   |
//! | 4th      | -2..2 (no 0)         | 1, -8, 8, -1                            | 12  |
//! | 6th      | -3..3 (no 0)         | -1, 9, -45, 45, -9, 1                   | 60  |
//! | 8th      | -4..4 (no 0)         | 3, -32, 168, -672, 672, -168, 32, -3    | 840 |
//!
//! # Hessian
//!
//! The Hessian is the central difference of the gradient, one row per
//! coordinate, followed by symmetrisation. This costs `2 * DIM` gradient
//! evaluations, i.e. `O(DIM²)` objective evaluations when the gradient is
//! itself differenced.

use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OMatrix, OVector, RealField};

/// Base step for gradient stencils (double precision).
const GRADIENT_STEP: f64 = 2.2204e-6;

/// Hessian step as a multiple of machine epsilon.
const HESSIAN_STEP_SCALE: f64 = 1e7;

/// Order of accuracy of the central gradient stencil.
///
/// Higher orders cancel more truncation error at the price of more
/// objective evaluations per coordinate (2, 4, 6 or 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FiniteDiffAccuracy {
    /// 2-point stencil, O(h²).
    #[default]
    Second,
    /// 4-point stencil, O(h⁴).
    Fourth,
    /// 6-point stencil, O(h⁶).
    Sixth,
    /// 8-point stencil, O(h⁸).
    Eighth,
}

impl FiniteDiffAccuracy {
    /// All accuracy orders, lowest first.
    pub const ALL: [FiniteDiffAccuracy; 4] = [
        FiniteDiffAccuracy::Second,
        FiniteDiffAccuracy::Fourth,
        FiniteDiffAccuracy::Sixth,
        FiniteDiffAccuracy::Eighth,
    ];

    /// Stencil offsets in units of the step `h`.
    pub fn offsets(self) -> &'static [f64] {
        match self {
            Self::Second => &[1.0, -1.0],
            Self::Fourth => &[-2.0, -1.0, 1.0, 2.0],
            Self::Sixth => &[-3.0, -2.0, -1.0, 1.0, 2.0, 3.0],
            Self::Eighth => &[-4.0, -3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0],
        }
    }

    /// Stencil weights matching [`offsets`](Self::offsets).
    pub fn coefficients(self) -> &'static [f64] {
        match self {
            Self::Second => &[1.0, -1.0],
            Self::Fourth => &[1.0, -8.0, 8.0, -1.0],
            Self::Sixth => &[-1.0, 9.0, -45.0, 45.0, -9.0, 1.0],
            Self::Eighth => &[3.0, -32.0, 168.0, -672.0, 672.0, -168.0, 32.0, -3.0],
        }
    }

    /// Common denominator of the weights.
    pub fn denominator(self) -> f64 {
        match self {
            Self::Second => 2.0,
            Self::Fourth => 12.0,
            Self::Sixth => 60.0,
            Self::Eighth => 840.0,
        }
    }

    /// Number of objective evaluations per coordinate.
    pub fn evaluations_per_coordinate(self) -> usize {
        self.offsets().len()
    }
}

/// Step used by the gradient stencils for scalar type `T`.
///
/// `2.2204e-6` in double precision; never below `sqrt(eps)` so that single
/// precision keeps a usable step.
pub fn gradient_step<T: RealField + Copy>() -> T {
    let eps = T::default_epsilon();
    nalgebra::convert::<f64, T>(GRADIENT_STEP).max(eps.sqrt())
}

/// Step used by [`finite_hessian`] for scalar type `T`.
///
/// `machine_epsilon * 1e7`, capped at `cbrt(eps)`.
pub fn hessian_step<T: RealField + Copy>() -> T {
    let eps = T::default_epsilon();
    (eps * nalgebra::convert::<f64, T>(HESSIAN_STEP_SCALE)).min(eps.cbrt())
}

/// Central finite-difference gradient of `f` at `x`.
///
/// Writes the result into `grad`, which must have the same length as `x`.
/// `x` is never modified; trial points are built on a scratch copy.
///
/// # Examples
///
/// ```
/// use descent_core::math::{finite_gradient, FiniteDiffAccuracy};
/// use nalgebra::Vector2;
///
/// let f = |x: &Vector2<f64>| x[0] * x[0] + 3.0 * x[1];
/// let x = Vector2::new(2.0, -1.0);
/// let mut grad = Vector2::zeros();
///
/// finite_gradient(&x, &mut grad, FiniteDiffAccuracy::Fourth, f);
/// assert!((grad[0] - 4.0).abs() < 1e-8);
/// assert!((grad[1] - 3.0).abs() < 1e-8);
/// ```
pub fn finite_gradient<T, D, F>(
    x: &OVector<T, D>,
    grad: &mut OVector<T, D>,
    accuracy: FiniteDiffAccuracy,
    mut f: F,
) where
    T: RealField + Copy,
    D: Dim,
    F: FnMut(&OVector<T, D>) -> T,
    DefaultAllocator: Allocator<D>,
{
    debug_assert_eq!(x.len(), grad.len(), "gradient buffer has wrong length");

    let h = gradient_step::<T>();
    let denom = nalgebra::convert::<f64, T>(accuracy.denominator()) * h;
    let offsets = accuracy.offsets();
    let coefficients = accuracy.coefficients();

    let mut trial = x.clone();
    for d in 0..x.len() {
        let origin = trial[d];
        let mut acc = T::zero();
        for (&offset, &coeff) in offsets.iter().zip(coefficients) {
            trial[d] = origin + nalgebra::convert::<f64, T>(offset) * h;
            acc += nalgebra::convert::<f64, T>(coeff) * f(&trial);
        }
        trial[d] = origin;
        grad[d] = acc / denom;
    }
}

/// Central finite-difference Hessian from a gradient oracle.
///
/// `gradient(x, g)` must write the gradient at `x` into `g`. Row `i` of
/// the result is `(∇f(x + h e_i) - ∇f(x - h e_i)) / 2h`; the matrix is
/// symmetrised afterwards.
///
/// # Examples
///
/// ```
/// use descent_core::math::finite_hessian;
/// use nalgebra::{Matrix2, Vector2};
///
/// // f(x) = x0² x1 has Hessian [[2 x1, 2 x0], [2 x0, 0]]
/// let grad = |x: &Vector2<f64>, g: &mut Vector2<f64>| {
///     g[0] = 2.0 * x[0] * x[1];
///     g[1] = x[0] * x[0];
/// };
/// let x = Vector2::new(1.0, 2.0);
/// let mut hess = Matrix2::zeros();
///
/// finite_hessian(&x, &mut hess, grad);
/// assert!((hess[(0, 0)] - 4.0).abs() < 1e-5);
/// assert!((hess[(0, 1)] - 2.0).abs() < 1e-5);
/// assert!(hess[(1, 1)].abs() < 1e-5);
/// ```
pub fn finite_hessian<T, D, G>(x: &OVector<T, D>, hess: &mut OMatrix<T, D, D>, mut gradient: G)
where
    T: RealField + Copy,
    D: Dim,
    G: FnMut(&OVector<T, D>, &mut OVector<T, D>),
    DefaultAllocator: Allocator<D> + Allocator<D, D>,
{
    let n = x.len();
    debug_assert_eq!(hess.nrows(), n, "Hessian buffer has wrong shape");
    debug_assert_eq!(hess.ncols(), n, "Hessian buffer has wrong shape");

    let h = hessian_step::<T>();
    let two_h = h + h;

    let (rows, cols) = x.shape_generic();
    let mut grad_plus = OVector::<T, D>::zeros_generic(rows, cols);
    let mut grad_minus = OVector::<T, D>::zeros_generic(rows, cols);
    let mut trial = x.clone();

    for i in 0..n {
        let origin = trial[i];
        trial[i] = origin + h;
        gradient(&trial, &mut grad_plus);
        trial[i] = origin - h;
        gradient(&trial, &mut grad_minus);
        trial[i] = origin;

        for j in 0..n {
            hess[(i, j)] = (grad_plus[j] - grad_minus[j]) / two_h;
        }
    }

    let half = nalgebra::convert::<f64, T>(0.5);
    for i in 0..n {
        for j in 0..i {
            let avg = (hess[(i, j)] + hess[(j, i)]) * half;
            hess[(i, j)] = avg;
            hess[(j, i)] = avg;
        }
    }
}

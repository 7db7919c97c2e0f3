//! Armijo backtracking with polynomial interpolation.

use super::{
    initial_step, is_null_step, start_point, step_to, sufficient_decrease, LineSearch, LineSearchConfig,
    LineSearchError,
};
use descent_core::traits::Problem;
use descent_core::types::to_f64;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};
use tracing::{debug, trace};

/// Backtracking on the Armijo condition with interpolated shrink steps.
///
/// With `φ(α) = f(x + αp)`, `φ(0)` and `φ'(0) = ∇f(x)ᵀp` known:
///
/// - after the first failed trial, the next step minimises the quadratic
///   through `φ(0)`, `φ'(0)` and `φ(α)`
/// - after later failures, the cubic through `φ(0)`, `φ'(0)` and the two
///   most recent trials
///
/// Each new step is clamped to `[0.1α, 0.5α]`, so the trials shrink
/// geometrically even when the interpolant is poor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubicBacktracking {
    config: LineSearchConfig,
}

impl CubicBacktracking {
    /// Create an interpolating backtracking search.
    pub fn new(config: LineSearchConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &LineSearchConfig {
        &self.config
    }
}

/// Minimiser of the quadratic through `φ(0) = f0`, `φ'(0) = slope`, `φ(α) = f_alpha`.
fn quadratic_step<T: RealField + Copy>(f0: T, slope: T, alpha: T, f_alpha: T) -> T {
    let two = nalgebra::convert::<f64, T>(2.0);
    -slope * alpha * alpha / (two * (f_alpha - f0 - slope * alpha))
}

/// Minimiser of the cubic `aα³ + bα² + slope·α + f0` through the two
/// latest trials `(alpha, f_alpha)` and `(alpha_prev, f_prev)`.
fn cubic_step<T: RealField + Copy>(f0: T, slope: T, alpha: T, f_alpha: T, alpha_prev: T, f_prev: T) -> T {
    let two = nalgebra::convert::<f64, T>(2.0);
    let three = nalgebra::convert::<f64, T>(3.0);

    let r1 = f_alpha - f0 - slope * alpha;
    let r2 = f_prev - f0 - slope * alpha_prev;
    let a2 = alpha * alpha;
    let p2 = alpha_prev * alpha_prev;
    let den = alpha - alpha_prev;

    let a = (r1 / a2 - r2 / p2) / den;
    let b = (-alpha_prev * r1 / a2 + alpha * r2 / p2) / den;

    if a.abs() <= T::default_epsilon() {
        return -slope / (two * b);
    }

    let discriminant = b * b - three * a * slope;
    if discriminant < T::zero() {
        return alpha / two;
    }
    (-b + discriminant.sqrt()) / (three * a)
}

impl<T: RealField + Copy> LineSearch<T> for CubicBacktracking {
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
        let c1 = nalgebra::convert::<f64, T>(self.config.sufficient_decrease);
        let lower = nalgebra::convert::<f64, T>(0.1);
        let upper = nalgebra::convert::<f64, T>(0.5);

        let (f0, slope) = start_point(x, direction, problem);
        let mut trial = x.clone();
        let mut alpha = initial_step(alpha_init);
        let mut previous: Option<(T, T)> = None;

        for iteration in 0..self.config.max_iterations {
            step_to(&mut trial, x, direction, alpha);
            if is_null_step(&trial, x) {
                debug!(iteration, alpha = to_f64(alpha), "cubic backtracking step lost to rounding");
                return Err(LineSearchError::exhausted(iteration));
            }
            let f_alpha = problem.value(&trial);
            trace!(iteration, alpha = to_f64(alpha), value = to_f64(f_alpha), "cubic backtracking trial");

            if sufficient_decrease(f_alpha, f0, c1, alpha, slope) {
                return Ok(alpha);
            }

            let candidate = match previous {
                None => quadratic_step(f0, slope, alpha, f_alpha),
                Some((alpha_prev, f_prev)) => cubic_step(f0, slope, alpha, f_alpha, alpha_prev, f_prev),
            };
            let candidate = if candidate.is_finite() {
                candidate
            } else {
                alpha * upper
            };

            previous = Some((alpha, f_alpha));
            alpha = candidate.max(lower * alpha).min(upper * alpha);
        }

        Err(LineSearchError::exhausted(self.config.max_iterations))
    }
}

//! Weak Wolfe line search by bracketing bisection.

use super::{initial_step, start_point, step_to, sufficient_decrease, LineSearch, LineSearchConfig, LineSearchError};
use descent_core::traits::Problem;
use descent_core::types::to_f64;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};
use tracing::trace;

/// Bisection search for a step satisfying the weak Wolfe conditions
///
/// ```text
/// f(x + αp) ≤ f(x) + c1·α·∇f(x)ᵀp        (sufficient decrease)
/// ∇f(x + αp)ᵀp ≥ c2·∇f(x)ᵀp             (curvature)
/// ```
///
/// A bracket `[low, high)` starts unbounded above. A step that is too long
/// lowers `high`; a step that is too short raises `low` and doubles `α`
/// while `high` is unset. The search also stops, successfully, when
/// successive trials differ by less than `min_change`, and returns machine
/// epsilon for a direction whose norm is below machine epsilon.
///
/// Each trial costs one gradient evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WolfeBisection {
    config: LineSearchConfig,
}

impl WolfeBisection {
    /// Create a weak Wolfe bisection search.
    pub fn new(config: LineSearchConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &LineSearchConfig {
        &self.config
    }
}

impl<T: RealField + Copy> LineSearch<T> for WolfeBisection {
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
        let eps = T::default_epsilon();
        if direction.norm() < eps {
            return Ok(eps);
        }

        let c1 = nalgebra::convert::<f64, T>(self.config.sufficient_decrease);
        let c2 = nalgebra::convert::<f64, T>(self.config.curvature);
        let min_change = nalgebra::convert::<f64, T>(self.config.min_change);
        let two = nalgebra::convert::<f64, T>(2.0);

        let (f0, slope) = start_point(x, direction, problem);
        let mut trial = x.clone();
        let mut grad = x.clone();

        let mut low = T::zero();
        let mut high: Option<T> = None;
        let mut alpha = initial_step(alpha_init);
        let mut last = T::zero();

        for iteration in 0..self.config.max_iterations {
            step_to(&mut trial, x, direction, alpha);
            let f_alpha = problem.gradient(&trial, &mut grad);
            trace!(iteration, alpha = to_f64(alpha), value = to_f64(f_alpha), "wolfe trial");

            if !sufficient_decrease(f_alpha, f0, c1, alpha, slope) {
                high = Some(alpha);
                alpha = (low + alpha) / two;
            } else if grad.dot(direction) < c2 * slope {
                low = alpha;
                alpha = match high {
                    Some(high) => (low + high) / two,
                    None => two * low,
                };
            } else {
                return Ok(alpha);
            }

            if (alpha - last).abs() < min_change {
                return Ok(alpha);
            }
            last = alpha;
        }

        Err(LineSearchError::exhausted(self.config.max_iterations))
    }
}

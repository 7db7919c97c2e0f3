//! Armijo backtracking.

use super::{
    initial_step, is_null_step, start_point, step_to, sufficient_decrease, LineSearch, LineSearchConfig,
    LineSearchError,
};
use descent_core::traits::Problem;
use descent_core::types::to_f64;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};
use tracing::{debug, trace};

/// Backtracking line search on the Armijo condition.
///
/// Starting from `α = |α₀|`, tests
///
/// ```text
/// f(x + αp) ≤ f(x) + c1·α·∇f(x)ᵀp
/// ```
///
/// and shrinks `α ← τα` on failure. The gradient at `x` is evaluated once
/// per search; each trial costs one objective value.
///
/// # Example
///
/// ```
/// use descent_core::problems::Rosenbrock;
/// use descent_optimiser::line_search::{Backtracking, LineSearch, LineSearchConfig};
/// use nalgebra::Vector2;
///
/// let search = Backtracking::new(LineSearchConfig::default());
/// let x = Vector2::new(0.0, 0.0);
/// let p = Vector2::new(2.0, 0.0); // -∇f(0, 0)
///
/// let alpha = search.search(&x, &p, &Rosenbrock::new(), 1.0).unwrap();
/// assert!(alpha > 0.0 && alpha < 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Backtracking {
    config: LineSearchConfig,
}

impl Backtracking {
    /// Create a backtracking search with the given settings.
    pub fn new(config: LineSearchConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &LineSearchConfig {
        &self.config
    }
}

impl<T: RealField + Copy> LineSearch<T> for Backtracking {
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
        let decay = nalgebra::convert::<f64, T>(self.config.decay);

        let (f0, slope) = start_point(x, direction, problem);
        let mut trial = x.clone();
        let mut alpha = initial_step(alpha_init);

        for iteration in 0..self.config.max_iterations {
            step_to(&mut trial, x, direction, alpha);
            if is_null_step(&trial, x) {
                debug!(iteration, alpha = to_f64(alpha), "backtracking step lost to rounding");
                return Err(LineSearchError::exhausted(iteration));
            }
            let f_trial = problem.value(&trial);
            trace!(iteration, alpha = to_f64(alpha), value = to_f64(f_trial), "backtracking trial");

            if sufficient_decrease(f_trial, f0, c1, alpha, slope) {
                return Ok(alpha);
            }
            alpha *= decay;
        }

        Err(LineSearchError::exhausted(self.config.max_iterations))
    }
}

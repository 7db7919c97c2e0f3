//! Fixed step length.

use super::{initial_step, LineSearch, LineSearchError};
use descent_core::traits::Problem;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, OVector, RealField};

/// Accepts the initial step without evaluating the problem.
///
/// Useful when the direction already carries the right scale, e.g. a
/// Newton step close to the minimiser.
///
/// # Example
///
/// ```
/// use descent_core::problems::Rosenbrock;
/// use descent_optimiser::line_search::{FixedStep, LineSearch};
/// use nalgebra::Vector2;
///
/// let x = Vector2::new(0.0, 0.0);
/// let p = Vector2::new(1.0, 0.0);
/// let alpha = FixedStep.search(&x, &p, &Rosenbrock::new(), -0.25).unwrap();
/// assert_eq!(alpha, 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedStep;

impl<T: RealField + Copy> LineSearch<T> for FixedStep {
    fn search<D, P>(
        &self,
        _x: &OVector<T, D>,
        _direction: &OVector<T, D>,
        _problem: &P,
        alpha_init: T,
    ) -> Result<T, LineSearchError>
    where
        D: Dim,
        P: Problem<T, D> + ?Sized,
        DefaultAllocator: Allocator<D> + Allocator<D, D>,
    {
        Ok(initial_step(alpha_init))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_search::test_problems::Parabola;
    use nalgebra::Vector1;

    #[test]
    fn test_returns_absolute_initial_step() {
        let problem = Parabola { curvature: 1.0 };
        let x = Vector1::new(1.0);
        let p = Vector1::new(-1.0);

        assert_eq!(FixedStep.search(&x, &p, &problem, 0.3).unwrap(), 0.3);
        assert_eq!(FixedStep.search(&x, &p, &problem, -4.0).unwrap(), 4.0);
    }

    #[test]
    fn test_zero_initial_step_becomes_one() {
        let problem = Parabola { curvature: 1.0 };
        let x = Vector1::new(1.0);
        let p = Vector1::new(-1.0);
        assert_eq!(FixedStep.search(&x, &p, &problem, 0.0).unwrap(), 1.0);
    }
}

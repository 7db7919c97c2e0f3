//! Reference objectives with known minimisers.
//!
//! These are the standard fixtures for exercising minimisers and line
//! searches:
//! - [`Rosenbrock`]: the curved-valley benchmark, minimum at `(1, 1)`
//! - [`QuadraticProblem`]: `½xᵀAx − bᵀx` for symmetric positive definite `A`,
//!   minimum at the solution of `Ax = b`

mod quadratic;
mod rosenbrock;

pub use quadratic::QuadraticProblem;
pub use rosenbrock::Rosenbrock;

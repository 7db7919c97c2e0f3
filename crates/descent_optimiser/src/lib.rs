//! # descent_optimiser: Unconstrained Minimisation
//!
//! ## Layer 2 (Algorithms) Role
//!
//! descent_optimiser sits on top of `descent_core` and provides:
//! - Line searches: fixed step, Armijo backtracking, backtracking with
//!   cubic interpolation and weak-Wolfe bisection (`line_search`)
//! - Minimisers: L-BFGS, Newton and nonlinear conjugate gradient
//!   (`minimizers`)
//! - Error types: `MinimizerError`, `LineSearchError`
//!
//! ## Control Flow
//!
//! A minimiser owns the outer loop. Each iteration it builds a descent
//! direction from gradient (and, for Newton, Hessian) information, asks its
//! [`LineSearchStrategy`](line_search::LineSearchStrategy) for a step length,
//! updates `x` in place and checks its stopping rules. Line searches only
//! evaluate the [`Problem`](descent_core::traits::Problem); they never
//! touch minimiser state.
//!
//! ## Usage Examples
//!
//! ```rust
//! use descent_core::problems::Rosenbrock;
//! use descent_optimiser::prelude::*;
//! use nalgebra::Vector2;
//!
//! let config = LbfgsConfig::default()
//!     .with_max_iterations(500)
//!     .with_tolerance(1e-10)
//!     .with_line_search(LineSearchStrategy::weak_wolfe_bisection());
//! let mut minimizer = LbfgsMinimizer::new(config);
//!
//! let mut x = Vector2::new(-1.2, 1.0);
//! let result = minimizer.minimize(&Rosenbrock::new(), &mut x)?;
//!
//! assert!(result.is_converged());
//! assert!((x - Vector2::new(1.0, 1.0)).norm() < 1e-4);
//! # Ok::<(), MinimizerError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for every configuration type

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod line_search;
pub mod minimizers;

mod error;

pub use error::MinimizerError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::line_search::{LineSearch, LineSearchConfig, LineSearchError, LineSearchMethod, LineSearchStrategy};
    pub use crate::minimizers::{
        ConjugateGradientConfig, ConjugateGradientMinimizer, ConjugateGradientUpdate, LbfgsConfig, LbfgsMinimizer,
        MinimizeResult, Minimizer, NewtonConfig, NewtonMinimizer, Termination,
    };
    pub use crate::MinimizerError;
}

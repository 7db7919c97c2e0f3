//! # descent_core: Foundation for Gradient-Based Minimisation
//!
//! ## Layer 1 (Foundation) Role
//!
//! descent_core serves as the bottom layer of the optimiser workspace, providing:
//! - The objective-function interface (`traits::Problem`)
//! - Finite-difference differentiation (`math::finite_diff`)
//! - Vector and matrix aliases over `nalgebra` (`types`)
//! - Error types: `ConfigError` (`types::error`)
//! - Reference problems for testing and benchmarking (`problems`)
//!
//! ## Dimension Polymorphism
//!
//! Every routine is generic over a `nalgebra::Dim`. A `Const<N>` dimension
//! gives stack-allocated fixed-size vectors, `Dyn` gives heap-allocated
//! vectors sized at runtime. Internal buffers are always created from the
//! shape of the caller's vector, so both paths share one code base.
//!
//! ## Usage Examples
//!
//! ```rust
//! use descent_core::problems::Rosenbrock;
//! use descent_core::traits::Problem;
//! use nalgebra::Vector2;
//!
//! let problem = Rosenbrock::new();
//! let x = Vector2::new(1.0_f64, 1.0);
//!
//! let mut grad = Vector2::zeros();
//! let value = problem.gradient(&x, &mut grad);
//! assert_eq!(value, 0.0);
//! assert_eq!(grad.amax(), 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for configuration and reference problems

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod problems;
pub mod traits;
pub mod types;

//! Core traits for objective functions.
//!
//! This module defines the fundamental abstraction consumed by every
//! minimiser:
//! - [`Problem`]: objective value, gradient, Hessian and an optional
//!   convergence predicate
//!
//! Minimisers are generic over `P: Problem<T, D>` (static dispatch), so
//! an objective is monomorphised into the solver loop.

pub mod problem;

pub use problem::Problem;

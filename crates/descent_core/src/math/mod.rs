//! Numerical differentiation.
//!
//! - [`finite_diff`]: central-difference gradients and Hessians used as
//!   fallbacks when a [`Problem`](crate::traits::Problem) does not supply
//!   analytic derivatives.

pub mod finite_diff;

pub use finite_diff::{finite_gradient, finite_hessian, FiniteDiffAccuracy};

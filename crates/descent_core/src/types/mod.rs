//! Core numeric types.
//!
//! This module provides:
//! - Vector and matrix aliases shared by every optimiser
//! - `error`: Structured error types for configuration validation
//!
//! # Re-exports
//!
//! For convenience, [`ConfigError`] is re-exported at this module level.

pub mod error;

pub use error::ConfigError;

use nalgebra::{OMatrix, OVector};

/// Column vector of dimension `D` (fixed `Const<N>` or runtime `Dyn`).
pub type Vector<T, D> = OVector<T, D>;

/// Square `D x D` matrix, used for Hessians.
pub type SquareMatrix<T, D> = OMatrix<T, D, D>;

/// Returns `true` when every component of `x` is finite.
///
/// # Examples
/// ```
/// use descent_core::types::is_finite;
/// use nalgebra::Vector2;
///
/// assert!(is_finite(&Vector2::new(1.0, -2.0)));
/// assert!(!is_finite(&Vector2::new(f64::NAN, 0.0)));
/// ```
pub fn is_finite<T, D>(x: &Vector<T, D>) -> bool
where
    T: nalgebra::RealField + Copy,
    D: nalgebra::Dim,
    nalgebra::DefaultAllocator: nalgebra::allocator::Allocator<D>,
{
    x.iter().all(|v| v.is_finite())
}

/// Lossy conversion of a generic scalar to `f64`, for logging and reports.
///
/// Returns `NaN` if `T` has no `f64` representation.
pub fn to_f64<T: nalgebra::RealField + Copy>(value: T) -> f64 {
    nalgebra::try_convert(value).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DVector, Vector3};

    #[test]
    fn test_is_finite_fixed() {
        assert!(is_finite(&Vector3::new(0.0, 1.0, -1.0e300)));
        assert!(!is_finite(&Vector3::new(0.0, f64::INFINITY, 1.0)));
    }

    #[test]
    fn test_is_finite_dynamic() {
        assert!(is_finite(&DVector::<f64>::zeros(4)));
        assert!(!is_finite(&DVector::from_vec(vec![1.0, f64::NAN])));
    }

    #[test]
    fn test_is_finite_empty() {
        assert!(is_finite(&DVector::<f64>::zeros(0)));
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(1.5_f64), 1.5);
        assert_eq!(to_f64(0.25_f32), 0.25);
        assert!(to_f64(f64::NAN).is_nan());
    }
}

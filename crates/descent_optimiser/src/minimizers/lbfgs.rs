//! Limited-memory BFGS.
//!
//! # Algorithm
//!
//! Each iteration applies an implicit inverse-Hessian approximation to the
//! gradient with the two-loop recursion over the last `M` curvature pairs
//!
//! ```text
//! s_k = x_{k+1} − x_k,   y_k = ∇f_{k+1} − ∇f_k,   ρ_k = 1 / (s_kᵀy_k)
//! ```
//!
//! scaled initially by `γ_k = s_kᵀy_k / y_kᵀy_k`, and steps along the
//! negated product. The approximation stays positive definite as long as
//! every stored pair has `sᵀy > 0`.

use super::{check_start, take_step, MinimizeResult, Minimizer, Termination};
use crate::line_search::{LineSearch, LineSearchError, LineSearchStrategy};
use crate::MinimizerError;
use descent_core::traits::Problem;
use descent_core::types::{to_f64, ConfigError};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, Dim, DimMin, OVector, RealField};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Minimum cosine between the quasi-Newton direction and the gradient.
const DESCENT_COSINE: f64 = 1e-4;

/// Configuration for [`LbfgsMinimizer`].
///
/// # Examples
///
/// ```
/// use descent_optimiser::minimizers::LbfgsConfig;
///
/// let config = LbfgsConfig::default().with_history_size(12).with_tolerance(1e-10);
/// assert!(config.validate().is_ok());
/// assert!(LbfgsConfig::default().with_history_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LbfgsConfig {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,

    /// Stop when `‖∇f‖∞` or `α‖q‖²` falls to this value. Zero disables
    /// early exit unless the gradient vanishes exactly.
    pub tolerance: f64,

    /// Initial curvature scale `γ₀` used before any pair is stored.
    pub init_hess: f64,

    /// Number of curvature pairs `M` kept in the history window.
    pub history_size: usize,

    /// Start from the curvature scale reached by the previous converged
    /// call instead of `init_hess`.
    pub warm_start: bool,

    /// Step-length rule.
    pub line_search: LineSearchStrategy,
}

impl Default for LbfgsConfig {
    /// Default values:
    /// - `max_iterations`: 30
    /// - `tolerance`: 0
    /// - `init_hess`: 1
    /// - `history_size`: 8
    /// - `warm_start`: false
    /// - `line_search`: Armijo backtracking
    fn default() -> Self {
        Self {
            max_iterations: 30,
            tolerance: 0.0,
            init_hess: 1.0,
            history_size: 8,
            warm_start: false,
            line_search: LineSearchStrategy::default(),
        }
    }
}

impl LbfgsConfig {
    /// Create a configuration with the given budget and tolerance.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Default::default()
        }
    }

    /// Relaxed tolerance, modest budget.
    pub fn fast() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            history_size: 5,
            ..Default::default()
        }
    }

    /// Tight tolerance, large budget and a wider history window.
    pub fn high_precision() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-12,
            history_size: 20,
            line_search: LineSearchStrategy::weak_wolfe_bisection(),
            ..Default::default()
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the initial curvature scale.
    pub fn with_init_hess(mut self, init_hess: f64) -> Self {
        self.init_hess = init_hess;
        self
    }

    /// Set the history window size.
    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    /// Enable or disable warm start of the curvature scale.
    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    /// Set the step-length rule.
    pub fn with_line_search(mut self, line_search: LineSearchStrategy) -> Self {
        self.line_search = line_search;
        self
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::zero_count("max_iterations"));
        }
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::negative("tolerance", self.tolerance));
        }
        if !(self.init_hess > 0.0 && self.init_hess.is_finite()) {
            return Err(ConfigError::not_positive("init_hess", self.init_hess));
        }
        if self.history_size == 0 {
            return Err(ConfigError::zero_count("history_size"));
        }
        self.line_search.validate()
    }
}

/// One stored curvature pair.
#[derive(Debug, Clone)]
struct CurvaturePair<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    s: OVector<T, D>,
    y: OVector<T, D>,
    rho: T,
}

/// Bounded FIFO window of `(s, y)` curvature pairs.
///
/// Holds at most `capacity` pairs; pushing onto a full window evicts the
/// oldest.
///
/// # Example
///
/// ```
/// use descent_optimiser::minimizers::CurvatureHistory;
/// use nalgebra::{Vector2, U2};
///
/// let mut history = CurvatureHistory::<f64, U2>::new(2);
/// history.push(Vector2::new(1.0, 0.0), Vector2::new(2.0, 0.0));
/// history.push(Vector2::new(0.0, 1.0), Vector2::new(0.0, 5.0));
///
/// // H ≈ diag(1/2, 1/5)
/// let hg = history.apply(&Vector2::new(1.0, 1.0), 1.0);
/// assert!((hg - Vector2::new(0.5, 0.2)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CurvatureHistory<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    capacity: usize,
    pairs: VecDeque<CurvaturePair<T, D>>,
}

impl<T, D> CurvatureHistory<T, D>
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    /// Create an empty window holding up to `capacity` pairs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pairs: VecDeque::with_capacity(capacity),
        }
    }

    /// Maximum number of pairs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Drop every pair.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Append a pair, evicting the oldest when full.
    ///
    /// The caller is responsible for `sᵀy > 0`.
    pub fn push(&mut self, s: OVector<T, D>, y: OVector<T, D>) {
        if self.capacity == 0 {
            return;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        let rho = T::one() / s.dot(&y);
        self.pairs.push_back(CurvaturePair { s, y, rho });
    }

    /// Stored pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&OVector<T, D>, &OVector<T, D>)> + '_ {
        self.pairs.iter().map(|pair| (&pair.s, &pair.y))
    }

    /// Two-loop recursion: approximate `H·grad` with initial scale `gamma`.
    pub fn apply(&self, grad: &OVector<T, D>, gamma: T) -> OVector<T, D> {
        let mut q = grad.clone();
        let mut alphas = Vec::with_capacity(self.pairs.len());

        for pair in self.pairs.iter().rev() {
            let alpha = pair.rho * pair.s.dot(&q);
            q.axpy(-alpha, &pair.y, T::one());
            alphas.push(alpha);
        }

        q *= gamma;

        for (pair, alpha) in self.pairs.iter().zip(alphas.iter().rev()) {
            let beta = pair.rho * pair.y.dot(&q);
            q.axpy(*alpha - beta, &pair.s, T::one());
        }

        q
    }
}

/// L-BFGS minimiser.
///
/// With `warm_start` enabled, the curvature scale reached when a call
/// converges on the gradient tolerance seeds the next call; see
/// [`curvature_scale`](Self::curvature_scale).
#[derive(Debug, Clone)]
pub struct LbfgsMinimizer<T> {
    config: LbfgsConfig,
    curvature_scale: Option<T>,
}

impl<T: RealField + Copy> Default for LbfgsMinimizer<T> {
    fn default() -> Self {
        Self::new(LbfgsConfig::default())
    }
}

impl<T: RealField + Copy> LbfgsMinimizer<T> {
    /// Create a minimiser with the given settings.
    pub fn new(config: LbfgsConfig) -> Self {
        Self {
            config,
            curvature_scale: None,
        }
    }

    /// The settings in use.
    pub fn config(&self) -> &LbfgsConfig {
        &self.config
    }

    /// Curvature scale persisted by the last call, if that call converged on
    /// the gradient tolerance.
    ///
    /// A call that stops for any other reason, or fails, clears it. A call
    /// that starts at a stationary point leaves it unchanged.
    pub fn curvature_scale(&self) -> Option<T> {
        self.curvature_scale
    }

    /// Forget the persisted curvature scale.
    pub fn reset(&mut self) {
        self.curvature_scale = None;
    }

    fn starting_scale(&self) -> T {
        let configured = nalgebra::convert::<f64, T>(self.config.init_hess);
        if self.config.warm_start {
            self.curvature_scale.unwrap_or(configured)
        } else {
            configured
        }
    }
}

/// `min(1, 1/‖g‖∞)`, the first trial step along steepest descent.
fn steepest_step<T, D>(grad: &OVector<T, D>) -> T
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    let norm = grad.amax();
    if norm > T::zero() {
        (T::one() / norm).min(T::one())
    } else {
        T::one()
    }
}

/// Angle test: `qᵀg ≥ c‖q‖‖g‖`, false for NaN.
fn is_descent<T, D>(q: &OVector<T, D>, grad: &OVector<T, D>) -> bool
where
    T: RealField + Copy,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    let threshold = nalgebra::convert::<f64, T>(DESCENT_COSINE) * q.norm() * grad.norm();
    q.dot(grad) >= threshold
}

impl<T: RealField + Copy> Minimizer<T> for LbfgsMinimizer<T> {
    fn minimize<D, P>(&mut self, problem: &P, x: &mut OVector<T, D>) -> Result<MinimizeResult<T>, MinimizerError>
    where
        D: Dim + DimMin<D, Output = D>,
        P: Problem<T, D> + ?Sized,
        DefaultAllocator: Allocator<D> + Allocator<D, D>,
    {
        self.config.validate()?;
        check_start(x)?;

        let tolerance = nalgebra::convert::<f64, T>(self.config.tolerance);
        let line_search = self.config.line_search;
        let (rows, cols) = x.shape_generic();

        let mut grad = OVector::<T, D>::zeros_generic(rows, cols);
        let mut grad_prev = OVector::<T, D>::zeros_generic(rows, cols);
        let mut x_prev = x.clone();
        let mut history = CurvatureHistory::<T, D>::new(self.config.history_size);

        let mut value = problem.gradient(x, &mut grad);
        let mut gamma = self.starting_scale();
        let mut alpha_init = steepest_step(&grad);
        let mut iterations = 0;

        if grad.amax() <= tolerance {
            return Ok(MinimizeResult {
                iterations,
                termination: Termination::GradientTolerance,
                value,
            });
        }

        self.curvature_scale = None;
        let termination = loop {
            if iterations == self.config.max_iterations {
                break Termination::MaxIterations;
            }

            let mut q = history.apply(&grad, gamma);
            if !is_descent(&q, &grad) {
                warn!(iteration = iterations, "L-BFGS direction not descent, resetting to steepest descent");
                q.copy_from(&grad);
                history.clear();
                alpha_init = steepest_step(&grad);
            }

            let direction = -&q;
            let alpha = match line_search.search(x, &direction, problem, alpha_init) {
                Ok(alpha) => alpha,
                Err(LineSearchError::Exhausted { iterations: trials }) => {
                    warn!(iteration = iterations, trials, "L-BFGS line search exhausted");
                    break Termination::LineSearchExhausted;
                }
                Err(err) => return Err(err.into()),
            };

            take_step(x, &mut x_prev, &direction, alpha, iterations)?;
            iterations += 1;

            let step_measure = alpha * q.norm_squared();
            if step_measure <= tolerance {
                value = problem.value(x);
                break Termination::StepTolerance;
            }

            grad_prev.copy_from(&grad);
            value = problem.gradient(x, &mut grad);
            debug!(
                iteration = iterations,
                value = to_f64(value),
                grad_norm = to_f64(grad.amax()),
                step = to_f64(alpha),
                history = history.len(),
                "L-BFGS iteration"
            );

            if grad.amax() <= tolerance {
                self.curvature_scale = Some(gamma);
                break Termination::GradientTolerance;
            }
            if problem.converged(&x_prev, x, &grad) {
                break Termination::ProblemConverged;
            }

            let s = &*x - &x_prev;
            let y = &grad - &grad_prev;
            let yy = y.norm_squared();
            if yy <= T::zero() {
                warn!(iteration = iterations, "L-BFGS curvature breakdown (yᵀy ≤ 0)");
                break Termination::CurvatureBreakdown;
            }

            let sy = s.dot(&y);
            if sy <= T::default_epsilon() * yy {
                debug!(iteration = iterations, sy = to_f64(sy), "skipping curvature pair with sᵀy ≤ 0");
                continue;
            }

            gamma = sy / yy;
            history.push(s, y);
            alpha_init = T::one();
        };

        Ok(MinimizeResult {
            iterations,
            termination,
            value,
        })
    }
}

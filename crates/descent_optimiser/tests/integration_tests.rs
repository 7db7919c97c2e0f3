//! Integration tests for the minimisers and line searches.
//!
//! These tests exercise the public API end to end: every minimiser against
//! the reference problems from `descent_core`, every line-search strategy
//! inside L-BFGS, and the behavioural guarantees shared by all of them
//! (budget handling, step acceptance, repeatability).

use descent_core::problems::{QuadraticProblem, Rosenbrock};
use descent_core::traits::Problem;
use descent_optimiser::minimizers::CurvatureHistory;
use descent_optimiser::prelude::*;
use nalgebra::{DVector, Dyn, Vector2};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route minimiser logs to the test harness; `RUST_LOG=debug` shows iterations.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// `Σ exp(x_i)`: bounded below but never stationary.
struct ExpSum;

impl Problem<f64, Dyn> for ExpSum {
    fn value(&self, x: &DVector<f64>) -> f64 {
        x.iter().map(|v| v.exp()).sum()
    }

    fn gradient(&self, x: &DVector<f64>, grad: &mut DVector<f64>) -> f64 {
        for (g, v) in grad.iter_mut().zip(x.iter()) {
            *g = v.exp();
        }
        self.value(x)
    }
}

/// Collects the `history` field of every L-BFGS iteration event.
#[derive(Clone, Default)]
struct HistoryLengths(Arc<Mutex<Vec<u64>>>);

struct HistoryVisitor<'a>(&'a mut Vec<u64>);

impl Visit for HistoryVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "history" {
            self.0.push(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> Layer<S> for HistoryLengths {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if let Ok(mut lengths) = self.0.lock() {
            event.record(&mut HistoryVisitor(&mut lengths));
        }
    }
}

fn strategies() -> [LineSearchStrategy; 3] {
    [
        LineSearchStrategy::backtracking(),
        LineSearchStrategy::cubic_backtracking(),
        LineSearchStrategy::weak_wolfe_bisection(),
    ]
}

// ============================================================================
// Quadratic Tests
// ============================================================================

#[test]
fn test_newton_solves_quadratic_in_one_iteration() {
    init_tracing();
    let problem = QuadraticProblem::<f64, Dyn>::well_conditioned(16);
    let mut x = DVector::zeros(16);

    let result = NewtonMinimizer::new(NewtonConfig::new(1, 0.0))
        .minimize(&problem, &mut x)
        .unwrap();

    assert_eq!(result.iterations, 1);
    assert!(problem.residual_norm(&x) < 1e-10);
}

#[test]
fn test_lbfgs_reduces_quadratic_residual() {
    init_tracing();
    let problem = QuadraticProblem::<f64, Dyn>::well_conditioned(16);
    let mut x = DVector::zeros(16);

    let result = LbfgsMinimizer::new(LbfgsConfig::new(100, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();

    assert!(result.iterations <= 100);
    assert!(problem.residual_norm(&x) < 1e-4);
}

#[test]
fn test_conjugate_gradient_reduces_quadratic_residual() {
    init_tracing();
    let problem = QuadraticProblem::<f64, Dyn>::well_conditioned(16);
    let mut x = DVector::zeros(16);

    let result = ConjugateGradientMinimizer::new(ConjugateGradientConfig::new(100, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();

    assert!(result.iterations <= 100);
    assert!(problem.residual_norm(&x) < 1e-4);
}

// ============================================================================
// Rosenbrock Tests
// ============================================================================

#[test]
fn test_all_minimizers_solve_rosenbrock() {
    init_tracing();
    let problem = Rosenbrock::new();
    let target = Vector2::new(1.0, 1.0);

    let mut x = Vector2::new(0.0, 0.0);
    let result = LbfgsMinimizer::new(LbfgsConfig::new(1000, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.iterations <= 1000);
    assert!((x - target).norm() < 1e-4, "L-BFGS stopped at {x}");

    let mut x = Vector2::new(0.0, 0.0);
    let result = NewtonMinimizer::new(NewtonConfig::new(1000, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.iterations <= 1000);
    assert!((x - target).norm() < 1e-4, "Newton stopped at {x}");

    let mut x = Vector2::new(0.0, 0.0);
    let result = ConjugateGradientMinimizer::new(ConjugateGradientConfig::new(1000, 1e-8))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.iterations <= 1000);
    assert!((x - target).norm() < 1e-4, "CG stopped at {x}");
}

#[test]
fn test_all_minimizers_solve_finite_difference_rosenbrock() {
    init_tracing();
    let problem = Rosenbrock::finite_difference();
    let target = Vector2::new(1.0, 1.0);

    let mut x = Vector2::new(0.0, 0.0);
    let result = LbfgsMinimizer::new(LbfgsConfig::new(1000, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.is_converged(), "L-BFGS: {result:?}");
    assert!((x - target).norm() < 1e-4, "L-BFGS stopped at {x}");

    let mut x = Vector2::new(0.0, 0.0);
    let result = NewtonMinimizer::new(NewtonConfig::new(1000, 1e-10))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.is_converged(), "Newton: {result:?}");
    assert!((x - target).norm() < 1e-4, "Newton stopped at {x}");

    let mut x = Vector2::new(0.0, 0.0);
    let result = ConjugateGradientMinimizer::new(ConjugateGradientConfig::new(1000, 1e-8))
        .minimize(&problem, &mut x)
        .unwrap();
    assert!(result.is_converged(), "CG: {result:?}");
    assert!((x - target).norm() < 1e-4, "CG stopped at {x}");
}

#[test]
fn test_lbfgs_with_every_line_search() {
    init_tracing();
    let starts = [Vector2::new(0.0, 0.0), Vector2::new(-1.2, 1.0), Vector2::new(2.0, -1.0)];

    for strategy in strategies() {
        for start in starts {
            let config = LbfgsConfig::new(1000, 1e-10).with_line_search(strategy);
            let mut x = start;
            let result = LbfgsMinimizer::new(config)
                .minimize(&Rosenbrock::new(), &mut x)
                .unwrap();

            assert!(result.is_converged(), "{:?} from {start}: {:?}", strategy.method, result);
            assert!((x - Vector2::new(1.0, 1.0)).norm() < 1e-4);
        }
    }
}

#[test]
fn test_more_thuente_reports_unsupported() {
    let strategy = LineSearchStrategy::new(LineSearchMethod::MoreThuente, LineSearchConfig::default());
    let config = LbfgsConfig::default().with_line_search(strategy);
    let mut x = Vector2::new(0.0, 0.0);

    let err = LbfgsMinimizer::new(config)
        .minimize(&Rosenbrock::new(), &mut x)
        .unwrap_err();

    assert_eq!(
        err,
        MinimizerError::LineSearch(LineSearchError::unsupported(LineSearchMethod::MoreThuente))
    );
}

// ============================================================================
// Budget Tests
// ============================================================================

#[test]
fn test_zero_tolerance_runs_full_budget() {
    init_tracing();
    let max_iterations = 25;

    let mut x = DVector::from_element(3, 1.0);
    let result = LbfgsMinimizer::new(LbfgsConfig::new(max_iterations, 0.0))
        .minimize(&ExpSum, &mut x)
        .unwrap();
    assert_eq!(result.iterations, max_iterations);
    assert_eq!(result.termination, Termination::MaxIterations);

    let mut x = DVector::from_element(3, 1.0);
    let result = NewtonMinimizer::new(NewtonConfig::new(max_iterations, 0.0))
        .minimize(&ExpSum, &mut x)
        .unwrap();
    assert_eq!(result.iterations, max_iterations);
    assert_eq!(result.termination, Termination::MaxIterations);

    let mut x = DVector::from_element(3, 1.0);
    let result = ConjugateGradientMinimizer::new(ConjugateGradientConfig::new(max_iterations, 0.0))
        .minimize(&ExpSum, &mut x)
        .unwrap();
    assert_eq!(result.iterations, max_iterations);
    assert_eq!(result.termination, Termination::MaxIterations);
}

#[test]
fn test_reported_value_matches_final_point() {
    let problem = Rosenbrock::new();
    let mut x = Vector2::new(-1.2, 1.0);
    let result = LbfgsMinimizer::new(LbfgsConfig::new(15, 0.0))
        .minimize(&problem, &mut x)
        .unwrap();

    assert_eq!(result.value, problem.value(&x));
}

// ============================================================================
// Line Search Properties
// ============================================================================

#[test]
fn test_history_window_is_fifo() {
    let mut history = CurvatureHistory::<f64, Dyn>::new(3);
    for k in 0..10 {
        let s = DVector::from_element(2, k as f64 + 1.0);
        history.push(s.clone(), s * 2.0);
        assert!(history.len() <= 3);
    }

    let oldest: Vec<f64> = history.iter().map(|(s, _)| s[0]).collect();
    assert_eq!(oldest, vec![8.0, 9.0, 10.0]);
}

#[test]
fn test_lbfgs_history_never_exceeds_window() {
    let history_size = 3;
    let lengths = HistoryLengths::default();
    let subscriber = tracing_subscriber::registry().with(lengths.clone());

    let mut x = Vector2::new(-1.2, 1.0);
    let result = tracing::subscriber::with_default(subscriber, || {
        LbfgsMinimizer::new(LbfgsConfig::new(1000, 1e-10).with_history_size(history_size))
            .minimize(&Rosenbrock::new(), &mut x)
    })
    .unwrap();
    assert!(result.is_converged());

    let recorded = lengths.0.lock().unwrap();
    assert!(recorded.len() + 1 >= result.iterations);
    assert!(recorded.iter().all(|&len| len <= history_size as u64));
    assert!(recorded.contains(&(history_size as u64)));
}

proptest! {
    #[test]
    fn prop_line_search_is_repeatable(x0 in -2.0..2.0f64, x1 in -1.0..3.0f64, scale in 1e-3..10.0f64) {
        let problem = Rosenbrock::new();
        let x = Vector2::new(x0, x1);
        let mut grad = Vector2::zeros();
        problem.gradient(&x, &mut grad);
        prop_assume!(grad.norm() > 1e-8);
        let direction = -grad;

        for strategy in strategies() {
            let first = strategy.search(&x, &direction, &problem, scale);
            let second = strategy.search(&x, &direction, &problem, scale);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_accepted_steps_satisfy_armijo(x0 in -2.0..2.0f64, x1 in -1.0..3.0f64) {
        let problem = Rosenbrock::new();
        let x = Vector2::new(x0, x1);
        let mut grad = Vector2::zeros();
        let f0 = problem.gradient(&x, &mut grad);
        prop_assume!(grad.norm() > 1e-8);
        let direction = -grad;
        let slope = grad.dot(&direction);
        let c1 = LineSearchConfig::default().sufficient_decrease;

        for strategy in strategies() {
            let alpha = strategy.search(&x, &direction, &problem, 1.0).unwrap();
            prop_assert!(alpha > 0.0 && alpha.is_finite());

            let f_new = problem.value(&(x + direction * alpha));
            prop_assert!(f_new <= f0 + c1 * alpha * slope);
        }
    }
}

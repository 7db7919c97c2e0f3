//! Criterion benchmarks for descent_optimiser.
//!
//! Covers single line searches on Rosenbrock, full minimisations of
//! Rosenbrock for each minimiser and SPD quadratics of growing dimension.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use descent_core::problems::{QuadraticProblem, Rosenbrock};
use descent_core::traits::Problem;
use descent_optimiser::prelude::*;
use nalgebra::{DVector, Dyn, Vector2};

/// Benchmark one search per strategy along steepest descent.
fn bench_line_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_search");
    let problem = Rosenbrock::new();
    let x = Vector2::new(-1.2, 1.0);
    let mut grad = Vector2::zeros();
    problem.gradient(&x, &mut grad);
    let direction = -grad;

    for strategy in [
        LineSearchStrategy::backtracking(),
        LineSearchStrategy::cubic_backtracking(),
        LineSearchStrategy::weak_wolfe_bisection(),
    ] {
        let label = format!("{:?}", strategy.method);
        group.bench_function(label, |b| {
            b.iter(|| strategy.search(black_box(&x), &direction, &problem, 1.0))
        });
    }

    group.finish();
}

/// Benchmark full Rosenbrock solves from the classic starting point.
fn bench_rosenbrock(c: &mut Criterion) {
    let mut group = c.benchmark_group("rosenbrock");
    let problem = Rosenbrock::new();
    let start = Vector2::new(-1.2, 1.0);

    group.bench_function("lbfgs", |b| {
        let mut minimizer = LbfgsMinimizer::new(LbfgsConfig::new(1000, 1e-10));
        b.iter(|| {
            let mut x = black_box(start);
            minimizer.minimize(&problem, &mut x)
        });
    });

    group.bench_function("newton", |b| {
        let mut minimizer = NewtonMinimizer::new(NewtonConfig::new(1000, 1e-10));
        b.iter(|| {
            let mut x = black_box(start);
            minimizer.minimize(&problem, &mut x)
        });
    });

    group.bench_function("conjugate_gradient", |b| {
        let mut minimizer = ConjugateGradientMinimizer::new(ConjugateGradientConfig::new(1000, 1e-8));
        b.iter(|| {
            let mut x = black_box(start);
            minimizer.minimize(&problem, &mut x)
        });
    });

    group.finish();
}

/// Benchmark quadratic solves by dimension.
fn bench_quadratic(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadratic");

    for size in [4, 16, 64] {
        let problem = QuadraticProblem::<f64, Dyn>::well_conditioned(size);

        group.bench_with_input(BenchmarkId::new("lbfgs", size), &size, |b, &n| {
            let mut minimizer = LbfgsMinimizer::new(LbfgsConfig::new(200, 1e-8));
            b.iter(|| {
                let mut x = DVector::zeros(n);
                minimizer.minimize(&problem, &mut x)
            });
        });

        group.bench_with_input(BenchmarkId::new("newton", size), &size, |b, &n| {
            let mut minimizer = NewtonMinimizer::new(NewtonConfig::new(5, 1e-8));
            b.iter(|| {
                let mut x = DVector::zeros(n);
                minimizer.minimize(&problem, &mut x)
            });
        });

        group.bench_with_input(BenchmarkId::new("conjugate_gradient", size), &size, |b, &n| {
            let config = ConjugateGradientConfig::new(200, 1e-8).with_update(ConjugateGradientUpdate::PolakRibierePlus);
            let mut minimizer = ConjugateGradientMinimizer::new(config);
            b.iter(|| {
                let mut x = DVector::zeros(n);
                minimizer.minimize(&problem, &mut x)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_line_search, bench_rosenbrock, bench_quadratic);
criterion_main!(benches);

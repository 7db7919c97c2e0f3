//! Criterion benchmarks for descent_core finite differences.
//!
//! Measures gradient stencils of every order and the gradient-differenced
//! Hessian across problem sizes to characterise scaling behaviour.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use descent_core::math::{finite_gradient, finite_hessian, FiniteDiffAccuracy};
use descent_core::problems::{QuadraticProblem, Rosenbrock};
use descent_core::traits::Problem;
use nalgebra::{DMatrix, DVector, Dyn, Matrix2, Vector2};

/// Smooth non-polynomial test function over a runtime dimension.
fn log_sum_exp(x: &DVector<f64>) -> f64 {
    x.iter().map(|v| v.exp()).sum::<f64>().ln()
}

/// Benchmark finite-difference gradients by stencil order and dimension.
fn bench_finite_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("finite_gradient");

    for size in [4, 16, 64] {
        let x = DVector::from_fn(size, |i, _| (i as f64 * 0.37).sin());

        for accuracy in FiniteDiffAccuracy::ALL {
            let label = format!("{:?}", accuracy);
            group.bench_with_input(BenchmarkId::new(label, size), &x, |b, x| {
                let mut grad = DVector::zeros(x.len());
                b.iter(|| {
                    finite_gradient(black_box(x), &mut grad, accuracy, log_sum_exp);
                    black_box(grad[0])
                });
            });
        }
    }

    group.finish();
}

/// Benchmark Hessians from analytic and from differenced gradients.
fn bench_finite_hessian(c: &mut Criterion) {
    let mut group = c.benchmark_group("finite_hessian");

    for size in [4, 16, 64] {
        let problem = QuadraticProblem::<f64, Dyn>::well_conditioned(size);
        let x = DVector::from_element(size, 0.5);

        group.bench_with_input(BenchmarkId::new("analytic_gradient", size), &x, |b, x| {
            let mut hess = DMatrix::zeros(size, size);
            b.iter(|| {
                finite_hessian(black_box(x), &mut hess, |v, g| {
                    problem.gradient(v, g);
                });
                black_box(hess[(0, 0)])
            });
        });

        group.bench_with_input(BenchmarkId::new("numeric_gradient", size), &x, |b, x| {
            let mut hess = DMatrix::zeros(size, size);
            b.iter(|| {
                finite_hessian(black_box(x), &mut hess, |v, g| {
                    finite_gradient(v, g, FiniteDiffAccuracy::Second, log_sum_exp)
                });
                black_box(hess[(0, 0)])
            });
        });
    }

    group.finish();
}

/// Benchmark the two Rosenbrock flavours on fixed-size vectors.
fn bench_rosenbrock(c: &mut Criterion) {
    let mut group = c.benchmark_group("rosenbrock");
    let x = Vector2::new(-1.2, 1.0);

    for (label, problem) in [
        ("analytic", Rosenbrock::new()),
        ("finite_difference", Rosenbrock::finite_difference()),
    ] {
        group.bench_function(BenchmarkId::new("gradient", label), |b| {
            let mut grad = Vector2::zeros();
            b.iter(|| problem.gradient(black_box(&x), &mut grad));
        });

        group.bench_function(BenchmarkId::new("hessian", label), |b| {
            let mut hess = Matrix2::zeros();
            b.iter(|| {
                problem.hessian(black_box(&x), &mut hess);
                black_box(hess[(0, 0)])
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_finite_gradient,
    bench_finite_hessian,
    bench_rosenbrock
);
criterion_main!(benches);

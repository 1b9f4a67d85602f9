use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simplexfit::routines::optimization::nelder_mead::{minimize_fn, Simplex};

fn benchmark_nelder_mead(c: &mut Criterion) {
    c.bench_function("initial_simplex_100", |b| {
        let x0: Vec<f64> = (0..100).map(|i| i as f64).collect();
        b.iter(|| {
            let _ = Simplex::from_initial_point(black_box(&x0));
        });
    });

    c.bench_function("paraboloid_2d", |b| {
        b.iter(|| {
            let _ = minimize_fn(
                |x| (x[0] - 3.0).powi(2) + (x[1] - 5.0).powi(2),
                black_box(&[0.0, 0.0]),
                1e-10,
            );
        });
    });

    c.bench_function("rosenbrock_2d", |b| {
        b.iter(|| {
            let _ = minimize_fn(
                |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
                black_box(&[-1.2, 1.0]),
                1e-12,
            );
        });
    });
}

criterion_group!(benches, benchmark_nelder_mead);
criterion_main!(benches);

use RustedRoots::numerical::root_finder::{RootFinder, SolverConfig, solve_expr};
use RustedRoots::symbolic::symbolic_engine::Expr;
use RustedRoots::symbolic::symbolic_engine_derivatives::DerivativeMode;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const EXPRESSION: &str = "sin(x) * x^3 - ln(x + 10) + e^(x/5) - 4";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse expression", |b| {
        b.iter(|| Expr::parse_expression(black_box(EXPRESSION)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let f = Expr::parse_expression(EXPRESSION).unwrap();
    c.bench_function("evaluate expression", |b| {
        b.iter(|| f.evaluate(black_box(1.3)))
    });
}

fn bench_solve(c: &mut Criterion) {
    let f = Expr::parse_expression(EXPRESSION).unwrap();
    let mut group = c.benchmark_group("solve");
    for mode in [DerivativeMode::CentralDifference, DerivativeMode::Symbolic] {
        let config = SolverConfig::new(1.0, 200, 1e-12)
            .unwrap()
            .with_derivative(mode);
        group.bench_function(format!("{}", mode), |b| {
            b.iter(|| solve_expr(black_box(&f), black_box(&config)))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let f = Expr::parse_expression(EXPRESSION).unwrap();
    let configs: Vec<SolverConfig> = (0..64)
        .map(|i| SolverConfig::new(-3.0 + 0.1 * i as f64, 200, 1e-12).unwrap())
        .collect();
    let finder = RootFinder::new();
    c.bench_function("solve batch of 64", |b| {
        b.iter(|| finder.solve_batch(black_box(&f), black_box(&configs)))
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_solve, bench_batch);
criterion_main!(benches);

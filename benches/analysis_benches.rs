use criterion::{Criterion, criterion_group, criterion_main};
use deriva_engine::numerical::analysis::{AnalysisRequest, analyze};
use deriva_engine::numerical::integration::{QuadratureConfig, integral};
use deriva_engine::numerical::roots::find_roots;
use deriva_engine::numerical::grid::Domain;
use deriva_engine::symbolic::compiler::Expression;
use std::hint::black_box;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile sin(x) + 0.5*x**4", |b| {
        b.iter(|| Expression::compile(black_box("sin(x) + 0.5*x**4")))
    });
}

fn bench_running_integral(c: &mut Criterion) {
    let expression = Expression::compile("exp(-x^2)*cos(3*x)").unwrap();
    let grid = Domain::new(-10.0, 10.0).unwrap().grid();
    let mut group = c.benchmark_group("running integral, 400 points");
    for parallel in [false, true] {
        let config = QuadratureConfig {
            parallel,
            ..QuadratureConfig::default()
        };
        group.bench_function(if parallel { "rayon" } else { "sequential" }, |b| {
            b.iter(|| integral(&expression, black_box(&grid), &config))
        });
    }
    group.finish();
}

fn bench_roots(c: &mut Criterion) {
    let domain = Domain::new(-10.0, 10.0).unwrap();
    c.bench_function("exact roots of a cubic", |b| {
        b.iter(|| find_roots(black_box("(x + 2)*(x - 2)*(x - 5)"), &domain))
    });
    c.bench_function("bracket sweep for sin(x) - 0.5", |b| {
        b.iter(|| find_roots(black_box("sin(x) - 0.5"), &domain))
    });
}

fn bench_full_analysis(c: &mut Criterion) {
    let request = AnalysisRequest::new(
        vec!["x^2 - 4".to_string(), "sin(x) + 0.5*x**4".to_string()],
        -10.0,
        10.0,
    );
    c.bench_function("full analysis of two functions", |b| {
        b.iter(|| analyze(black_box(&request)))
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_running_integral,
    bench_roots,
    bench_full_analysis
);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use RustedIVP::numerical::Examples_and_utils::SampleProblem;
use RustedIVP::numerical::solver_core::OdeSolver;
use RustedIVP::numerical::steppers::Method;
use strum::IntoEnumIterator;

fn bench_all_methods(c: &mut Criterion) {
    let problem = SampleProblem::GaussianPulse.problem().unwrap();
    let mut group = c.benchmark_group("GaussianPulse");
    for method in Method::iter() {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| {
                let mut solver = OdeSolver::new(black_box(&problem), method);
                solver.run().unwrap();
                black_box(solver.final_value())
            })
        });
    }
    group.finish();
}

fn bench_stiff_implicit(c: &mut Criterion) {
    let problem = SampleProblem::StiffRelaxation.problem().unwrap();
    c.bench_function("StiffRelaxation BE", |b| {
        b.iter(|| {
            let mut solver = OdeSolver::new(&problem, Method::BackwardEuler);
            solver.run().unwrap();
            black_box(solver.final_value())
        })
    });
}

criterion_group!(benches, bench_all_methods, bench_stiff_implicit);
criterion_main!(benches);

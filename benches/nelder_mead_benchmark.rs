use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nomad_core::core::{AoD, HNorm, VariableSpace, VariableType};
use nomad_core::solvers::nelder_mead::NelderMead;
use nomad_core::test_functions::rosenbrock::Rosenbrock;

fn unconstrained_space(n: usize) -> VariableSpace {
    VariableSpace {
        input_type: vec![VariableType::Continuous; n],
        granularity: AoD::zeros(n),
        lb: AoD::undefined(n),
        ub: AoD::undefined(n),
        fixed: vec![None; n],
    }
}

fn nelder_mead_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Nelder Mead");
    for n in [2, 3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("Rosenbrock", n), &n, |b, ndim| {
            let problem = Rosenbrock { n: *ndim };
            let nm = NelderMead::new(unconstrained_space(*ndim), HNorm::L2);
            let x0 = AoD::defined(vec![5.0; *ndim]);
            b.iter(|| {
                let summary = nm.minimize(&problem, &x0, 10_000);
                black_box(summary.fx);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, nelder_mead_benchmark);
criterion_main!(benches);

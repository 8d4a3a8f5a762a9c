use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nomad_core::core::{AoD, VariableSpace, VariableType, D, HNorm};
use nomad_core::solvers::mads::Mads;
use nomad_core::test_functions::sphere::Sphere;

fn unconstrained_space(n: usize) -> VariableSpace {
    VariableSpace {
        input_type: vec![VariableType::Continuous; n],
        granularity: AoD::zeros(n),
        lb: AoD::undefined(n),
        ub: AoD::undefined(n),
        fixed: vec![None; n],
    }
}

fn mads_sphere_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MADS");
    for n in [2, 3, 5, 10] {
        group.bench_with_input(BenchmarkId::new("Sphere", n), &n, |b, ndim| {
            let problem = Sphere { n: *ndim };
            let mads = Mads::new(unconstrained_space(*ndim), HNorm::L2);
            let x0 = AoD::defined(vec![1.0; *ndim]);
            b.iter(|| {
                let summary = mads.minimize(
                    &problem,
                    &x0,
                    AoD::defined(vec![1.0; *ndim]),
                    AoD::defined(vec![1e-9; *ndim]),
                    AoD::defined(vec![1e-12; *ndim]),
                    D::INF,
                    2_000,
                );
                black_box(summary.fx);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, mads_sphere_benchmark);
criterion_main!(benches);

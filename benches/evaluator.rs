//! Compare sequential vs parallel evaluation of the 8-period reference policy.
//!
//! Run with: `cargo bench --bench evaluator`

use backorder_sim::demand::IndependentDemand;
use backorder_sim::simulation::simulate_path;
use backorder_sim::{
    CostParameters, EvaluatorConfig, ParallelEvaluator, Policy, SequentialEvaluator,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn reference_instance() -> (Policy, CostParameters, IndependentDemand) {
    let policy = Policy::new(
        vec![true, true, false, true, false, true, true, true],
        vec![128.5, 56.9, 0.0, 84.6, 0.0, 101.9, 155.4, 165.6],
    )
    .expect("reference policy");
    let costs = CostParameters::new(
        48.0,
        0.5,
        12.0,
        vec![5.6, 4.2, 3.0, 2.0, 1.2, 0.6, 0.2, 0.0],
        98.0,
    )
    .expect("reference costs");
    let demand = IndependentDemand::normal(
        &[110.0, 40.0, 10.0, 62.0, 12.0, 80.0, 122.0, 130.0],
        &[22.0, 8.0, 2.0, 12.4, 2.4, 16.0, 24.4, 26.0],
    )
    .expect("reference demand");
    (policy, costs, demand)
}

fn bench_single_path(c: &mut Criterion) {
    let (policy, costs, _) = reference_instance();
    let demand = [110.0, 40.0, 10.0, 62.0, 12.0, 80.0, 122.0, 130.0];
    c.bench_function("simulate_path", |b| {
        b.iter(|| black_box(simulate_path(&policy, &costs, black_box(&demand))))
    });
}

fn bench_sequential_vs_parallel(c: &mut Criterion) {
    let (policy, costs, demand) = reference_instance();
    let config = EvaluatorConfig::default().with_relative_precision(0.002);

    let mut group = c.benchmark_group("evaluate");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        let evaluator = SequentialEvaluator::new(config.clone());
        b.iter(|| black_box(evaluator.evaluate_seeded(&policy, &costs, &demand, 42)))
    });

    group.bench_function("parallel", |b| {
        let evaluator = ParallelEvaluator::new(config.clone());
        b.iter(|| black_box(evaluator.evaluate(&policy, &costs, &demand, 42)))
    });

    group.finish();
}

criterion_group!(benches, bench_single_path, bench_sequential_vs_parallel);
criterion_main!(benches);

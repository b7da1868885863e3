/// Shielding model benchmarks
///
/// Building the leakage interpolant (triangulation plus gradient
/// estimation) against point queries and a full vault report.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vaultshield::shielding::{leak_fraction, transmission, BeamKind, ShieldingModel};
use vaultshield::vault::{generate_report, VaultPlan};

fn bench_model_build(c: &mut Criterion) {
    c.bench_function("shielding_model_build", |b| {
        b.iter(|| black_box(ShieldingModel::new().unwrap()));
    });
}

/// Queries against a prebuilt model, at a sample and between samples
fn bench_leak_fraction_query(c: &mut Criterion) {
    let model = ShieldingModel::new().unwrap();
    let mut group = c.benchmark_group("leak_fraction_query");

    for (angle, distance) in [(45.0, 2.0), (52.5, 2.25), (100.0, 5.5)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}deg_{}m", angle, distance)),
            &(angle, distance),
            |b, &(angle, distance)| {
                b.iter(|| model.leak_fraction(black_box(angle), black_box(distance)));
            },
        );
    }

    group.finish();
}

/// Free function rebuilds the model on every call
fn bench_leak_fraction_free_fn(c: &mut Criterion) {
    c.bench_function("leak_fraction_free_fn", |b| {
        b.iter(|| leak_fraction(black_box(52.5), black_box(2.25)));
    });
}

fn bench_transmission(c: &mut Criterion) {
    c.bench_function("transmission", |b| {
        b.iter(|| transmission(black_box(BeamKind::Leak), black_box(94.0)));
    });
}

fn bench_reference_report(c: &mut Criterion) {
    let model = ShieldingModel::new().unwrap();
    let plan = VaultPlan::reference().unwrap();
    let workload = plan.workload.weekly_workload();

    c.bench_function("reference_report", |b| {
        b.iter(|| generate_report(&model, black_box(&workload), black_box(&plan.points)));
    });
}

criterion_group!(
    benches,
    bench_model_build,
    bench_leak_fraction_query,
    bench_leak_fraction_free_fn,
    bench_transmission,
    bench_reference_report,
);
criterion_main!(benches);

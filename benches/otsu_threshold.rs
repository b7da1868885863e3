/// Otsu thresholding benchmarks
///
/// Cost is dominated by the histogram: linear in series length plus
/// linear in the maximum count.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vaultshield::threshold::{binarize, otsu_threshold};

/// A day of one-minute samples: background with treatment blocks
fn treatment_day(minutes: usize) -> Vec<u64> {
    (0..minutes)
        .map(|i| {
            let jitter = (i as u64 * 7919) % 13;
            if (i / 15) % 3 == 1 {
                330 + jitter * 7
            } else {
                18 + jitter
            }
        })
        .collect()
}

fn bench_otsu_series_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("otsu_threshold");

    for minutes in [60, 600, 1440, 14400] {
        let series = treatment_day(minutes);
        group.throughput(Throughput::Elements(minutes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &series, |b, series| {
            b.iter(|| otsu_threshold(black_box(series)));
        });
    }

    group.finish();
}

fn bench_otsu_histogram_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("otsu_histogram_width");

    for max in [1_000u64, 100_000, 1_000_000] {
        let mut series = treatment_day(1440);
        series.push(max);
        group.bench_with_input(BenchmarkId::from_parameter(max), &series, |b, series| {
            b.iter(|| otsu_threshold(black_box(series)));
        });
    }

    group.finish();
}

fn bench_binarize(c: &mut Criterion) {
    let series = treatment_day(1440);
    c.bench_function("binarize_1440", |b| {
        b.iter(|| binarize(black_box(&series), black_box(170)));
    });
}

criterion_group!(
    benches,
    bench_otsu_series_length,
    bench_otsu_histogram_width,
    bench_binarize,
);
criterion_main!(benches);

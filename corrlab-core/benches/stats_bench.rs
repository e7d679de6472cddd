//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Moving average over long series, several windows
//! 2. ACF and CCF at the default maximum lag
//! 3. One-step forecast with the additive model

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corrlab_core::domain::TimeSeries;
use corrlab_core::forecast::{AdditiveModelConfig, ForecastAdapter};
use corrlab_core::stats::{acf, ccf};
use corrlab_core::transforms::moving_average;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_prices(n: usize, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + i as f64 * 0.05 + ((i as f64 + phase) * 0.1).sin() * 10.0)
        .collect()
}

fn make_series(n: usize) -> TimeSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    TimeSeries::from_points(
        "BENCH",
        make_prices(n, 0.0)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (base + chrono::Duration::days(i as i64), v)),
    )
    .unwrap()
}

// ── 1. Moving average ────────────────────────────────────────────────

fn bench_moving_average(c: &mut Criterion) {
    let series = make_series(2520);
    let mut group = c.benchmark_group("moving_average");
    for window in [5usize, 20, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| moving_average(black_box(&series), w).unwrap())
        });
    }
    group.finish();
}

// ── 2. Correlation ───────────────────────────────────────────────────

fn bench_correlation(c: &mut Criterion) {
    let x = make_prices(2520, 0.0);
    let y = make_prices(2520, 7.0);

    c.bench_function("acf_2520_lag60", |b| {
        b.iter(|| acf(black_box(&x), 60).unwrap())
    });
    c.bench_function("ccf_2520_lag60", |b| {
        b.iter(|| ccf(black_box(&x), black_box(&y), 60).unwrap())
    });
}

// ── 3. Forecast ──────────────────────────────────────────────────────

fn bench_forecast(c: &mut Criterion) {
    let series = make_series(750);
    let factory = AdditiveModelConfig::default();
    let adapter = ForecastAdapter::new(&factory);

    c.bench_function("forecast_one_step_750", |b| {
        b.iter(|| {
            adapter
                .forecast_one_step(black_box(series.dates()), black_box(series.values()), "BENCH")
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_moving_average, bench_correlation, bench_forecast);
criterion_main!(benches);

//! Criterion benchmarks for the monthly pipeline hot paths.
//!
//! Benchmarks:
//! 1. Monthly aggregation of a long daily series
//! 2. Indicator computation (SMA, seeded EMA) over monthly closes
//! 3. Full multi-instrument pipeline

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use monthlab_core::indicators::{Indicator, SeededEma, Sma};
use monthlab_core::{aggregate_monthly, build_windows, DailyObservation};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_daily(symbol: &str, n: usize) -> Vec<DailyObservation> {
    let base_date = NaiveDate::from_ymd_opt(1990, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            DailyObservation {
                instrument_id: symbol.to_string(),
                date: base_date + Days::new(i as u64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_monthly");
    for &n in &[2_520usize, 12_600] {
        let daily = make_daily("SPY", n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &daily, |b, daily| {
            b.iter(|| aggregate_monthly(black_box(daily)))
        });
    }
    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let closes: Vec<f64> = (0..600).map(|i| 100.0 + (i as f64 * 0.3).cos()).collect();
    let sma = Sma::new(20);
    let ema = SeededEma::new(20);
    c.bench_function("sma_20_600_months", |b| b.iter(|| sma.compute(black_box(&closes))));
    c.bench_function("ema_20_600_months", |b| b.iter(|| ema.compute(black_box(&closes))));
}

fn bench_pipeline(c: &mut Criterion) {
    let mut daily = Vec::new();
    for symbol in ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH"] {
        daily.extend(make_daily(symbol, 5_000));
    }
    c.bench_function("build_windows_8_instruments", |b| {
        b.iter(|| build_windows(black_box(&daily)))
    });
}

criterion_group!(benches, bench_aggregate, bench_indicators, bench_pipeline);
criterion_main!(benches);

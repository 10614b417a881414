//! Pipeline benchmarks: symbol generation, seam merging, resampling and glue.
//!
//! Run with: `cargo bench --package contango-bench`

use contango_aggregate::resample;
use contango_bench::{minute_bars, monthly_source, overlapping_contracts};
use contango_fetch::glue::merge_newest_first;
use contango_fetch::{GlueOptions, fetch_continuous};
use contango_instruments::generate_contract_symbols_until;
use contango_types::{Timeframe, YearMonth};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn symbol_benchmark(c: &mut Criterion) {
    let start = YearMonth::new(2000, 1).unwrap();
    let mut group = c.benchmark_group("symbols");

    for years in [1u32, 10, 25] {
        let end = YearMonth::new(2000 + years as i32 - 1, 12).unwrap();
        group.throughput(Throughput::Elements(u64::from(years) * 12));
        group.bench_with_input(BenchmarkId::from_parameter(years), &end, |b, &end| {
            b.iter(|| generate_contract_symbols_until(black_box("BR"), start, end).unwrap());
        });
    }
    group.finish();
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for contracts in [4usize, 12, 36] {
        let series = overlapping_contracts(contracts, 10_000, 500);
        let rows: usize = series.iter().map(Vec::len).sum();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(contracts), &series, |b, series| {
            b.iter(|| merge_newest_first(black_box(series.clone())));
        });
    }
    group.finish();
}

fn resample_benchmark(c: &mut Criterion) {
    let from = chrono::DateTime::UNIX_EPOCH;
    let bars = minute_bars(from, 100_000, 100.0);
    let mut group = c.benchmark_group("resample");
    group.throughput(Throughput::Elements(bars.len() as u64));

    for timeframe in [Timeframe::Minute5, Timeframe::Minute30] {
        group.bench_with_input(
            BenchmarkId::from_parameter(timeframe),
            &bars,
            |b, bars| b.iter(|| resample(black_box(bars.clone()), timeframe)),
        );
    }
    group.finish();
}

fn glue_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (source, windows) = monthly_source(24);
    let options = GlueOptions::default();
    let today = chrono::Utc::now();

    c.bench_function("glue/24-contracts", |b| {
        b.to_async(&runtime).iter(|| async {
            fetch_continuous(&source, &windows, Timeframe::Day1, &options, today)
                .await
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    symbol_benchmark,
    merge_benchmark,
    resample_benchmark,
    glue_benchmark
);
criterion_main!(benches);

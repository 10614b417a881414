//! Synthetic fixtures for contango benchmarks.

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use contango_fetch::memory::InMemorySource;
use contango_types::{ContractWindow, GluedBar, RawBar, Timeframe};

/// Rollover buffer used by the fixtures.
pub const ROLLOVER_DAYS: i64 = 2;

const MOSCOW: FixedOffset = match FixedOffset::east_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("offset out of range"),
};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Minute bars starting at `from`, prices cycling upward from `base`.
#[must_use]
pub fn minute_bars(from: DateTime<Utc>, count: usize, base: f64) -> Vec<RawBar> {
    (0..count)
        .map(|i| {
            let time = (from + TimeDelta::minutes(i as i64)).with_timezone(&MOSCOW);
            let price = base + (i % 50) as f64 * 0.01;
            RawBar::new(time, price, price + 0.05, price - 0.05, price + 0.01, 10)
        })
        .collect()
}

/// Per-contract series that overlap by `overlap` bars at every seam.
///
/// Returned newest contract first, the order the glue fetcher produces.
#[must_use]
pub fn overlapping_contracts(
    contracts: usize,
    bars_per_contract: usize,
    overlap: usize,
) -> Vec<Vec<GluedBar>> {
    let stride = bars_per_contract.saturating_sub(overlap).max(1);
    let mut series: Vec<Vec<GluedBar>> = (0..contracts)
        .map(|c| {
            let from = epoch() + TimeDelta::minutes((c * stride) as i64);
            let symbol = format!("C{c:03}");
            minute_bars(from, bars_per_contract, 100.0 + c as f64)
                .into_iter()
                .map(|bar| GluedBar::new(symbol.clone(), bar))
                .collect()
        })
        .collect();
    series.reverse();
    series
}

/// An in-memory source with `contracts` monthly contracts of daily bars.
///
/// Returns the source together with the windows over it, newest first.
#[must_use]
pub fn monthly_source(contracts: usize) -> (InMemorySource, Vec<ContractWindow>) {
    let mut source = InMemorySource::new();
    let mut windows = Vec::with_capacity(contracts);
    let mut previous_end: Option<DateTime<Utc>> = None;

    for c in 0..contracts {
        let begin = epoch() + TimeDelta::days(30 * c as i64);
        let cancellation = begin + TimeDelta::days(30 + ROLLOVER_DAYS);
        let end = cancellation - TimeDelta::days(ROLLOVER_DAYS);
        let symbol = format!("C{c:03}");

        let bars: Vec<RawBar> = (0..40)
            .map(|d| {
                let time =
                    (begin - TimeDelta::days(5) + TimeDelta::days(d)).with_timezone(&MOSCOW);
                RawBar::new(time, 50.0, 51.0, 49.0, 50.5, 100)
            })
            .collect();
        source = source
            .with_contract(&symbol, cancellation)
            .with_bars(&symbol, Timeframe::Day1, bars);
        windows.push(ContractWindow::new(symbol, cancellation, previous_end.or(Some(begin)), end));
        previous_end = Some(end);
    }

    windows.reverse();
    (source, windows)
}

//! Continuous-series assembly from per-contract histories.
//!
//! Every window is fetched under a concurrency limit, clipped to its
//! `[begin, end]` range and merged chronologically. Where two contracts
//! report the same timestamp, the older contract's bar is kept.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use contango_types::{ContractWindow, GluedBar, RawBar, Timeframe};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::SourceError;
use crate::source::{ContractDataSource, HistoryRequest};

/// Default number of concurrent per-contract history fetches.
pub const DEFAULT_GLUE_CONCURRENCY: usize = 5;

/// Options for a glue run.
#[derive(Debug, Clone)]
pub struct GlueOptions {
    /// Exchange code.
    pub exchange: String,
    /// Board / class code.
    pub class_code: String,
    /// Maximum concurrent history fetches.
    pub max_concurrent: usize,
}

impl Default for GlueOptions {
    fn default() -> Self {
        Self {
            exchange: "MOEX".to_string(),
            class_code: "SPBFUT".to_string(),
            max_concurrent: DEFAULT_GLUE_CONCURRENCY,
        }
    }
}

/// Returns midnight of the current Moscow trading day, in UTC.
#[must_use]
pub fn moscow_today(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.with_timezone(&Moscow).date_naive();
    Moscow
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map_or(now, |t| t.with_timezone(&Utc))
}

/// Fetches every window and glues the results into one series.
///
/// A window without a `begin` starts at `today`. Windows whose begin lies
/// after their end are skipped without a provider call. Transient failures
/// and empty results of a single contract are logged and skipped.
///
/// # Errors
///
/// Returns the first configuration-class error raised by the source.
pub async fn fetch_continuous<S>(
    source: &S,
    windows: &[ContractWindow],
    timeframe: Timeframe,
    options: &GlueOptions,
    today: DateTime<Utc>,
) -> Result<Vec<GluedBar>, SourceError>
where
    S: ContractDataSource + ?Sized,
{
    let per_contract: Vec<Option<Vec<GluedBar>>> = stream::iter(windows)
        .map(|window| fetch_window(source, window, timeframe, options, today))
        .buffered(options.max_concurrent.max(1))
        .try_collect()
        .await?;

    let series = merge_newest_first(per_contract.into_iter().flatten().collect());
    debug!(
        timeframe = %timeframe,
        windows = windows.len(),
        bars = series.len(),
        "glued continuous series"
    );
    Ok(series)
}

/// Fetches and clips the history of a single window.
async fn fetch_window<S>(
    source: &S,
    window: &ContractWindow,
    timeframe: Timeframe,
    options: &GlueOptions,
    today: DateTime<Utc>,
) -> Result<Option<Vec<GluedBar>>, SourceError>
where
    S: ContractDataSource + ?Sized,
{
    let begin = window.begin.unwrap_or(today);
    if begin > window.end {
        debug!(symbol = %window.symbol, %begin, end = %window.end, "empty window, skipping");
        return Ok(None);
    }

    let request = HistoryRequest::new(
        options.exchange.as_str(),
        options.class_code.as_str(),
        window.symbol.as_str(),
        timeframe,
    )
    .with_from(Some(begin));

    let bars = match source.fetch_history(&request).await {
        Ok(Some(bars)) => bars,
        Ok(None) => {
            warn!(symbol = %window.symbol, timeframe = %timeframe, "no history returned");
            return Ok(None);
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(
                symbol = %window.symbol,
                timeframe = %timeframe,
                error = %e,
                "history fetch failed, skipping contract"
            );
            return Ok(None);
        }
    };

    let clipped = clip(bars, begin, window.end);
    if clipped.is_empty() {
        warn!(symbol = %window.symbol, timeframe = %timeframe, "no bars inside window");
        return Ok(None);
    }

    debug!(symbol = %window.symbol, bars = clipped.len(), "fetched window");
    Ok(Some(
        clipped
            .into_iter()
            .map(|bar| GluedBar::new(window.symbol.as_str(), bar))
            .collect(),
    ))
}

/// Keeps bars whose UTC open time lies in `[begin, end]`.
#[must_use]
pub fn clip(bars: Vec<RawBar>, begin: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RawBar> {
    bars.into_iter()
        .filter(|b| {
            let t = b.time_utc();
            t >= begin && t <= end
        })
        .collect()
}

/// Merges per-contract series given newest contract first.
///
/// The series are laid out oldest to newest, stably sorted by time, and
/// only the first bar of each timestamp is kept.
#[must_use]
pub fn merge_newest_first(per_contract: Vec<Vec<GluedBar>>) -> Vec<GluedBar> {
    let mut merged: Vec<GluedBar> = per_contract.into_iter().rev().flatten().collect();
    merged.sort_by_key(GluedBar::time_utc);
    merged.dedup_by_key(|b| b.time_utc());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemorySource, InjectedFailure};
    use chrono::{FixedOffset, TimeDelta};
    use std::time::Duration;

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn bar(d: u32, close: f64) -> RawBar {
        RawBar::new(day(d).with_timezone(&msk()), close, close, close, close, 1)
    }

    fn series(from: u32, to: u32, close: f64) -> Vec<RawBar> {
        (from..=to).map(|d| bar(d, close)).collect()
    }

    fn window(symbol: &str, begin: Option<u32>, end: u32) -> ContractWindow {
        ContractWindow::new(symbol, day(end) + TimeDelta::days(2), begin.map(day), day(end))
    }

    async fn glue_daily(
        source: &InMemorySource,
        windows: &[ContractWindow],
        today: DateTime<Utc>,
    ) -> Result<Vec<GluedBar>, SourceError> {
        fetch_continuous(source, windows, Timeframe::Day1, &GlueOptions::default(), today).await
    }

    #[tokio::test]
    async fn test_seam_keeps_older_contract() {
        // A covers days 1-10, B covers days 8-15. Both report day 9.
        let source = InMemorySource::new()
            .with_bars("A", Timeframe::Day1, series(1, 10, 1.0))
            .with_bars("B", Timeframe::Day1, series(8, 15, 2.0));
        let windows = vec![window("B", Some(8), 15), window("A", Some(1), 10)];

        let glued = glue_daily(&source, &windows, day(31)).await.unwrap();

        assert_eq!(glued.len(), 15);
        let day9 = glued.iter().find(|g| g.time_utc() == day(9)).unwrap();
        assert_eq!(day9.symbol, "A");
        assert!((day9.bar.close - 1.0).abs() < 1e-12);
        let day11 = glued.iter().find(|g| g.time_utc() == day(11)).unwrap();
        assert_eq!(day11.symbol, "B");
        assert!(glued.windows(2).all(|w| w[0].time_utc() < w[1].time_utc()));
    }

    #[tokio::test]
    async fn test_clip_is_inclusive() {
        let source = InMemorySource::new().with_bars("A", Timeframe::Day1, series(1, 20, 1.0));
        let windows = vec![window("A", Some(5), 10)];
        let glued = glue_daily(&source, &windows, day(31)).await.unwrap();
        assert_eq!(glued.len(), 6);
        assert_eq!(glued.first().unwrap().time_utc(), day(5));
        assert_eq!(glued.last().unwrap().time_utc(), day(10));
    }

    #[tokio::test]
    async fn test_open_begin_uses_today_and_skips_inverted() {
        let source = InMemorySource::new()
            .with_bars("OLD", Timeframe::Day1, series(1, 5, 1.0))
            .with_bars("LIVE", Timeframe::Day1, series(1, 20, 2.0));
        // OLD has no begin and ended before "today": skipped without a call.
        let windows = vec![window("LIVE", None, 20), window("OLD", None, 5)];

        let glued = glue_daily(&source, &windows, day(18)).await.unwrap();

        assert_eq!(source.history_calls(), 1);
        assert_eq!(glued.len(), 3);
        assert!(glued.iter().all(|g| g.symbol == "LIVE"));
    }

    #[tokio::test]
    async fn test_transient_failure_is_skipped() {
        let source = InMemorySource::new()
            .with_bars("A", Timeframe::Day1, series(1, 10, 1.0))
            .with_bars("B", Timeframe::Day1, series(8, 15, 2.0))
            .with_failure("B", InjectedFailure::Transient);
        let windows = vec![window("B", Some(10), 15), window("A", Some(1), 10)];

        let glued = glue_daily(&source, &windows, day(31)).await.unwrap();
        assert_eq!(glued.len(), 10);
        assert!(glued.iter().all(|g| g.symbol == "A"));
    }

    #[tokio::test]
    async fn test_missing_timestamp_aborts() {
        let source = InMemorySource::new()
            .with_bars("A", Timeframe::Day1, series(1, 10, 1.0))
            .with_failure("B", InjectedFailure::MissingTimestamp);
        let windows = vec![window("B", Some(10), 15), window("A", Some(1), 10)];

        let err = glue_daily(&source, &windows, day(31)).await.unwrap_err();
        assert!(matches!(err, SourceError::MissingTimestamp { .. }));
    }

    #[tokio::test]
    async fn test_empty_everywhere_is_empty_series() {
        let source = InMemorySource::new();
        let windows = vec![window("A", Some(1), 10)];
        let glued = glue_daily(&source, &windows, day(31)).await.unwrap();
        assert!(glued.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_cap_respected() {
        let mut source = InMemorySource::new().with_latency(Duration::from_millis(20));
        let mut windows = Vec::new();
        for i in 0..12u32 {
            let symbol = format!("C{i}");
            source = source.with_bars(&symbol, Timeframe::Day1, series(1, 2, 1.0));
            windows.push(window(&symbol, Some(1), 2));
        }
        let options = GlueOptions {
            max_concurrent: 3,
            ..GlueOptions::default()
        };

        fetch_continuous(&source, &windows, Timeframe::Day1, &options, day(31))
            .await
            .unwrap();

        assert_eq!(source.history_calls(), 12);
        assert!(source.peak_in_flight() <= 3);
        assert!(source.peak_in_flight() >= 2);
    }

    #[test]
    fn test_moscow_today() {
        // 22:30 UTC on Jan 15 is already Jan 16 in Moscow.
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap();
        assert_eq!(
            moscow_today(now),
            Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap()
        );
    }
}

//! In-memory contract data source.
//!
//! Serves fixture expiries and bars without any I/O. Used by tests and by
//! offline runs of the pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contango_types::{RawBar, Timeframe};

use crate::SourceError;
use crate::source::{ContractDataSource, HistoryRequest};

/// Failure injected for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behaves like an upstream outage.
    Transient,
    /// Behaves like a payload row without a timestamp.
    MissingTimestamp,
}

#[derive(Debug, Default)]
struct Fixtures {
    expiries: HashMap<String, DateTime<Utc>>,
    bars: HashMap<(String, Timeframe), Vec<RawBar>>,
    failures: HashMap<String, InjectedFailure>,
    failing_timeframes: HashSet<Timeframe>,
}

/// Deterministic [`ContractDataSource`] backed by in-process fixtures.
#[derive(Debug, Default)]
pub struct InMemorySource {
    fixtures: Mutex<Fixtures>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    lookups_in_flight: AtomicUsize,
    peak_lookups_in_flight: AtomicUsize,
    history_calls: AtomicUsize,
    expiry_calls: AtomicUsize,
}

impl InMemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every history call and expiry lookup, making concurrency observable.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Registers a contract expiry.
    #[must_use]
    pub fn with_contract(self, symbol: &str, cancellation: DateTime<Utc>) -> Self {
        self.set_expiry(symbol, cancellation);
        self
    }

    /// Registers bars for a contract and timeframe.
    #[must_use]
    pub fn with_bars(self, symbol: &str, timeframe: Timeframe, bars: Vec<RawBar>) -> Self {
        self.push_bars(symbol, timeframe, bars);
        self
    }

    /// Makes every call for `symbol` fail.
    #[must_use]
    pub fn with_failure(self, symbol: &str, failure: InjectedFailure) -> Self {
        self.lock().failures.insert(symbol.to_string(), failure);
        self
    }

    /// Makes every history call for `timeframe` fail as unsupported.
    #[must_use]
    pub fn with_failing_timeframe(self, timeframe: Timeframe) -> Self {
        self.lock().failing_timeframes.insert(timeframe);
        self
    }

    /// Sets or replaces a contract expiry.
    pub fn set_expiry(&self, symbol: &str, cancellation: DateTime<Utc>) {
        self.lock()
            .expiries
            .insert(symbol.to_string(), cancellation);
    }

    /// Appends bars for a contract and timeframe, keeping them sorted.
    pub fn push_bars(&self, symbol: &str, timeframe: Timeframe, bars: Vec<RawBar>) {
        let mut fixtures = self.lock();
        let entry = fixtures
            .bars
            .entry((symbol.to_string(), timeframe))
            .or_default();
        entry.extend(bars);
        entry.sort_by_key(RawBar::time_utc);
    }

    /// Returns the highest number of concurrent history calls observed.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Returns the highest number of concurrent expiry lookups observed.
    #[must_use]
    pub fn peak_lookups_in_flight(&self) -> usize {
        self.peak_lookups_in_flight.load(Ordering::SeqCst)
    }

    /// Returns the number of history calls served.
    #[must_use]
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of expiry lookups served.
    #[must_use]
    pub fn expiry_calls(&self) -> usize {
        self.expiry_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Fixtures> {
        self.fixtures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn injected(&self, symbol: &str) -> Result<(), SourceError> {
        match self.lock().failures.get(symbol) {
            Some(InjectedFailure::Transient) => {
                Err(SourceError::Provider(format!("injected outage for {symbol}")))
            }
            Some(InjectedFailure::MissingTimestamp) => Err(SourceError::MissingTimestamp {
                symbol: symbol.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Decrements the in-flight counter when a call finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContractDataSource for InMemorySource {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn lookup_expiry(
        &self,
        _exchange: &str,
        symbol: &str,
    ) -> Result<Option<DateTime<Utc>>, SourceError> {
        self.expiry_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.lookups_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.lookups_in_flight);
        self.peak_lookups_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if matches!(
            self.lock().failures.get(symbol),
            Some(InjectedFailure::Transient)
        ) {
            return Err(SourceError::Provider(format!("injected outage for {symbol}")));
        }
        Ok(self.lock().expiries.get(symbol).copied())
    }

    async fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<RawBar>>, SourceError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.lock().failing_timeframes.contains(&request.timeframe) {
            return Err(SourceError::UnsupportedTimeframe(request.timeframe));
        }
        self.injected(&request.symbol)?;

        let fixtures = self.lock();
        let Some(bars) = fixtures
            .bars
            .get(&(request.symbol.clone(), request.timeframe))
        else {
            return Ok(None);
        };
        let bars: Vec<RawBar> = bars
            .iter()
            .filter(|b| request.from.is_none_or(|from| b.time_utc() >= from))
            .copied()
            .collect();
        Ok((!bars.is_empty()).then_some(bars))
    }
}

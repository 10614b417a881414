//! Contract validity windows.
//!
//! Each dated contract is authoritative from the moment the previous
//! contract rolls off until `rollover` before its own expiry. Windows are
//! kept newest first.

use chrono::{DateTime, TimeDelta, Utc};
use contango_types::{ContractExpiry, ContractWindow};
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::source::ContractDataSource;

/// Default days before expiry at which a contract stops being front month.
pub const DEFAULT_ROLLOVER_DAYS: i64 = 2;

/// Default number of concurrent expiry lookups.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

/// Options for building contract windows.
#[derive(Debug, Clone)]
pub struct LimitsOptions {
    /// Exchange passed to the expiry lookup.
    pub exchange: String,
    /// Buffer subtracted from every expiry.
    pub rollover: TimeDelta,
    /// Maximum concurrent expiry lookups.
    pub lookup_concurrency: usize,
    /// Begin of the oldest window. `None` leaves it open.
    pub floor: Option<DateTime<Utc>>,
}

impl Default for LimitsOptions {
    fn default() -> Self {
        Self {
            exchange: "MOEX".to_string(),
            rollover: TimeDelta::days(DEFAULT_ROLLOVER_DAYS),
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            floor: None,
        }
    }
}

/// Looks up expiries for `symbols`, dropping any that fail or are unknown.
///
/// The result keeps the input order.
pub async fn fetch_expiries<S>(
    source: &S,
    exchange: &str,
    symbols: &[String],
    concurrency: usize,
) -> Vec<ContractExpiry>
where
    S: ContractDataSource + ?Sized,
{
    stream::iter(symbols)
        .map(|symbol| async move {
            match source.lookup_expiry(exchange, symbol).await {
                Ok(Some(cancellation)) => Some(ContractExpiry::new(symbol.as_str(), cancellation)),
                Ok(None) => {
                    debug!(symbol = %symbol, "no expiry reported, dropping contract");
                    None
                }
                Err(e) => {
                    debug!(symbol = %symbol, error = %e, "expiry lookup failed, dropping contract");
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(|found| async move { found })
        .collect()
        .await
}

/// Derives contiguous validity windows from contract expiries.
///
/// Contracts are sorted by expiry descending. A window ends `rollover`
/// before its contract expires and begins where the next older contract's
/// window ends. The oldest window begins at `floor`. Windows whose begin
/// would fall after their end are dropped. Fewer than two contracts yield
/// no windows.
#[must_use]
pub fn compute_windows(
    mut contracts: Vec<ContractExpiry>,
    rollover: TimeDelta,
    floor: Option<DateTime<Utc>>,
) -> Vec<ContractWindow> {
    if contracts.len() < 2 {
        return Vec::new();
    }
    contracts.sort_by(|a, b| b.cancellation.cmp(&a.cancellation));

    let ends: Vec<DateTime<Utc>> = contracts.iter().map(|c| c.cancellation - rollover).collect();

    contracts
        .into_iter()
        .enumerate()
        .filter_map(|(i, contract)| {
            let end = ends[i];
            let begin = ends.get(i + 1).copied().or(floor);
            if begin.is_some_and(|b| b > end) {
                debug!(symbol = %contract.symbol, "window begins after it ends, dropping");
                return None;
            }
            Some(ContractWindow::new(
                contract.symbol,
                contract.cancellation,
                begin,
                end,
            ))
        })
        .collect()
}

/// Restricts windows to those that can still hold bars at or after `start`.
///
/// Windows ending before `start` are dropped. If that would drop all of
/// them, the newest window is kept with its end raised to `start`.
#[must_use]
pub fn apply_start_override(
    windows: Vec<ContractWindow>,
    start: DateTime<Utc>,
) -> Vec<ContractWindow> {
    let newest = windows.first().cloned();
    let kept: Vec<ContractWindow> = windows.into_iter().filter(|w| w.end >= start).collect();

    match (kept.is_empty(), newest) {
        (true, Some(mut newest)) => {
            newest.end = start;
            vec![newest]
        }
        _ => kept,
    }
}

/// Builds windows for `symbols`, optionally restricted to `start_override`.
///
/// An empty result means there was nothing to build windows from.
pub async fn build_contract_limits<S>(
    source: &S,
    symbols: &[String],
    options: &LimitsOptions,
    start_override: Option<DateTime<Utc>>,
) -> Vec<ContractWindow>
where
    S: ContractDataSource + ?Sized,
{
    let contracts =
        fetch_expiries(source, &options.exchange, symbols, options.lookup_concurrency).await;
    let found = contracts.len();
    let windows = compute_windows(contracts, options.rollover, options.floor);
    let windows = match start_override {
        Some(start) if !windows.is_empty() => apply_start_override(windows, start),
        _ => windows,
    };
    debug!(
        requested = symbols.len(),
        found,
        windows = windows.len(),
        "built contract limits"
    );
    windows
}

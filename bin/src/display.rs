//! Display utilities for the contango CLI.

use anyhow::Result;
use contango_lib::{ContractWindow, FuturesListing, Timeframe};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

/// Adds a per-instrument spinner, hidden in quiet mode.
pub(crate) fn spinner(multi: &MultiProgress, instrument: &str, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")?);
    pb.set_prefix(format!("{instrument:>6}"));
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Formats per-timeframe insert counts as `D1=12 H1=0`.
pub(crate) fn format_counts(counts: &BTreeMap<Timeframe, u64>) -> String {
    counts
        .iter()
        .map(|(tf, n)| format!("{tf}={n}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats one contract window as a table row.
pub(crate) fn format_window(window: &ContractWindow) -> String {
    let begin = window
        .begin
        .map_or_else(|| "-".to_string(), |b| b.format("%Y-%m-%d %H:%M").to_string());
    format!(
        "{:<8} {:<17} {:<17} {}",
        window.symbol,
        begin,
        window.end.format("%Y-%m-%d %H:%M"),
        window.cancellation.format("%Y-%m-%d"),
    )
}

/// Formats one futures board row.
pub(crate) fn format_listing(listing: &FuturesListing) -> String {
    let last_trade = listing
        .last_trade_date
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    format!(
        "{:<10} {:<8} {:<12} {}",
        listing.secid,
        listing.asset_code.as_deref().unwrap_or("-"),
        last_trade,
        listing.short_name.as_deref().unwrap_or(""),
    )
}

/// Keeps listings whose asset code or contract code starts with `prefix`,
/// ordered by last trading day.
pub(crate) fn select_listings(
    mut listings: Vec<FuturesListing>,
    prefix: Option<&str>,
) -> Vec<FuturesListing> {
    if let Some(prefix) = prefix {
        let prefix = prefix.to_lowercase();
        listings.retain(|l| {
            l.secid.to_lowercase().starts_with(&prefix)
                || l.asset_code
                    .as_deref()
                    .is_some_and(|a| a.eq_ignore_ascii_case(&prefix))
        });
    }
    // Undated rows sort last.
    listings.sort_by(|a, b| {
        (a.last_trade_date.is_none(), a.last_trade_date, &a.secid).cmp(&(
            b.last_trade_date.is_none(),
            b.last_trade_date,
            &b.secid,
        ))
    });
    listings
}

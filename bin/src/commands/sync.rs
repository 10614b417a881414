//! Sync command.
//!
//! Updates the stored continuous series of several instruments, a bounded
//! number at a time, with one spinner per instrument.

use crate::config::open_store;
use crate::display::{format_counts, spinner};
use anyhow::{Context, Result};
use contango_lib::prelude::*;
use futures::stream::{self, StreamExt};
use indicatif::MultiProgress;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Execute the sync command.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn sync(
    instruments: &[String],
    timeframes: &[Timeframe],
    full: bool,
    parallel_instruments: usize,
    settings: SyncSettings,
    database_url: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let registry = InstrumentRegistry::builtin()?;
    // Fail fast on unknown instruments before touching the network.
    for id in instruments {
        registry.prefix(id)?;
    }

    let store: Arc<dyn CandleRepository> = Arc::new(open_store(database_url).await?);
    let source: Arc<dyn ContractDataSource> =
        Arc::new(IssClient::with_defaults().context("Failed to create ISS client")?);
    let mode = if full { SyncMode::Full } else { SyncMode::Incremental };
    let timeframes = (!timeframes.is_empty()).then_some(timeframes);

    let multi_progress = MultiProgress::new();

    let results: Vec<(String, Result<BTreeMap<Timeframe, u64>>)> = stream::iter(instruments)
        .map(|instrument| {
            let registry = &registry;
            let settings = settings.clone();
            let source = Arc::clone(&source);
            let store = Arc::clone(&store);
            let multi_progress = &multi_progress;
            async move {
                let result = async {
                    let pb = spinner(multi_progress, instrument, quiet)?;
                    pb.set_message(format!("syncing ({mode})"));
                    let downloader = FuturesHistoryDownloader::create(
                        instrument, registry, source, store, settings,
                    )
                    .await?;
                    let counts = downloader.update_all(timeframes, mode).await;
                    pb.finish_with_message(format_counts(&counts));
                    Ok::<_, anyhow::Error>(counts)
                }
                .await;
                (instrument.clone(), result)
            }
        })
        .buffer_unordered(parallel_instruments.max(1))
        .collect()
        .await;

    let mut failures = 0usize;
    if !quiet {
        println!("\nSync complete:");
    }
    for (instrument, result) in &results {
        match result {
            Ok(counts) => {
                if !quiet {
                    let total: u64 = counts.values().sum();
                    println!("  {instrument:<6} {total:>10} new candles");
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("  {instrument:<6} failed: {e:#}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} out of {} instruments failed", results.len());
    }
    Ok(())
}

//! Contract windows command.

use crate::display::format_window;
use anyhow::{Context, Result};
use contango_lib::prelude::*;
use contango_lib::{build_contract_limits, generate_contract_symbols};

/// Resolve expiries for an instrument and print its contract windows.
pub(crate) async fn show_contracts(instrument: &str, settings: &SyncSettings) -> Result<()> {
    let registry = InstrumentRegistry::builtin()?;
    let prefix = registry.prefix(instrument)?;
    let symbols = generate_contract_symbols(prefix, settings.start_month, settings.end_month)?;

    let client = IssClient::with_defaults().context("Failed to create ISS client")?;
    let windows =
        build_contract_limits(&client, &symbols, &settings.limits_options(), None).await;

    if windows.is_empty() {
        println!(
            "No contract windows for {instrument} ({} symbols checked).",
            symbols.len()
        );
        return Ok(());
    }

    println!("{:<8} {:<17} {:<17} EXPIRY", "SYMBOL", "BEGIN", "END");
    println!("{}", "-".repeat(56));
    for window in &windows {
        println!("{}", format_window(window));
    }
    println!("\nTotal: {} windows of {} symbols", windows.len(), symbols.len());
    Ok(())
}

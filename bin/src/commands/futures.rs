//! Futures board command.

use crate::display::{format_listing, select_listings};
use anyhow::{Context, Result};
use contango_lib::prelude::*;

/// List contracts currently traded on the MOEX futures board.
pub(crate) async fn list_futures(prefix: Option<&str>) -> Result<()> {
    let client = IssClient::with_defaults().context("Failed to create ISS client")?;
    let listings = client
        .list_futures()
        .await
        .context("Failed to load the futures board")?;
    let listings = select_listings(listings, prefix);

    if listings.is_empty() {
        println!("No futures found.");
        return Ok(());
    }

    println!("{:<10} {:<8} {:<12} NAME", "SECID", "ASSET", "LAST TRADE");
    println!("{}", "-".repeat(50));
    for listing in &listings {
        println!("{}", format_listing(listing));
    }
    println!("\nTotal: {} contracts", listings.len());
    Ok(())
}

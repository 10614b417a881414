//! Stored securities command.

use crate::config::open_store;
use anyhow::Result;
use contango_lib::prelude::*;

/// List stored securities with their candle counts.
pub(crate) async fn list_securities(database_url: Option<&str>) -> Result<()> {
    let store = open_store(database_url).await?;
    let securities = store.list_securities().await?;

    if securities.is_empty() {
        println!("No securities stored.");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:<8} {:<10} {:<10} {:>12}",
        "ID", "NAME", "PLATFORM", "STATUS", "TERM", "CANDLES"
    );
    println!("{}", "-".repeat(61));

    for security in &securities {
        let candles = store.count_candles(security.id, None).await?;
        println!(
            "{:<6} {:<10} {:<8} {:<10} {:<10} {:>12}",
            security.id,
            security.name,
            security.platform.as_str(),
            security.status.as_str(),
            security.term.as_str(),
            candles
        );
    }

    Ok(())
}

//! List command implementation.

use anyhow::Result;
use contango_lib::prelude::*;

/// List registry instruments with an optional search pattern.
pub(crate) fn list_instruments(search: Option<&str>) -> Result<()> {
    let registry = InstrumentRegistry::builtin()?;

    let instruments = match search {
        Some(pattern) => registry.search(pattern),
        None => registry.sorted(),
    };

    if instruments.is_empty() {
        println!("No instruments found.");
        return Ok(());
    }

    println!("{:<8} {:<8} {:<16} DESCRIPTION", "ID", "PREFIX", "NAME");
    println!("{}", "-".repeat(70));

    for instrument in &instruments {
        println!(
            "{:<8} {:<8} {:<16} {}",
            instrument.id(),
            instrument.prefix(),
            instrument.name(),
            instrument.description()
        );
    }

    println!("\nTotal: {} instruments", instruments.len());
    Ok(())
}

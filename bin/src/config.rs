//! Settings and database bootstrap for the CLI.

use anyhow::{Context, Result};
use contango_lib::{CandleRepository, SqliteStore, SyncSettings, YearMonth, default_database_path};
use std::path::Path;
use tracing::info;

/// Loads settings from an optional JSON file and applies flag overrides.
pub(crate) fn load_settings(
    path: Option<&Path>,
    start_month: Option<YearMonth>,
    end_month: Option<YearMonth>,
) -> Result<SyncSettings> {
    let mut settings = match path {
        Some(path) => SyncSettings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SyncSettings::default(),
    };

    if let Some(start) = start_month {
        settings.start_month = start;
    }
    if end_month.is_some() {
        settings.end_month = end_month;
    }
    if let Some(end) = settings.end_month
        && end < settings.start_month
    {
        anyhow::bail!("End month {end} is before start month {}", settings.start_month);
    }

    Ok(settings)
}

/// Opens the store at `url`, or the default database file, and applies the schema.
pub(crate) async fn open_store(url: Option<&str>) -> Result<SqliteStore> {
    let store = match url {
        Some(url) => SqliteStore::connect(url)
            .await
            .with_context(|| format!("Failed to connect to {url}"))?,
        None => {
            let path = default_database_path();
            info!(path = %path.display(), "using default database");
            SqliteStore::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?
        }
    };
    store.migrate().await.context("Failed to apply schema")?;
    Ok(store)
}

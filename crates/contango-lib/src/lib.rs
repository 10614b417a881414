//! Continuous-futures history pipeline for MOEX futures.
//!
//! This is a facade crate that re-exports functionality from the contango
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use contango_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = InstrumentRegistry::builtin()?;
//!     let store = SqliteStore::open(&default_database_path()).await?;
//!     store.migrate().await?;
//!     let store = Arc::new(store);
//!     let source = Arc::new(IssClient::with_defaults()?);
//!
//!     let downloader = FuturesHistoryDownloader::create(
//!         "BR",
//!         &registry,
//!         source,
//!         store,
//!         SyncSettings::default(),
//!     )
//!     .await?;
//!
//!     for (timeframe, inserted) in downloader.update_all(None, SyncMode::Incremental).await {
//!         println!("{timeframe}: {inserted} new candles");
//!     }
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use contango_types::*;

// Re-export instrument registry and contract codes
pub use contango_instruments::{
    InstrumentRegistry, generate_contract_symbols, generate_contract_symbols_until, month_code,
};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use contango_fetch::{
    Blocking, BlockingProvider, ClientConfig, ContractDataSource, FuturesListing, GlueOptions,
    IssClient, LimitsOptions, SourceError, build_contract_limits, fetch_continuous,
    memory::InMemorySource, moscow_today,
};

// Re-export resampling
#[cfg(feature = "aggregate")]
pub use contango_aggregate::{BarResampler, resample};

// Re-export storage
#[cfg(feature = "store")]
pub use contango_store::{CandleRepository, SqliteStore, StoreError, default_database_path};

// Re-export synchronisation
#[cfg(feature = "sync")]
pub use contango_sync::{FuturesHistoryDownloader, SyncMode, SyncSettings, normalize};

/// Prelude module for convenient imports.
///
/// ```
/// use contango_lib::prelude::*;
/// ```
pub mod prelude {
    pub use contango_types::{
        Candle, ContangoError, ContractWindow, Instrument, Result, Security, Timeframe, YearMonth,
    };

    pub use contango_instruments::InstrumentRegistry;

    #[cfg(feature = "fetch")]
    pub use contango_fetch::{ClientConfig, ContractDataSource, IssClient};

    #[cfg(feature = "store")]
    pub use contango_store::{CandleRepository, SqliteStore, default_database_path};

    #[cfg(feature = "sync")]
    pub use contango_sync::{FuturesHistoryDownloader, SyncMode, SyncSettings};
}

#[cfg(all(test, feature = "full"))]
mod tests {
    use super::prelude::*;
    use super::{InMemorySource, generate_contract_symbols};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_facade_wires_pipeline() {
        let registry = InstrumentRegistry::builtin().unwrap();
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let downloader = FuturesHistoryDownloader::create(
            "Si",
            &registry,
            Arc::new(InMemorySource::new()),
            store,
            SyncSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(downloader.prefix(), "Si");
        let err = downloader
            .update_timeframe(Timeframe::Day1, SyncMode::Incremental)
            .await
            .unwrap_err();
        assert!(matches!(err, ContangoError::NoContractLimits { .. }));
    }

    #[test]
    fn test_reexported_symbols() {
        let start = YearMonth::new(2024, 11).unwrap();
        let end = YearMonth::new(2025, 1).unwrap();
        let symbols = generate_contract_symbols("Si", start, Some(end)).unwrap();
        assert_eq!(symbols, ["SiX4", "SiZ4", "SiF5"]);
    }
}

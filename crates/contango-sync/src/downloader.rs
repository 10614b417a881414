//! Per-instrument history synchronisation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use contango_fetch::{ContractDataSource, build_contract_limits, fetch_continuous, moscow_today};
use contango_instruments::{InstrumentRegistry, generate_contract_symbols};
use contango_store::CandleRepository;
use contango_types::{ContangoError, ContractWindow, NewSecurity, Result, Security, Timeframe};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::normalize::{normalize, retain_after};
use crate::settings::{SyncMode, SyncSettings};

/// Keeps the stored continuous series of one futures instrument up to date.
pub struct FuturesHistoryDownloader {
    instrument: String,
    prefix: String,
    security: Security,
    source: Arc<dyn ContractDataSource>,
    repository: Arc<dyn CandleRepository>,
    settings: SyncSettings,
}

impl std::fmt::Debug for FuturesHistoryDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuturesHistoryDownloader")
            .field("instrument", &self.instrument)
            .field("prefix", &self.prefix)
            .field("security_id", &self.security.id)
            .field("source", &self.source.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FuturesHistoryDownloader {
    /// Resolves the instrument and makes sure its security row exists.
    ///
    /// Lookup ignores case; the security is always named by the registry id.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::UnknownInstrument`] if the registry has no
    /// prefix for `instrument`, or a storage error if the security cannot be
    /// created.
    pub async fn create(
        instrument: &str,
        registry: &InstrumentRegistry,
        source: Arc<dyn ContractDataSource>,
        repository: Arc<dyn CandleRepository>,
        settings: SyncSettings,
    ) -> Result<Self> {
        // The registry id, not the spelling given, names the security.
        let instrument = registry
            .get(instrument)
            .ok_or_else(|| ContangoError::UnknownInstrument(instrument.to_string()))?
            .id()
            .to_string();
        let prefix = registry.prefix(&instrument)?.to_string();
        let security = repository
            .get_or_create_security(&NewSecurity::moex_future(&instrument))
            .await?;
        debug!(
            instrument = %instrument,
            prefix = %prefix,
            security_id = security.id,
            "downloader ready"
        );

        Ok(Self {
            instrument,
            prefix,
            security,
            source,
            repository,
            settings,
        })
    }

    /// Returns the registry id of the instrument.
    #[must_use]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Returns the contract prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the stored security id.
    #[must_use]
    pub const fn security_id(&self) -> i64 {
        self.security.id
    }

    /// Returns the stored security.
    #[must_use]
    pub const fn security(&self) -> &Security {
        &self.security
    }

    /// Returns the sync settings.
    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Returns the dated contract codes covered by the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is blank.
    pub fn contract_symbols(&self) -> Result<Vec<String>> {
        generate_contract_symbols(&self.prefix, self.settings.start_month, self.settings.end_month)
    }

    /// Builds contract windows, optionally restricted to `start_override`.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::NoContractLimits`] if no windows can be built.
    pub async fn build_limits(
        &self,
        start_override: Option<DateTime<Utc>>,
    ) -> Result<Vec<ContractWindow>> {
        let symbols = self.contract_symbols()?;
        let windows = build_contract_limits(
            &*self.source,
            &symbols,
            &self.settings.limits_options(),
            start_override,
        )
        .await;

        if windows.is_empty() {
            return Err(ContangoError::NoContractLimits {
                instrument: self.instrument.clone(),
            });
        }
        Ok(windows)
    }

    /// Fetches and stores new candles for one timeframe.
    ///
    /// Returns the number of rows inserted; zero means already up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if no contract windows exist, if the provider reports
    /// a configuration-class failure, or if storage fails.
    pub async fn update_timeframe(&self, timeframe: Timeframe, mode: SyncMode) -> Result<u64> {
        let watermark = match mode {
            SyncMode::Incremental => {
                self.repository
                    .last_stored_datetime(self.security.id, timeframe)
                    .await?
            }
            SyncMode::Full => None,
        };
        debug!(
            instrument = %self.instrument,
            timeframe = %timeframe,
            mode = %mode,
            watermark = ?watermark,
            "starting update"
        );

        let windows = self.build_limits(watermark).await?;
        let glued = fetch_continuous(
            &*self.source,
            &windows,
            timeframe,
            &self.settings.glue_options(),
            moscow_today(Utc::now()),
        )
        .await?;

        if glued.is_empty() {
            info!(instrument = %self.instrument, timeframe = %timeframe, "no data returned");
            return Ok(0);
        }

        let normalized = normalize(&glued);
        let fresh = retain_after(normalized.candles, watermark);
        let inserted = self
            .repository
            .insert_candles(self.security.id, timeframe, &fresh)
            .await?;

        info!(
            instrument = %self.instrument,
            timeframe = %timeframe,
            mode = %mode,
            windows = windows.len(),
            fetched = glued.len(),
            rejected = normalized.rejected,
            inserted,
            "timeframe updated"
        );
        Ok(inserted)
    }

    /// Updates several timeframes concurrently.
    ///
    /// Defaults to [`Timeframe::batch_defaults`]. A failing timeframe is
    /// logged and reported as zero inserted rows.
    pub async fn update_all(
        &self,
        timeframes: Option<&[Timeframe]>,
        mode: SyncMode,
    ) -> BTreeMap<Timeframe, u64> {
        let timeframes = timeframes.unwrap_or(Timeframe::batch_defaults());

        let results = join_all(timeframes.iter().map(|&timeframe| async move {
            match self.update_timeframe(timeframe, mode).await {
                Ok(inserted) => (timeframe, inserted),
                Err(e) => {
                    error!(
                        instrument = %self.instrument,
                        timeframe = %timeframe,
                        error = %e,
                        "timeframe update failed"
                    );
                    (timeframe, 0)
                }
            }
        }))
        .await;

        results.into_iter().collect()
    }
}

//! Market-data source capability.
//!
//! The pipeline only ever talks to a [`ContractDataSource`]. Synchronous
//! client libraries implement [`BlockingProvider`] instead and are lifted
//! into the async capability with [`Blocking`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use contango_types::{RawBar, Timeframe};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SourceError;

/// Parameters of a history request for one dated contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Exchange code (e.g. "MOEX").
    pub exchange: String,
    /// Board / class code (e.g. "SPBFUT").
    pub class_code: String,
    /// Contract code.
    pub symbol: String,
    /// Requested bar grain.
    pub timeframe: Timeframe,
    /// Earliest bar of interest. Sources may return earlier bars.
    pub from: Option<DateTime<Utc>>,
}

impl HistoryRequest {
    /// Creates a request for the full history of `symbol`.
    #[must_use]
    pub fn new(
        exchange: impl Into<String>,
        class_code: impl Into<String>,
        symbol: impl Into<String>,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            class_code: class_code.into(),
            symbol: symbol.into(),
            timeframe,
            from: None,
        }
    }

    /// Sets the lower bound hint.
    #[must_use]
    pub const fn with_from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self
    }
}

/// Async market-data capability consumed by the pipeline.
#[async_trait]
pub trait ContractDataSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns the expiry of `symbol`, or `None` if the provider does not know it.
    async fn lookup_expiry(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<DateTime<Utc>>, SourceError>;

    /// Returns the bar history of one contract, or `None` if there is none.
    async fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<RawBar>>, SourceError>;
}

#[async_trait]
impl<T: ContractDataSource + ?Sized> ContractDataSource for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn lookup_expiry(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<DateTime<Utc>>, SourceError> {
        (**self).lookup_expiry(exchange, symbol).await
    }

    async fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<RawBar>>, SourceError> {
        (**self).fetch_history(request).await
    }
}

/// Contract details returned by a synchronous provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Contract expiry.
    pub cancellation: Option<DateTime<Utc>>,
    /// Price precision. Zero means integer prices.
    #[serde(default)]
    pub decimals: u32,
    /// Units per lot. Volumes are reported in lots.
    #[serde(default = "default_lot_size")]
    pub lot_size: i64,
}

const fn default_lot_size() -> i64 {
    1
}

/// One bar as a synchronous provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBar {
    /// Open time in seconds since the Unix epoch.
    pub time: Option<i64>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume in lots.
    pub volume: i64,
}

/// History response of a synchronous provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPayload {
    /// Bars in chronological order.
    #[serde(default)]
    pub history: Vec<ProviderBar>,
}

/// A synchronous market-data client.
pub trait BlockingProvider: Send + Sync + 'static {
    /// Returns the contract details of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    fn get_symbol_info(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<SymbolInfo>, SourceError>;

    /// Returns bars of `symbol` starting at `from_ts` (seconds since epoch).
    ///
    /// `timeframe` is the provider code from [`Timeframe::provider_code`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    fn get_history(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: &str,
        from_ts: i64,
    ) -> Result<Option<HistoryPayload>, SourceError>;
}

/// Adapter running a [`BlockingProvider`] on the blocking thread pool.
#[derive(Debug)]
pub struct Blocking<P> {
    provider: Arc<P>,
}

impl<P> Clone for Blocking<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: BlockingProvider> Blocking<P> {
    /// Wraps a synchronous provider.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Returns the wrapped provider.
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.provider
    }

    async fn symbol_info(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<SymbolInfo>, SourceError> {
        let provider = Arc::clone(&self.provider);
        let exchange = exchange.to_string();
        let symbol = symbol.to_string();
        tokio::task::spawn_blocking(move || provider.get_symbol_info(&exchange, &symbol)).await?
    }
}

#[async_trait]
impl<P: BlockingProvider> ContractDataSource for Blocking<P> {
    fn name(&self) -> &'static str {
        "blocking"
    }

    async fn lookup_expiry(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<DateTime<Utc>>, SourceError> {
        Ok(self
            .symbol_info(exchange, symbol)
            .await?
            .and_then(|info| info.cancellation))
    }

    async fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<RawBar>>, SourceError> {
        let provider = Arc::clone(&self.provider);
        let exchange = request.exchange.clone();
        let symbol = request.symbol.clone();
        let code = request.timeframe.provider_code();
        let from_ts = request.from.map_or(0, |t| t.timestamp());

        let payload = tokio::task::spawn_blocking(move || {
            provider.get_history(&exchange, &symbol, code, from_ts)
        })
        .await??;

        let Some(payload) = payload else {
            return Ok(None);
        };
        if payload.history.is_empty() {
            return Ok(None);
        }

        // Without symbol info the precision is unknown, so prices pass through as-is.
        let info = self.symbol_info(&request.exchange, &request.symbol).await?;
        let decimals = info.as_ref().map(|i| i.decimals);
        let lot_size = info.as_ref().map_or(1, |i| i.lot_size);

        let bars = payload
            .history
            .iter()
            .map(|bar| convert_bar(&request.symbol, bar, decimals, lot_size))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            bars = bars.len(),
            lot_size,
            "fetched history"
        );
        Ok(Some(bars))
    }
}

/// Converts one provider bar to exchange-local time, scaling volume by lot size.
fn convert_bar(
    symbol: &str,
    bar: &ProviderBar,
    decimals: Option<u32>,
    lot_size: i64,
) -> Result<RawBar, SourceError> {
    let time = bar
        .time
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .ok_or_else(|| SourceError::MissingTimestamp {
            symbol: symbol.to_string(),
        })?;

    Ok(RawBar::new(
        to_exchange_time(time),
        round_price(bar.open, decimals),
        round_price(bar.high, decimals),
        round_price(bar.low, decimals),
        round_price(bar.close, decimals),
        bar.volume.saturating_mul(lot_size),
    ))
}

/// Expresses a UTC instant in Moscow exchange time.
#[must_use]
pub fn to_exchange_time(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    time.with_timezone(&Moscow).fixed_offset()
}

fn round_price(price: f64, decimals: Option<u32>) -> f64 {
    decimals.map_or(price, |d| {
        let scale = 10f64.powi(d.min(12) as i32);
        (price * scale).round() / scale
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use std::sync::Mutex;

    struct FakeProvider {
        lot_size: i64,
        history: Vec<ProviderBar>,
        requested: Mutex<Vec<(String, i64)>>,
    }

    impl BlockingProvider for FakeProvider {
        fn get_symbol_info(
            &self,
            _exchange: &str,
            symbol: &str,
        ) -> Result<Option<SymbolInfo>, SourceError> {
            if symbol == "UNKNOWN" {
                return Ok(None);
            }
            Ok(Some(SymbolInfo {
                cancellation: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single(),
                decimals: 2,
                lot_size: self.lot_size,
            }))
        }

        fn get_history(
            &self,
            _exchange: &str,
            _symbol: &str,
            timeframe: &str,
            from_ts: i64,
        ) -> Result<Option<HistoryPayload>, SourceError> {
            self.requested
                .lock()
                .unwrap()
                .push((timeframe.to_string(), from_ts));
            Ok(Some(HistoryPayload {
                history: self.history.clone(),
            }))
        }
    }

    fn bar(time: Option<i64>) -> ProviderBar {
        ProviderBar {
            time,
            open: 80.123,
            high: 81.0,
            low: 80.0,
            close: 80.5,
            volume: 3,
        }
    }

    #[tokio::test]
    async fn test_blocking_applies_lot_size_and_local_time() {
        let source = Blocking::new(FakeProvider {
            lot_size: 10,
            history: vec![bar(Some(1_705_302_000))],
            requested: Mutex::new(Vec::new()),
        });
        let request = HistoryRequest::new("MOEX", "SPBFUT", "BRH4", Timeframe::Hour1);
        let bars = source.fetch_history(&request).await.unwrap().unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 30);
        assert!((bars[0].open - 80.12).abs() < 1e-9);
        // 2024-01-15 07:00 UTC is 10:00 in Moscow.
        assert_eq!(bars[0].time.hour(), 10);
        assert_eq!(bars[0].time.offset().local_minus_utc(), 3 * 3600);

        let requested = source.inner().requested.lock().unwrap().clone();
        assert_eq!(requested, vec![("M60".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_blocking_rejects_missing_time() {
        let source = Blocking::new(FakeProvider {
            lot_size: 1,
            history: vec![bar(Some(1_705_302_000)), bar(None)],
            requested: Mutex::new(Vec::new()),
        });
        let request = HistoryRequest::new("MOEX", "SPBFUT", "BRH4", Timeframe::Minute1);
        let err = source.fetch_history(&request).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_blocking_expiry_lookup() {
        let source = Blocking::new(FakeProvider {
            lot_size: 1,
            history: Vec::new(),
            requested: Mutex::new(Vec::new()),
        });
        assert!(source.lookup_expiry("MOEX", "BRH4").await.unwrap().is_some());
        assert!(source.lookup_expiry("MOEX", "UNKNOWN").await.unwrap().is_none());

        let request = HistoryRequest::new("MOEX", "SPBFUT", "BRH4", Timeframe::Day1);
        assert!(source.fetch_history(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blocking_keeps_precision_without_symbol_info() {
        let mut precise = bar(Some(1_705_302_000));
        precise.open = 80.1234;
        let source = Blocking::new(FakeProvider {
            lot_size: 10,
            history: vec![precise],
            requested: Mutex::new(Vec::new()),
        });
        let request = HistoryRequest::new("MOEX", "SPBFUT", "UNKNOWN", Timeframe::Day1);
        let bars = source.fetch_history(&request).await.unwrap().unwrap();

        assert!((bars[0].open - 80.1234).abs() < 1e-12);
        assert_eq!(bars[0].volume, 3);
    }

    #[test]
    fn test_round_price() {
        assert!((round_price(80.126, Some(2)) - 80.13).abs() < 1e-12);
        assert!((round_price(80.126, None) - 80.126).abs() < 1e-12);
    }
}

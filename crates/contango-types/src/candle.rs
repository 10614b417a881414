//! Candle data representation.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bar as delivered by the market-data provider.
///
/// The timestamp keeps the offset the provider reported it in (for MOEX this
/// is Moscow time). Normalization converts it to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Bar open time in the provider's offset.
    pub time: DateTime<FixedOffset>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume in contracts.
    pub volume: i64,
}

impl RawBar {
    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(
        time: DateTime<FixedOffset>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the bar open time in UTC.
    #[must_use]
    pub fn time_utc(&self) -> DateTime<Utc> {
        self.time.with_timezone(&Utc)
    }
}

/// A raw bar tagged with the dated contract it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GluedBar {
    /// Contract symbol the bar came from.
    pub symbol: String,
    /// The bar itself.
    pub bar: RawBar,
}

impl GluedBar {
    /// Creates a new glued bar.
    #[must_use]
    pub fn new(symbol: impl Into<String>, bar: RawBar) -> Self {
        Self {
            symbol: symbol.into(),
            bar,
        }
    }

    /// Returns the bar open time in UTC.
    #[must_use]
    pub fn time_utc(&self) -> DateTime<Utc> {
        self.bar.time_utc()
    }
}

/// Errors raised when a row violates OHLCV invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CandleError {
    /// A price was NaN or infinite.
    #[error("{field} must be a finite price, got {value}")]
    InvalidPrice {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Open or close fell outside the `[low, high]` range.
    #[error("{field} {value} outside of [{low}, {high}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Bar low.
        low: f64,
        /// Bar high.
        high: f64,
    },

    /// Volume was negative.
    #[error("volume must be non-negative, got {0}")]
    NegativeVolume(i64),
}

/// A validated OHLCV row in storage form.
///
/// Invariants: `low <= open, close <= high`, finite prices and `volume >= 0`.
/// Prices may be zero or negative (spreads, negative-price contracts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time (UTC).
    pub datetime: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: i64,
}

impl Candle {
    /// Creates a candle, validating OHLCV invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is not finite, if open or close fall
    /// outside `[low, high]`, or if volume is negative.
    pub fn new(
        datetime: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Result<Self, CandleError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() {
                return Err(CandleError::InvalidPrice { field, value });
            }
        }
        for (field, value) in [("open", open), ("close", close)] {
            if value < low || value > high {
                return Err(CandleError::OutOfRange {
                    field,
                    value,
                    low,
                    high,
                });
            }
        }
        if volume < 0 {
            return Err(CandleError::NegativeVolume(volume));
        }

        Ok(Self {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

impl TryFrom<&RawBar> for Candle {
    type Error = CandleError;

    fn try_from(bar: &RawBar) -> Result<Self, Self::Error> {
        Self::new(
            bar.time_utc(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn msk() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_valid_candle() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
        let candle = Candle::new(ts, 80.5, 81.0, 80.0, 80.9, 1200).unwrap();
        assert!((candle.range() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_open_outside_range_rejected() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
        let err = Candle::new(ts, 82.0, 81.0, 80.0, 80.9, 10).unwrap_err();
        assert!(matches!(err, CandleError::OutOfRange { field: "open", .. }));
    }

    #[test]
    fn test_close_below_low_rejected() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
        let err = Candle::new(ts, 80.5, 81.0, 80.0, 79.9, 10).unwrap_err();
        assert!(matches!(err, CandleError::OutOfRange { field: "close", .. }));
    }

    #[test]
    fn test_non_finite_prices_rejected() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
        assert!(matches!(
            Candle::new(ts, f64::NAN, 1.0, 0.5, 0.5, 1),
            Err(CandleError::InvalidPrice { field: "open", .. })
        ));
        assert!(Candle::new(ts, 1.0, f64::INFINITY, 0.5, 0.5, 1).is_err());
    }

    #[test]
    fn test_zero_and_negative_prices_accepted() {
        let ts = Utc.with_ymd_and_hms(2020, 4, 20, 18, 0, 0).unwrap();
        let candle = Candle::new(ts, -1.0, 0.5, -2.0, 0.0, 10).unwrap();
        assert!((candle.range() - 2.5).abs() < 1e-10);
        assert!(Candle::new(ts, 0.0, 0.0, 0.0, 0.0, 0).is_ok());
    }

    #[test]
    fn test_negative_volume_rejected() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
        assert_eq!(
            Candle::new(ts, 1.0, 1.0, 1.0, 1.0, -1).unwrap_err(),
            CandleError::NegativeVolume(-1)
        );
    }

    #[test]
    fn test_raw_bar_converts_to_utc() {
        let time = msk().with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let bar = RawBar::new(time, 80.5, 81.0, 80.0, 80.9, 5);
        let candle = Candle::try_from(&bar).unwrap();
        assert_eq!(
            candle.datetime,
            Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap()
        );
    }
}

//! Error types for contango.

use thiserror::Error;

use crate::{CandleError, Timeframe};

/// Result type alias for contango operations.
pub type Result<T> = std::result::Result<T, ContangoError>;

/// Errors that can occur while building, fetching and storing continuous series.
#[derive(Error, Debug)]
pub enum ContangoError {
    /// Instrument not present in the registry.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Contract prefix is empty or malformed.
    #[error("Invalid contract prefix: '{0}'")]
    InvalidPrefix(String),

    /// Month string could not be parsed.
    #[error(transparent)]
    Month(#[from] MonthParseError),

    /// Provider payload had no timestamp for a bar.
    #[error("Missing timestamp in history for {symbol}")]
    MissingTimestamp {
        /// Contract whose payload was malformed.
        symbol: String,
    },

    /// The provider cannot serve the requested timeframe.
    #[error("Timeframe {0} is not supported by the provider")]
    UnsupportedTimeframe(Timeframe),

    /// A candle violated OHLCV invariants.
    #[error(transparent)]
    InvalidCandle(#[from] CandleError),

    /// No usable contracts to build windows from.
    #[error("No contract limits for {instrument}")]
    NoContractLimits {
        /// The instrument that had no windows.
        instrument: String,
    },

    /// Upstream provider failure.
    #[error("Source error: {0}")]
    Source(String),

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContangoError {
    /// Returns true for configuration-class errors that must not be retried.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownInstrument(_)
                | Self::InvalidPrefix(_)
                | Self::Month(_)
                | Self::MissingTimestamp { .. }
                | Self::UnsupportedTimeframe(_)
        )
    }
}

/// Error for month strings that are not `YYYY-MM`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(ContangoError::UnknownInstrument("XX".into()).is_configuration());
        assert!(
            ContangoError::MissingTimestamp {
                symbol: "BRH4".into()
            }
            .is_configuration()
        );
        assert!(ContangoError::UnsupportedTimeframe(Timeframe::Minute5).is_configuration());
        assert!(!ContangoError::Source("timeout".into()).is_configuration());
        assert!(
            !ContangoError::NoContractLimits {
                instrument: "BR".into()
            }
            .is_configuration()
        );
    }
}

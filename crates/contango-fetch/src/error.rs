//! Provider error types.

use contango_types::{ContangoError, Timeframe};
use thiserror::Error;

/// Errors raised by market-data sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} attempts")]
    Timeout(u32),

    /// Server returned an error status.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// Payload did not have the expected shape.
    #[error("Malformed payload for {symbol}: {message}")]
    Decode {
        /// Contract the payload belonged to.
        symbol: String,
        /// What was wrong with it.
        message: String,
    },

    /// A history row carried no timestamp.
    #[error("Missing timestamp in history for {symbol}")]
    MissingTimestamp {
        /// Contract whose payload was malformed.
        symbol: String,
    },

    /// The provider cannot serve the requested timeframe.
    #[error("Timeframe {0} is not supported by the provider")]
    UnsupportedTimeframe(Timeframe),

    /// Provider-reported failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A blocking worker panicked or was cancelled.
    #[error("Blocking task failed: {0}")]
    Join(String),
}

impl SourceError {
    /// Returns true for configuration-class errors.
    ///
    /// These abort a whole glue run instead of being treated as "no data"
    /// for a single contract.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingTimestamp { .. } | Self::UnsupportedTimeframe(_)
        )
    }

    /// Creates a decode error.
    pub fn decode(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            symbol: symbol.into(),
            message: message.into(),
        }
    }
}

impl From<tokio::task::JoinError> for SourceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}

impl From<SourceError> for ContangoError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MissingTimestamp { symbol } => Self::MissingTimestamp { symbol },
            SourceError::UnsupportedTimeframe(tf) => Self::UnsupportedTimeframe(tf),
            other => Self::Source(other.to_string()),
        }
    }
}

//! Dated contract expiry and validity windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dated futures contract together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractExpiry {
    /// Exchange contract code (e.g. "BRH4").
    pub symbol: String,
    /// Expiry instant reported by the provider.
    pub cancellation: DateTime<Utc>,
}

impl ContractExpiry {
    /// Creates a new contract expiry.
    #[must_use]
    pub fn new(symbol: impl Into<String>, cancellation: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            cancellation,
        }
    }
}

/// The interval during which a dated contract is the front month.
///
/// `begin` is `None` for the oldest contract when no history floor is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractWindow {
    /// Exchange contract code.
    pub symbol: String,
    /// Contract expiry.
    pub cancellation: DateTime<Utc>,
    /// Start of the window (inclusive).
    pub begin: Option<DateTime<Utc>>,
    /// End of the window (inclusive), `cancellation` minus the rollover buffer.
    pub end: DateTime<Utc>,
}

impl ContractWindow {
    /// Creates a new contract window.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        cancellation: DateTime<Utc>,
        begin: Option<DateTime<Utc>>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            cancellation,
            begin,
            end,
        }
    }

    /// Returns true if `time` falls inside the window.
    ///
    /// A missing `begin` is treated as unbounded.
    #[must_use]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.begin.is_none_or(|begin| time >= begin) && time <= self.end
    }
}

impl std::fmt::Display for ContractWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.begin {
            Some(begin) => write!(f, "{} [{} .. {}]", self.symbol, begin, self.end),
            None => write!(f, "{} [.. {}]", self.symbol, self.end),
        }
    }
}

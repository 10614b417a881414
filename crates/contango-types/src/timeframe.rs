//! Candle timeframe definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle sampling granularity.
///
/// The timeframe is part of the candle uniqueness key, so the same timestamp
/// may be stored once per timeframe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Timeframe {
    /// 1-minute bars.
    #[serde(rename = "M1")]
    Minute1,
    /// 5-minute bars.
    #[serde(rename = "M5")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "M15")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "M30")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "H1")]
    Hour1,
    /// Daily bars.
    #[default]
    #[serde(rename = "D1")]
    Day1,
}

impl Timeframe {
    /// Returns the bar duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Day1 => 86400,
        }
    }

    /// Returns the bar duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        self.seconds() / 60
    }

    /// Returns true for bars shorter than a trading day.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        !matches!(self, Self::Day1)
    }

    /// Returns the storage code used in the candle table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "M1",
            Self::Minute5 => "M5",
            Self::Minute15 => "M15",
            Self::Minute30 => "M30",
            Self::Hour1 => "H1",
            Self::Day1 => "D1",
        }
    }

    /// Returns the code the market-data provider expects for this grain.
    #[must_use]
    pub const fn provider_code(&self) -> &'static str {
        match self {
            Self::Minute1 => "M1",
            Self::Minute5 => "M5",
            Self::Minute15 => "M15",
            Self::Minute30 => "M30",
            Self::Hour1 => "M60",
            Self::Day1 => "D1",
        }
    }

    /// Returns all available timeframes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Day1,
        ]
    }

    /// Returns the timeframes refreshed by a batch update when none are given.
    #[must_use]
    pub const fn batch_defaults() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Hour1,
            Self::Day1,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m1" | "1m" | "minute" | "minute1" => Ok(Self::Minute1),
            "m5" | "5m" | "minute5" => Ok(Self::Minute5),
            "m15" | "15m" | "minute15" => Ok(Self::Minute15),
            "m30" | "30m" | "minute30" => Ok(Self::Minute30),
            "h1" | "1h" | "m60" | "hour" | "hour1" => Ok(Self::Hour1),
            "d1" | "1d" | "day" | "day1" | "daily" => Ok(Self::Day1),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', expected one of: M1, M5, M15, M30, H1, D1",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}

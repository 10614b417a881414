//! Sync configuration.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use contango_fetch::glue::DEFAULT_GLUE_CONCURRENCY;
use contango_fetch::limits::{DEFAULT_LOOKUP_CONCURRENCY, DEFAULT_ROLLOVER_DAYS};
use contango_fetch::{GlueOptions, LimitsOptions};
use contango_types::{Result, YearMonth};
use serde::{Deserialize, Serialize};

/// Whether a sync resumes from the stored watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Only fetch and store bars after the latest stored candle.
    #[default]
    Incremental,
    /// Rebuild the whole series; existing rows are left untouched.
    Full,
}

impl SyncMode {
    /// Returns the mode as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incremental" | "inc" => Ok(Self::Incremental),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown sync mode '{other}'")),
        }
    }
}

/// Settings shared by every timeframe of an instrument sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Exchange code passed to the provider.
    pub exchange: String,
    /// Board / class code passed to the provider.
    pub class_code: String,
    /// First contract month to consider.
    pub start_month: YearMonth,
    /// Last contract month to consider. Defaults to the current month.
    pub end_month: Option<YearMonth>,
    /// Days before expiry at which a contract rolls off.
    pub rollover_days: i64,
    /// Concurrent per-contract history fetches.
    pub glue_concurrency: usize,
    /// Concurrent expiry lookups.
    pub lookup_concurrency: usize,
    /// Earliest instant the oldest contract window may start at.
    pub history_floor: Option<DateTime<Utc>>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            exchange: "MOEX".to_string(),
            class_code: "SPBFUT".to_string(),
            start_month: YearMonth::new(2022, 3).unwrap_or_else(YearMonth::current),
            end_month: None,
            rollover_days: DEFAULT_ROLLOVER_DAYS,
            glue_concurrency: DEFAULT_GLUE_CONCURRENCY,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            history_floor: None,
        }
    }
}

impl SyncSettings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Returns the options for building contract windows.
    #[must_use]
    pub fn limits_options(&self) -> LimitsOptions {
        LimitsOptions {
            exchange: self.exchange.clone(),
            rollover: TimeDelta::days(self.rollover_days),
            lookup_concurrency: self.lookup_concurrency,
            floor: self.history_floor,
        }
    }

    /// Returns the options for the glue fetcher.
    #[must_use]
    pub fn glue_options(&self) -> GlueOptions {
        GlueOptions {
            exchange: self.exchange.clone(),
            class_code: self.class_code.clone(),
            max_concurrent: self.glue_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.exchange, "MOEX");
        assert_eq!(settings.class_code, "SPBFUT");
        assert_eq!(settings.start_month.to_string(), "2022-03");
        assert_eq!(settings.end_month, None);
        assert_eq!(settings.rollover_days, 2);
        assert_eq!(settings.glue_concurrency, 5);
        assert_eq!(settings.lookup_concurrency, 8);
        assert_eq!(settings.limits_options().rollover, TimeDelta::days(2));
        assert_eq!(settings.glue_options().max_concurrent, 5);
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"start_month": "2023-06", "glue_concurrency": 2}}"#).unwrap();

        let settings = SyncSettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.start_month.to_string(), "2023-06");
        assert_eq!(settings.glue_concurrency, 2);
        assert_eq!(settings.exchange, "MOEX");
    }

    #[test]
    fn test_bad_month_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"start_month": "March"}}"#).unwrap();
        assert!(SyncSettings::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_sync_mode_parse() {
        assert_eq!("FULL".parse::<SyncMode>().unwrap(), SyncMode::Full);
        assert_eq!("incremental".parse::<SyncMode>().unwrap(), SyncMode::Incremental);
        assert!("partial".parse::<SyncMode>().is_err());
        assert_eq!(SyncMode::default(), SyncMode::Incremental);
    }
}

//! Instrument registry.

use std::collections::HashMap;

use contango_types::{ContangoError, Instrument, Result};

/// The instrument metadata JSON embedded at compile time.
const INSTRUMENTS_JSON: &str = include_str!("../data/instruments.json");

/// Registry of supported futures underlyings.
#[derive(Debug, Clone)]
pub struct InstrumentRegistry {
    instruments: HashMap<String, Instrument>,
}

impl InstrumentRegistry {
    /// Loads the registry bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json(INSTRUMENTS_JSON)
    }

    /// Builds a registry from a JSON object keyed by instrument code.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a map of instruments.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: HashMap<String, Instrument> = serde_json::from_str(json)?;
        Ok(Self::from_instruments(parsed.into_values()))
    }

    /// Builds a registry from instrument values.
    #[must_use]
    pub fn from_instruments(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let instruments = instruments
            .into_iter()
            .map(|i| (i.id().to_lowercase(), i))
            .collect();
        Self { instruments }
    }

    /// Looks up an instrument by code (case-insensitive).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Instrument> {
        self.instruments.get(&id.to_lowercase())
    }

    /// Resolves the contract prefix for an instrument.
    ///
    /// # Errors
    ///
    /// Returns [`ContangoError::UnknownInstrument`] if the code is not
    /// registered and [`ContangoError::InvalidPrefix`] if its prefix is blank.
    pub fn prefix(&self, id: &str) -> Result<&str> {
        let instrument = self
            .get(id)
            .ok_or_else(|| ContangoError::UnknownInstrument(id.to_string()))?;
        let prefix = instrument.prefix();
        if prefix.trim().is_empty() {
            return Err(ContangoError::InvalidPrefix(prefix.to_string()));
        }
        Ok(prefix)
    }

    /// Returns all instruments as an iterator.
    pub fn all(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    /// Returns the total number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Searches instruments by code or name (case-insensitive).
    pub fn search(&self, pattern: &str) -> Vec<&Instrument> {
        let pattern = pattern.to_lowercase();
        let mut found: Vec<&Instrument> = self
            .instruments
            .values()
            .filter(|i| {
                i.id().to_lowercase().contains(&pattern)
                    || i.name().to_lowercase().contains(&pattern)
            })
            .collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        found
    }

    /// Returns all instruments sorted by code.
    pub fn sorted(&self) -> Vec<&Instrument> {
        let mut all: Vec<&Instrument> = self.instruments.values().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }
}

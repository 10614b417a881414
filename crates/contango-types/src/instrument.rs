//! Futures underlying definitions.

use serde::{Deserialize, Serialize};

/// A tradable futures underlying and the code its dated contracts start with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Registry key (e.g. "BR").
    id: String,
    /// Human-readable name (e.g. "Brent Crude Oil").
    name: String,
    /// Contract code prefix (e.g. "BR", "Si").
    prefix: String,
    /// Description of the instrument.
    #[serde(default)]
    description: String,
}

impl Instrument {
    /// Creates a new instrument.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prefix: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prefix: prefix.into(),
            description: description.into(),
        }
    }

    /// Returns the registry key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contract code prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_accessors() {
        let br = Instrument::new("BR", "Brent", "BR", "Brent crude oil futures");
        assert_eq!(br.id(), "BR");
        assert_eq!(br.prefix(), "BR");
        assert_eq!(br.to_string(), "Brent (BR)");
    }

    #[test]
    fn test_description_defaults_when_absent() {
        let inst: Instrument =
            serde_json::from_str(r#"{"id":"Si","name":"USD/RUB","prefix":"Si"}"#).unwrap();
        assert_eq!(inst.description(), "");
    }
}

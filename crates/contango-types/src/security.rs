//! Persisted security records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the stored string form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($code => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

string_enum! {
    /// Trading venue a security belongs to.
    Platform {
        /// Bybit derivatives.
        Pybit => "pybit",
        /// Moscow Exchange.
        Moex => "moex",
    }
}

string_enum! {
    /// Lifecycle status of a security.
    SecurityStatus {
        /// Actively synced.
        Active => "active",
        /// Temporarily not synced.
        Paused => "paused",
        /// Kept for history only.
        Archived => "archived",
    }
}

string_enum! {
    /// Kind of security.
    SecurityType {
        /// Futures contract (continuous series).
        Future => "future",
        /// Equity.
        Equity => "equity",
        /// Option.
        Option => "option",
    }
}

string_enum! {
    /// Holding horizon of a futures series.
    FutureTerm {
        /// Long-dated contracts.
        LongTerm => "long_term",
        /// Front-month contracts.
        ShortTerm => "short_term",
    }
}

/// A stored security row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Primary key.
    pub id: i64,
    /// Unique name (the instrument code).
    pub name: String,
    /// Trading venue.
    pub platform: Platform,
    /// Lifecycle status.
    pub status: SecurityStatus,
    /// Security kind.
    #[serde(rename = "type")]
    pub security_type: SecurityType,
    /// Holding horizon.
    pub term: FutureTerm,
}

/// Attributes for a security that may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSecurity {
    /// Unique name.
    pub name: String,
    /// Trading venue.
    pub platform: Platform,
    /// Lifecycle status.
    pub status: SecurityStatus,
    /// Security kind.
    #[serde(rename = "type")]
    pub security_type: SecurityType,
    /// Holding horizon.
    pub term: FutureTerm,
}

impl NewSecurity {
    /// Creates an active short-term MOEX future.
    #[must_use]
    pub fn moex_future(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: Platform::Moex,
            status: SecurityStatus::Active,
            security_type: SecurityType::Future,
            term: FutureTerm::ShortTerm,
        }
    }

    /// Sets the holding horizon.
    #[must_use]
    pub fn with_term(mut self, term: FutureTerm) -> Self {
        self.term = term;
        self
    }

    /// Sets the trading venue.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(FutureTerm::ShortTerm.as_str(), "short_term");
        assert_eq!("MOEX".parse::<Platform>().unwrap(), Platform::Moex);
        assert_eq!("archived".parse::<SecurityStatus>().unwrap(), SecurityStatus::Archived);
        assert!("bond".parse::<SecurityType>().is_err());
    }

    #[test]
    fn test_serde_matches_stored_form() {
        let json = serde_json::to_string(&FutureTerm::LongTerm).unwrap();
        assert_eq!(json, "\"long_term\"");
    }

    #[test]
    fn test_moex_future_defaults() {
        let new = NewSecurity::moex_future("BR");
        assert_eq!(new.platform, Platform::Moex);
        assert_eq!(new.status, SecurityStatus::Active);
        assert_eq!(new.security_type, SecurityType::Future);
        assert_eq!(new.term, FutureTerm::ShortTerm);
        assert_eq!(new.with_term(FutureTerm::LongTerm).term, FutureTerm::LongTerm);
    }
}

//! Futures instrument registry and contract symbol generation.
//!
//! The registry maps an instrument code (e.g. `"BR"`) to the prefix its dated
//! contracts are quoted under. It is built once at startup and passed by
//! reference to whatever needs it.
//!
//! # Example
//!
//! ```
//! use contango_instruments::{InstrumentRegistry, generate_contract_symbols_until};
//! use contango_types::YearMonth;
//!
//! let registry = InstrumentRegistry::builtin().unwrap();
//! let prefix = registry.prefix("BR").unwrap();
//! let start: YearMonth = "2024-01".parse().unwrap();
//! let end: YearMonth = "2024-03".parse().unwrap();
//!
//! let symbols = generate_contract_symbols_until(prefix, start, end).unwrap();
//! assert_eq!(symbols, ["BRF4", "BRG4", "BRH4"]);
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod registry;
mod symbols;

pub use registry::InstrumentRegistry;
pub use symbols::{
    MONTH_CODES, contract_symbol, generate_contract_symbols, generate_contract_symbols_until,
    month_code, month_from_code,
};

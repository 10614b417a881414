//! Core types for the contango continuous-futures history pipeline.
//!
//! This crate provides the fundamental data structures used throughout contango:
//!
//! - [`Candle`] - A validated OHLCV row ready for storage
//! - [`RawBar`] / [`GluedBar`] - Provider bars before normalization
//! - [`Instrument`] - Futures underlying with its contract prefix
//! - [`Timeframe`] - Candle sampling granularity
//! - [`YearMonth`] / [`MonthRange`] - Calendar months for contract generation
//! - [`ContractWindow`] - Validity window of a dated contract
//! - [`Security`] - Persisted security record and its enumerations

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod contract;
mod error;
mod instrument;
mod month;
mod security;
mod timeframe;

pub use candle::{Candle, CandleError, GluedBar, RawBar};
pub use contract::{ContractExpiry, ContractWindow};
pub use error::{ContangoError, MonthParseError, Result};
pub use instrument::Instrument;
pub use month::{MonthIterator, MonthRange, YearMonth};
pub use security::{FutureTerm, NewSecurity, Platform, Security, SecurityStatus, SecurityType};
pub use timeframe::{Timeframe, TimeframeParseError};

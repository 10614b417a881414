//! Market-data access and continuous-series assembly for contango.
//!
//! This crate turns a list of dated contract codes into one continuous
//! bar series:
//!
//! - [`ContractDataSource`] - Async provider capability
//! - [`Blocking`] - Adapter for synchronous provider clients
//! - [`IssClient`] - MOEX ISS HTTP client with retries
//! - [`memory::InMemorySource`] - Fixture-backed source
//! - [`limits`] - Contract validity windows
//! - [`glue`] - Bounded-concurrency fetch and seam-aware merge

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod glue;
pub mod iss;
pub mod limits;
pub mod memory;
mod source;
pub mod url;

pub use client::{ClientConfig, IssClient};
pub use error::SourceError;
pub use glue::{GlueOptions, fetch_continuous, moscow_today};
pub use iss::FuturesListing;
pub use limits::{LimitsOptions, build_contract_limits};
pub use source::{
    Blocking, BlockingProvider, ContractDataSource, HistoryPayload, HistoryRequest, ProviderBar,
    SymbolInfo, to_exchange_time,
};

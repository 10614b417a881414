//! SQLite persistence for contango.
//!
//! Stores securities and their candles with an insert-or-ignore policy keyed
//! by `(security_id, timeframe, datetime)`, so re-running a sync never
//! duplicates rows.
//!
//! - [`CandleRepository`] - Persistence capability used by the sync layer
//! - [`SqliteStore`] - sqlx-backed implementation

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod repository;
mod schema;
mod sqlite;

pub use error::{Result, StoreError};
pub use repository::CandleRepository;
pub use sqlite::{MAX_ROWS_PER_STATEMENT, SQLITE_MAX_PARAMS, SqliteStore, default_database_path};

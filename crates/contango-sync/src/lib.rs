//! Incremental continuous-futures synchronisation for contango.
//!
//! [`FuturesHistoryDownloader`] ties the pipeline together for one
//! instrument: read the stored watermark, build contract windows, glue the
//! per-contract histories, normalise them and upsert whatever is new.

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod downloader;
mod normalize;
mod settings;

pub use downloader::FuturesHistoryDownloader;
pub use normalize::{NormalizedSeries, normalize, retain_after};
pub use settings::{SyncMode, SyncSettings};

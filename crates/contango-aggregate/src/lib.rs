//! Bar resampling for contango.
//!
//! Some providers only serve a handful of native grains. This crate folds
//! finer bars into a coarser [`Timeframe`](contango_types::Timeframe):
//!
//! - [`BarResampler`] - Streaming bar-to-bar resampler
//! - [`resample`] - Convenience wrapper over a whole series

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/contango/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod resampler;

pub use resampler::{BarResampler, bucket_start, resample};

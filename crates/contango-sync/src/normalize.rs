//! Glued series to storage rows.

use chrono::{DateTime, Utc};
use contango_types::{Candle, GluedBar};
use tracing::{debug, warn};

/// Storage-ready candles and the number of rows rejected on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    /// Validated candles, in input order.
    pub candles: Vec<Candle>,
    /// Rows that violated OHLCV invariants.
    pub rejected: usize,
}

/// Converts glued bars to UTC candles, dropping contract provenance.
///
/// Rows violating OHLCV invariants are rejected and counted.
#[must_use]
pub fn normalize(series: &[GluedBar]) -> NormalizedSeries {
    let mut out = NormalizedSeries {
        candles: Vec::with_capacity(series.len()),
        rejected: 0,
    };

    for glued in series {
        match Candle::try_from(&glued.bar) {
            Ok(candle) => out.candles.push(candle),
            Err(e) => {
                debug!(symbol = %glued.symbol, time = %glued.bar.time, error = %e, "rejected bar");
                out.rejected += 1;
            }
        }
    }

    if out.rejected > 0 {
        warn!(
            rejected = out.rejected,
            kept = out.candles.len(),
            "rejected bars violating OHLCV invariants"
        );
    }
    out
}

/// Keeps candles strictly after `watermark`.
#[must_use]
pub fn retain_after(candles: Vec<Candle>, watermark: Option<DateTime<Utc>>) -> Vec<Candle> {
    match watermark {
        Some(w) => candles.into_iter().filter(|c| c.datetime > w).collect(),
        None => candles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use contango_types::RawBar;

    fn glued(hour: u32, open: f64) -> GluedBar {
        let time = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, hour, 0, 0)
            .unwrap();
        GluedBar::new("BRH4", RawBar::new(time, open, 81.0, 80.0, 80.5, 7))
    }

    #[test]
    fn test_normalize_converts_to_utc() {
        let out = normalize(&[glued(10, 80.2)]);
        assert_eq!(out.rejected, 0);
        assert_eq!(
            out.candles[0].datetime,
            Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap()
        );
        assert_eq!(out.candles[0].volume, 7);
    }

    #[test]
    fn test_open_outside_range_rejected() {
        let out = normalize(&[glued(10, 80.2), glued(11, 95.0), glued(12, 80.9)]);
        assert_eq!(out.candles.len(), 2);
        assert_eq!(out.rejected, 1);
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(normalize(&[]), NormalizedSeries::default());
    }

    #[test]
    fn test_retain_after_is_strict() {
        let candles = normalize(&[glued(10, 80.2), glued(11, 80.2), glued(12, 80.2)]).candles;
        let watermark = candles[1].datetime;
        let fresh = retain_after(candles.clone(), Some(watermark));
        assert_eq!(fresh.len(), 1);
        assert_eq!(retain_after(candles, None).len(), 3);
    }
}

//! Streaming bar-to-bar resampling.

use chrono::{DateTime, FixedOffset};
use contango_types::{RawBar, Timeframe};

/// Streaming bar resampler.
///
/// Folds chronologically ordered bars into buckets of the target timeframe.
/// Buckets are aligned in the bars' own offset, so daily buckets start at
/// exchange-local midnight.
#[derive(Debug)]
pub struct BarResampler {
    timeframe: Timeframe,
    current_bar: Option<BarBuilder>,
}

impl BarResampler {
    /// Creates a new resampler for the given target timeframe.
    #[must_use]
    pub const fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            current_bar: None,
        }
    }

    /// Returns the timeframe being resampled to.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Processes a bar, potentially emitting a completed bucket.
    ///
    /// Returns `Some(bar)` when this bar opens a new bucket and the previous
    /// one is therefore complete.
    pub fn push(&mut self, bar: RawBar) -> Option<RawBar> {
        let start = bucket_start(bar.time, self.timeframe);

        match self.current_bar.take() {
            Some(mut builder) if builder.time == start => {
                builder.update(&bar);
                self.current_bar = Some(builder);
                None
            }
            Some(builder) => {
                let completed = builder.finish();
                self.current_bar = Some(BarBuilder::new(start, &bar));
                Some(completed)
            }
            None => {
                self.current_bar = Some(BarBuilder::new(start, &bar));
                None
            }
        }
    }

    /// Finishes resampling, returning any remaining partial bucket.
    #[must_use]
    pub fn finish(self) -> Option<RawBar> {
        self.current_bar.map(BarBuilder::finish)
    }
}

/// Resamples a chronologically ordered series into `timeframe` buckets.
pub fn resample(bars: impl IntoIterator<Item = RawBar>, timeframe: Timeframe) -> Vec<RawBar> {
    let mut resampler = BarResampler::new(timeframe);
    let mut out: Vec<RawBar> = bars.into_iter().filter_map(|b| resampler.push(b)).collect();
    out.extend(resampler.finish());
    out
}

/// Returns the start of the `timeframe` bucket containing `time`.
#[must_use]
pub fn bucket_start(time: DateTime<FixedOffset>, timeframe: Timeframe) -> DateTime<FixedOffset> {
    let width = timeframe.seconds() as i64;
    let offset = i64::from(time.offset().local_minus_utc());
    let local = time.timestamp() + offset;
    let floored = local - local.rem_euclid(width);
    DateTime::from_timestamp(floored - offset, 0)
        .map_or(time, |utc| utc.with_timezone(time.offset()))
}

/// Accumulator for one output bucket.
#[derive(Debug)]
struct BarBuilder {
    time: DateTime<FixedOffset>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl BarBuilder {
    const fn new(time: DateTime<FixedOffset>, bar: &RawBar) -> Self {
        Self {
            time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn update(&mut self, bar: &RawBar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    const fn finish(self) -> RawBar {
        RawBar::new(
            self.time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

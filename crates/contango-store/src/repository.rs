//! Persistence capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contango_types::{Candle, NewSecurity, Security, Timeframe};

use crate::Result;

/// Storage operations needed to keep continuous series up to date.
#[async_trait]
pub trait CandleRepository: Send + Sync {
    /// Creates tables and indexes if they do not exist.
    async fn migrate(&self) -> Result<()>;

    /// Returns the security named `new.name`, creating it if missing.
    ///
    /// Safe to call concurrently for the same name.
    async fn get_or_create_security(&self, new: &NewSecurity) -> Result<Security>;

    /// Returns the security with the given name, if any.
    async fn find_security(&self, name: &str) -> Result<Option<Security>>;

    /// Returns every stored security ordered by name.
    async fn list_securities(&self) -> Result<Vec<Security>>;

    /// Returns the latest stored candle time for a security and timeframe.
    async fn last_stored_datetime(
        &self,
        security_id: i64,
        timeframe: Timeframe,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Inserts candles, skipping rows that already exist.
    ///
    /// Returns the number of rows actually inserted.
    async fn insert_candles(
        &self,
        security_id: i64,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<u64>;

    /// Returns stored candles in chronological order.
    async fn load_candles(&self, security_id: i64, timeframe: Timeframe) -> Result<Vec<Candle>>;

    /// Counts stored candles, optionally for a single timeframe.
    async fn count_candles(&self, security_id: i64, timeframe: Option<Timeframe>) -> Result<u64>;
}

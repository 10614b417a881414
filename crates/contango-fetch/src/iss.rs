//! Decoding of MOEX ISS JSON tables.
//!
//! ISS answers with `{"<block>": {"columns": [...], "data": [[...], ...]}}`.
//! Timestamps are naive Moscow wall-clock strings.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use contango_types::{RawBar, Timeframe};
use serde::Deserialize;
use serde_json::Value;

use crate::SourceError;

/// A single ISS data block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssTable {
    /// Column names.
    pub columns: Vec<String>,
    /// Rows, positionally matching `columns`.
    pub data: Vec<Vec<Value>>,
}

impl IssTable {
    /// Extracts the named block from an ISS response.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the block is absent or malformed.
    pub fn from_response(symbol: &str, response: &Value, block: &str) -> Result<Self, SourceError> {
        let raw = response
            .get(block)
            .ok_or_else(|| SourceError::decode(symbol, format!("missing '{block}' block")))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| SourceError::decode(symbol, format!("bad '{block}' block: {e}")))
    }

    /// Returns the index of a column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require(&self, symbol: &str, name: &str) -> Result<usize, SourceError> {
        self.column(name)
            .ok_or_else(|| SourceError::decode(symbol, format!("missing column '{name}'")))
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// How a timeframe is obtained from ISS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssInterval {
    /// Native ISS interval code to request.
    pub code: u32,
    /// Target grain to resample to, when the native interval is finer.
    pub resample_to: Option<Timeframe>,
}

impl IssInterval {
    /// Maps a timeframe onto the intervals ISS serves natively.
    #[must_use]
    pub const fn for_timeframe(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Minute1 => Self::native(1),
            Timeframe::Minute5 => Self::resampled(1, timeframe),
            Timeframe::Minute15 => Self::resampled(1, timeframe),
            Timeframe::Minute30 => Self::resampled(10, timeframe),
            Timeframe::Hour1 => Self::native(60),
            Timeframe::Day1 => Self::native(24),
        }
    }

    const fn native(code: u32) -> Self {
        Self {
            code,
            resample_to: None,
        }
    }

    const fn resampled(code: u32, target: Timeframe) -> Self {
        Self {
            code,
            resample_to: Some(target),
        }
    }
}

/// Decodes a `candles` block into bars in Moscow time.
///
/// # Errors
///
/// Returns [`SourceError::MissingTimestamp`] if a row has a null `begin`, and
/// a decode error for any other malformed cell.
pub fn parse_candles(symbol: &str, table: &IssTable) -> Result<Vec<RawBar>, SourceError> {
    let open = table.require(symbol, "open")?;
    let high = table.require(symbol, "high")?;
    let low = table.require(symbol, "low")?;
    let close = table.require(symbol, "close")?;
    let volume = table.require(symbol, "volume")?;
    let begin = table.require(symbol, "begin")?;

    table
        .data
        .iter()
        .map(|row| {
            let time = match row.get(begin) {
                Some(Value::String(s)) => parse_local_datetime(symbol, s)?,
                _ => {
                    return Err(SourceError::MissingTimestamp {
                        symbol: symbol.to_string(),
                    });
                }
            };
            Ok(RawBar::new(
                time,
                number(symbol, row, open, "open")?,
                number(symbol, row, high, "high")?,
                number(symbol, row, low, "low")?,
                number(symbol, row, close, "close")?,
                number(symbol, row, volume, "volume")?.round() as i64,
            ))
        })
        .collect()
}

/// Extracts the contract expiry from a `description` block.
///
/// Prefers the last delivery date and falls back to the last trading day.
/// The expiry is taken as Moscow midnight of that date.
///
/// # Errors
///
/// Returns a decode error if the table lacks `name`/`value` columns or the
/// date cannot be parsed.
pub fn parse_expiry(symbol: &str, table: &IssTable) -> Result<Option<DateTime<Utc>>, SourceError> {
    let name = table.require(symbol, "name")?;
    let value = table.require(symbol, "value")?;

    let lookup = |key: &str| {
        table.data.iter().find_map(|row| {
            (row.get(name).and_then(Value::as_str) == Some(key))
                .then(|| row.get(value).and_then(Value::as_str))
                .flatten()
        })
    };

    let Some(raw) = lookup("LSTDELDATE").or_else(|| lookup("LSTTRADE")) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| SourceError::decode(symbol, format!("bad expiry '{raw}': {e}")))?;
    let local = date.and_time(NaiveTime::MIN);
    Ok(Moscow
        .from_local_datetime(&local)
        .earliest()
        .map(|t| t.with_timezone(&Utc)))
}

/// One row of the futures board listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuturesListing {
    /// Exchange contract code (e.g. "BRH4").
    pub secid: String,
    /// Short display name (e.g. "BR-3.24").
    pub short_name: Option<String>,
    /// Underlying asset code (e.g. "BR").
    pub asset_code: Option<String>,
    /// Last trading day. Unparseable dates are dropped to `None`.
    pub last_trade_date: Option<NaiveDate>,
}

/// Decodes a `securities` block of the futures board.
///
/// # Errors
///
/// Returns a decode error if the `SECID` column is missing.
pub fn parse_futures(table: &IssTable) -> Result<Vec<FuturesListing>, SourceError> {
    let secid = table.require("securities", "SECID")?;
    let short_name = table.column("SHORTNAME");
    let asset_code = table.column("ASSETCODE");
    let last_trade = table.column("LASTTRADEDATE");

    let text = |row: &[Value], idx: Option<usize>| {
        idx.and_then(|i| row.get(i))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    };

    Ok(table
        .data
        .iter()
        .filter_map(|row| {
            let code = row.get(secid)?.as_str()?.to_string();
            let last_trade_date = last_trade
                .and_then(|i| row.get(i))
                .and_then(Value::as_str)
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());
            Some(FuturesListing {
                secid: code,
                short_name: text(row, short_name),
                asset_code: text(row, asset_code),
                last_trade_date,
            })
        })
        .collect())
}

fn parse_local_datetime(symbol: &str, raw: &str) -> Result<DateTime<FixedOffset>, SourceError> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| SourceError::decode(symbol, format!("bad timestamp '{raw}': {e}")))?;
    Moscow
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.fixed_offset())
        .ok_or_else(|| SourceError::decode(symbol, format!("nonexistent local time '{raw}'")))
}

fn number(symbol: &str, row: &[Value], idx: usize, field: &str) -> Result<f64, SourceError> {
    row.get(idx)
        .and_then(Value::as_f64)
        .ok_or_else(|| SourceError::decode(symbol, format!("non-numeric {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn candles(rows: Value) -> IssTable {
        let response = json!({
            "candles": {
                "columns": ["open", "close", "high", "low", "value", "volume", "begin", "end"],
                "data": rows,
            }
        });
        IssTable::from_response("BRH4", &response, "candles").unwrap()
    }

    #[test]
    fn test_parse_candles() {
        let table = candles(json!([
            [80.1, 80.5, 80.9, 79.8, 1.0e6, 1520, "2024-01-15 10:00:00", "2024-01-15 10:59:59"],
            [80.5, 80.2, 80.6, 80.0, 2.0e6, 980, "2024-01-15 11:00:00", "2024-01-15 11:59:59"]
        ]));
        let bars = parse_candles("BRH4", &table).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time.hour(), 10);
        assert_eq!(bars[0].time.offset().local_minus_utc(), 3 * 3600);
        assert_eq!(bars[0].time_utc().hour(), 7);
        assert_eq!(bars[1].volume, 980);
        assert!((bars[0].high - 80.9).abs() < 1e-9);
    }

    #[test]
    fn test_null_begin_is_missing_timestamp() {
        let table = candles(json!([[80.1, 80.5, 80.9, 79.8, 1.0, 1, null, null]]));
        let err = parse_candles("BRH4", &table).unwrap_err();
        assert!(matches!(err, SourceError::MissingTimestamp { .. }));
    }

    #[test]
    fn test_missing_column_is_decode_error() {
        let response = json!({"candles": {"columns": ["open"], "data": []}});
        let table = IssTable::from_response("BRH4", &response, "candles").unwrap();
        assert!(matches!(
            parse_candles("BRH4", &table).unwrap_err(),
            SourceError::Decode { .. }
        ));
        assert!(IssTable::from_response("BRH4", &response, "history").is_err());
    }

    #[test]
    fn test_parse_expiry_prefers_delivery_date() {
        let response = json!({
            "description": {
                "columns": ["name", "title", "value", "type", "sort_order", "is_hidden", "precision"],
                "data": [
                    ["SECID", "Code", "BRH4", "string", 1, 0, null],
                    ["LSTTRADE", "Last trade", "2024-02-29", "date", 2, 0, null],
                    ["LSTDELDATE", "Last delivery", "2024-03-01", "date", 3, 0, null]
                ]
            }
        });
        let table = IssTable::from_response("BRH4", &response, "description").unwrap();
        let expiry = parse_expiry("BRH4", &table).unwrap().unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 2, 29, 21, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_expiry_absent() {
        let response = json!({"description": {"columns": ["name", "value"], "data": []}});
        let table = IssTable::from_response("XXH4", &response, "description").unwrap();
        assert!(parse_expiry("XXH4", &table).unwrap().is_none());
    }

    #[test]
    fn test_parse_futures() {
        let response = json!({
            "securities": {
                "columns": ["SECID", "BOARDID", "SHORTNAME", "ASSETCODE", "LASTTRADEDATE"],
                "data": [
                    ["BRH4", "RFUD", "BR-3.24", "BR", "2024-02-29"],
                    ["SiH4", "RFUD", "Si-3.24", "Si", "0000-00-00"],
                    [null, "RFUD", "broken", null, null]
                ]
            }
        });
        let table = IssTable::from_response("securities", &response, "securities").unwrap();
        let futures = parse_futures(&table).unwrap();
        assert_eq!(futures.len(), 2);
        assert_eq!(futures[0].secid, "BRH4");
        assert_eq!(futures[0].short_name.as_deref(), Some("BR-3.24"));
        assert_eq!(futures[0].asset_code.as_deref(), Some("BR"));
        assert_eq!(futures[0].last_trade_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(futures[1].last_trade_date, None);

        let bare = json!({"securities": {"columns": ["SHORTNAME"], "data": []}});
        let table = IssTable::from_response("securities", &bare, "securities").unwrap();
        assert!(matches!(
            parse_futures(&table).unwrap_err(),
            SourceError::Decode { .. }
        ));
    }

    #[test]
    fn test_interval_mapping() {
        assert_eq!(IssInterval::for_timeframe(Timeframe::Hour1).code, 60);
        assert_eq!(IssInterval::for_timeframe(Timeframe::Day1).code, 24);
        let m30 = IssInterval::for_timeframe(Timeframe::Minute30);
        assert_eq!(m30.code, 10);
        assert_eq!(m30.resample_to, Some(Timeframe::Minute30));
    }
}

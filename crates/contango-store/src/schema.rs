//! Table definitions.

/// Statements creating the schema. Each is idempotent.
pub(crate) const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS securities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        platform TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        type TEXT NOT NULL DEFAULT 'future',
        term TEXT NOT NULL DEFAULT 'short_term'
    )",
    "CREATE TABLE IF NOT EXISTS historical_candles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        security_id INTEGER NOT NULL REFERENCES securities(id) ON DELETE CASCADE,
        timeframe TEXT NOT NULL,
        datetime DATETIME NOT NULL,
        open REAL NOT NULL,
        high REAL NOT NULL,
        low REAL NOT NULL,
        close REAL NOT NULL,
        volume INTEGER NOT NULL,
        CONSTRAINT uq_security_tf_time UNIQUE (security_id, timeframe, datetime)
    )",
    "CREATE INDEX IF NOT EXISTS ix_historical_candles_security_id
        ON historical_candles (security_id)",
    "CREATE INDEX IF NOT EXISTS ix_historical_candles_timeframe
        ON historical_candles (timeframe)",
    "CREATE INDEX IF NOT EXISTS ix_historical_candles_datetime
        ON historical_candles (datetime)",
];

/// Columns bound per inserted candle row.
pub(crate) const CANDLE_COLUMNS: usize = 8;

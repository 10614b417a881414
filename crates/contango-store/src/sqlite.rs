//! SQLite implementation of [`CandleRepository`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contango_types::{Candle, NewSecurity, Security, Timeframe};
use directories::ProjectDirs;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use crate::schema::{CANDLE_COLUMNS, SCHEMA};
use crate::{CandleRepository, Result, StoreError};

/// Bind-parameter ceiling of SQLite (`SQLITE_MAX_VARIABLE_NUMBER`).
pub const SQLITE_MAX_PARAMS: usize = 32_766;

/// Candle rows per insert statement so binds stay under the ceiling.
pub const MAX_ROWS_PER_STATEMENT: usize = SQLITE_MAX_PARAMS / CANDLE_COLUMNS;

/// Returns the default database location.
///
/// Uses the platform data directory (`~/.local/share/contango/contango.db`
/// on Linux) and falls back to `~/.contango/contango.db`.
#[must_use]
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("", "", "contango")
        .map_or_else(dirs_fallback, |proj_dirs| proj_dirs.data_dir().to_path_buf())
        .join("contango.db")
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".contango")
}

/// Candle store backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to a database URL such as `sqlite://path/to/contango.db`.
    ///
    /// The file is created if missing. Call [`CandleRepository::migrate`]
    /// before use.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the database cannot be opened.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        debug!(url, "connected to database");
        Ok(Self { pool })
    }

    /// Opens a database file, creating its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Self::connect(&format!("sqlite://{}", path.display())).await
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // A single connection that never recycles keeps the database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn security_by_name(&self, name: &str) -> Result<Option<Security>> {
        sqlx::query("SELECT id, name, platform, status, type, term FROM securities WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(security_from_row)
            .transpose()
    }
}

#[async_trait]
impl CandleRepository for SqliteStore {
    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn get_or_create_security(&self, new: &NewSecurity) -> Result<Security> {
        let created = sqlx::query(
            "INSERT INTO securities (name, platform, status, type, term)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&new.name)
        .bind(new.platform.as_str())
        .bind(new.status.as_str())
        .bind(new.security_type.as_str())
        .bind(new.term.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if created > 0 {
            debug!(name = %new.name, "created security");
        }

        self.security_by_name(&new.name)
            .await?
            .ok_or_else(|| StoreError::SecurityNotFound(new.name.clone()))
    }

    async fn find_security(&self, name: &str) -> Result<Option<Security>> {
        self.security_by_name(name).await
    }

    async fn list_securities(&self) -> Result<Vec<Security>> {
        sqlx::query("SELECT id, name, platform, status, type, term FROM securities ORDER BY name")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(security_from_row)
            .collect()
    }

    async fn last_stored_datetime(
        &self,
        security_id: i64,
        timeframe: Timeframe,
    ) -> Result<Option<DateTime<Utc>>> {
        let last = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT datetime FROM historical_candles
             WHERE security_id = ? AND timeframe = ?
             ORDER BY datetime DESC
             LIMIT 1",
        )
        .bind(security_id)
        .bind(timeframe.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(last)
    }

    async fn insert_candles(
        &self,
        security_id: i64,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<u64> {
        if candles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in candles.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
                "INSERT INTO historical_candles \
                 (security_id, timeframe, datetime, open, high, low, close, volume) ",
            );
            builder.push_values(chunk, |mut row, candle| {
                row.push_bind(security_id)
                    .push_bind(timeframe.as_str())
                    .push_bind(candle.datetime)
                    .push_bind(candle.open)
                    .push_bind(candle.high)
                    .push_bind(candle.low)
                    .push_bind(candle.close)
                    .push_bind(candle.volume);
            });
            builder.push(" ON CONFLICT (security_id, timeframe, datetime) DO NOTHING");

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        debug!(
            security_id,
            timeframe = %timeframe,
            offered = candles.len(),
            inserted,
            "upserted candles"
        );
        Ok(inserted)
    }

    async fn load_candles(&self, security_id: i64, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let rows = sqlx::query(
            "SELECT datetime, open, high, low, close, volume FROM historical_candles
             WHERE security_id = ? AND timeframe = ?
             ORDER BY datetime",
        )
        .bind(security_id)
        .bind(timeframe.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Candle> {
                Ok(Candle {
                    datetime: row.try_get("datetime")?,
                    open: row.try_get("open")?,
                    high: row.try_get("high")?,
                    low: row.try_get("low")?,
                    close: row.try_get("close")?,
                    volume: row.try_get("volume")?,
                })
            })
            .collect()
    }

    async fn count_candles(&self, security_id: i64, timeframe: Option<Timeframe>) -> Result<u64> {
        let code = timeframe.map(|tf| tf.as_str());
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM historical_candles
             WHERE security_id = ? AND (? IS NULL OR timeframe = ?)",
        )
        .bind(security_id)
        .bind(code)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn security_from_row(row: &SqliteRow) -> Result<Security> {
    Ok(Security {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        platform: parse_column(row, "platform")?,
        status: parse_column(row, "status")?,
        security_type: parse_column(row, "type")?,
        term: parse_column(row, "term")?,
    })
}

fn parse_column<T: FromStr>(row: &SqliteRow, column: &'static str) -> Result<T> {
    let value: String = row.try_get(column)?;
    value
        .parse()
        .map_err(|_| StoreError::InvalidValue { column, value })
}

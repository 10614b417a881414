//! HTTP client for the MOEX ISS API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Europe::Moscow;
use contango_aggregate::resample;
use contango_types::RawBar;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::iss::{
    FuturesListing, IssInterval, IssTable, parse_candles, parse_expiry, parse_futures,
};
use crate::source::{ContractDataSource, HistoryRequest};
use crate::{SourceError, url};

/// Configuration for the ISS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Idle connections kept per host.
    pub concurrency: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
    /// ISS root URL.
    pub base_url: String,
    /// ISS engine of the futures market.
    pub engine: String,
    /// ISS market of the futures market.
    pub market: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(60),
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            user_agent: format!("contango/{}", env!("CARGO_PKG_VERSION")),
            base_url: url::BASE_URL.to_string(),
            engine: "futures".to_string(),
            market: "forts".to_string(),
        }
    }
}

/// MOEX ISS client with connection pooling and retry logic.
#[derive(Debug, Clone)]
pub struct IssClient {
    client: Client,
    config: ClientConfig,
}

impl IssClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.concurrency)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches a JSON document.
    ///
    /// Returns `Ok(None)` if the resource does not exist (404).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries.
    pub async fn get_json(&self, url: &str) -> Result<Option<Value>, SourceError> {
        let mut attempt = 0;

        loop {
            let reason = match self.client.get(url).send().await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => return Ok(None),
                Ok(response) if is_retryable_status(response.status()) => {
                    if attempt >= self.config.max_retries {
                        return Err(SourceError::ServerError {
                            status: response.status().as_u16(),
                        });
                    }
                    format!("status {}", response.status())
                }
                Ok(response) => return Ok(Some(response.error_for_status()?.json().await?)),
                Err(e) if is_transient(&e) && attempt < self.config.max_retries => e.to_string(),
                Err(e) if e.is_timeout() => return Err(SourceError::Timeout(attempt + 1)),
                Err(e) => return Err(e.into()),
            };

            attempt += 1;
            let delay = self.backoff(attempt);
            debug!(url, %reason, attempt, ?delay, "retrying ISS request");
            tokio::time::sleep(delay).await;
        }
    }

    /// Lists the contracts currently traded on the futures board.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the payload cannot be decoded,
    /// or the board comes back empty.
    pub async fn list_futures(&self) -> Result<Vec<FuturesListing>, SourceError> {
        let url = url::securities_url(
            &self.config.base_url,
            &self.config.engine,
            &self.config.market,
        );
        let Some(response) = self.get_json(&url).await? else {
            return Err(SourceError::Provider("futures board not found".to_string()));
        };
        let table = IssTable::from_response("securities", &response, "securities")?;
        let futures = parse_futures(&table)?;
        if futures.is_empty() {
            return Err(SourceError::Provider("ISS returned no futures".to_string()));
        }
        debug!(count = futures.len(), "listed futures board");
        Ok(futures)
    }

    /// Downloads every candle page of one contract at a native interval.
    async fn fetch_candle_pages(
        &self,
        symbol: &str,
        interval: u32,
        from: Option<DateTime<Utc>>,
    ) -> Result<Option<Vec<RawBar>>, SourceError> {
        let from = from.map(|t| t.with_timezone(&Moscow).date_naive());
        let mut bars = Vec::new();
        let mut start = 0;

        loop {
            let url = url::candles_url(
                &self.config.base_url,
                &self.config.engine,
                &self.config.market,
                symbol,
                interval,
                start,
                from,
            );
            let Some(response) = self.get_json(&url).await? else {
                break;
            };
            let table = IssTable::from_response(symbol, &response, "candles")?;
            if table.is_empty() {
                break;
            }
            start += table.len();
            bars.extend(parse_candles(symbol, &table)?);
        }

        Ok((!bars.is_empty()).then_some(bars))
    }

    /// Exponential backoff capped at `max_delay_ms`, with ±25% jitter
    /// derived from the attempt number. Never below 100ms.
    fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10))
            .min(self.config.max_delay_ms);
        let spread = ceiling / 4;
        let offset = if spread == 0 {
            0
        } else {
            (u64::from(attempt) * 17) % (spread * 2)
        };
        Duration::from_millis((ceiling + offset).saturating_sub(spread).max(100))
    }
}

/// 5xx and 429 are worth another attempt.
fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_transient(error: &reqwest::Error) -> bool {
    !error.is_builder() && (error.is_timeout() || error.is_connect() || error.is_request())
}

#[async_trait]
impl ContractDataSource for IssClient {
    fn name(&self) -> &'static str {
        "moex-iss"
    }

    async fn lookup_expiry(
        &self,
        exchange: &str,
        symbol: &str,
    ) -> Result<Option<DateTime<Utc>>, SourceError> {
        if !exchange.eq_ignore_ascii_case("MOEX") {
            warn!(exchange, symbol, "ISS only serves MOEX instruments");
        }
        let url = url::description_url(&self.config.base_url, symbol);
        let Some(response) = self.get_json(&url).await? else {
            return Ok(None);
        };
        let table = IssTable::from_response(symbol, &response, "description")?;
        parse_expiry(symbol, &table)
    }

    async fn fetch_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Option<Vec<RawBar>>, SourceError> {
        let interval = IssInterval::for_timeframe(request.timeframe);
        let Some(bars) = self
            .fetch_candle_pages(&request.symbol, interval.code, request.from)
            .await?
        else {
            return Ok(None);
        };

        let bars = match interval.resample_to {
            Some(target) => resample(bars, target),
            None => bars,
        };
        debug!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            interval = interval.code,
            bars = bars.len(),
            "fetched ISS candles"
        );
        Ok(Some(bars))
    }
}

//! MOEX ISS URL construction.

use chrono::NaiveDate;

/// Base URL of the public MOEX Informational & Statistical Server.
pub const BASE_URL: &str = "https://iss.moex.com/iss";

/// Builds the URL for one page of a contract's candles.
///
/// URL format: `{base}/engines/{engine}/markets/{market}/securities/{SECID}/candles.json`
///
/// # Example
///
/// ```
/// use contango_fetch::url::candles_url;
///
/// let url = candles_url(contango_fetch::url::BASE_URL, "futures", "forts", "BRH4", 60, 0, None);
/// assert_eq!(
///     url,
///     "https://iss.moex.com/iss/engines/futures/markets/forts/securities/BRH4/candles.json?interval=60&start=0&iss.meta=off"
/// );
/// ```
#[must_use]
pub fn candles_url(
    base: &str,
    engine: &str,
    market: &str,
    symbol: &str,
    interval: u32,
    start: usize,
    from: Option<NaiveDate>,
) -> String {
    let mut url = format!(
        "{}/engines/{}/markets/{}/securities/{}/candles.json?interval={}&start={}&iss.meta=off",
        base.trim_end_matches('/'),
        engine,
        market,
        symbol,
        interval,
        start
    );
    if let Some(from) = from {
        url.push_str(&format!("&from={}", from.format("%Y-%m-%d")));
    }
    url
}

/// Builds the URL of a security's description table.
#[must_use]
pub fn description_url(base: &str, symbol: &str) -> String {
    format!(
        "{}/securities/{}.json?iss.only=description&iss.meta=off",
        base.trim_end_matches('/'),
        symbol
    )
}

/// Builds the URL of a market's security listing.
#[must_use]
pub fn securities_url(base: &str, engine: &str, market: &str) -> String {
    format!(
        "{}/engines/{}/markets/{}/securities.json?iss.only=securities&iss.meta=off",
        base.trim_end_matches('/'),
        engine,
        market
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candles_url_with_from() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let url = candles_url(BASE_URL, "futures", "forts", "SiH4", 1, 500, Some(from));
        assert_eq!(
            url,
            "https://iss.moex.com/iss/engines/futures/markets/forts/securities/SiH4/candles.json?interval=1&start=500&iss.meta=off&from=2024-01-15"
        );
    }

    #[test]
    fn test_description_url_trims_slash() {
        let url = description_url("http://localhost:8080/iss/", "BRH4");
        assert_eq!(
            url,
            "http://localhost:8080/iss/securities/BRH4.json?iss.only=description&iss.meta=off"
        );
    }

    #[test]
    fn test_securities_url() {
        assert_eq!(
            securities_url(BASE_URL, "futures", "forts"),
            "https://iss.moex.com/iss/engines/futures/markets/forts/securities.json?iss.only=securities&iss.meta=off"
        );
    }
}

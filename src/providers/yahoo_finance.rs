use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::price::PriceProvider;

const SECONDS_PER_DAY: i64 = 86_400;

/// Daily closes from the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("contrib-import/1.0")
            .build()?;
        Ok(YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, symbol: &str, window: Option<(i64, i64)>) -> String {
        match window {
            Some((start, end)) => format!(
                "{}/v8/finance/chart/{}?interval=1d&period1={}&period2={}",
                self.base_url, symbol, start, end
            ),
            None => format!(
                "{}/v8/finance/chart/{}?interval=1d&range=5d",
                self.base_url, symbol
            ),
        }
    }
}

/// Epoch seconds to request for the trade date `date`: its UTC day padded by
/// a day on each side, so every exchange's session for `date` is covered.
fn request_window(date: NaiveDate) -> (i64, i64) {
    let start = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    (start - SECONDS_PER_DAY, start + 2 * SECONDS_PER_DAY)
}

/// Calendar date of `timestamp` on an exchange `gmtoffset` seconds east of UTC.
fn exchange_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp.saturating_add(gmtoffset), 0).map(|dt| dt.date_naive())
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

impl PriceChartItem {
    /// (timestamp, close) bars that actually carry a close.
    fn bars(&self) -> Vec<(i64, f64)> {
        let closes = self
            .indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref());
        match (self.timestamp.as_ref(), closes) {
            (Some(timestamps), Some(closes)) => timestamps
                .iter()
                .zip(closes.iter())
                .filter_map(|(ts, close)| close.map(|c| (*ts, c)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Close of the bar traded on `date` in the exchange's own time zone.
    fn close_on(&self, date: NaiveDate) -> Option<f64> {
        let offset = self.meta.gmtoffset;
        self.bars()
            .into_iter()
            .find(|(ts, _)| exchange_date(*ts, offset) == Some(date))
            .map(|(_, close)| close)
    }

    fn latest_close(&self) -> Option<f64> {
        self.bars()
            .last()
            .map(|(_, close)| *close)
            .or(self.meta.regular_market_price)
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    #[instrument(name = "YahooPriceFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_close(&self, symbol: &str, date: Option<NaiveDate>) -> Result<Option<f64>> {
        let url = self.chart_url(symbol, date.map(request_window));
        debug!("Requesting price data from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        // Unknown symbols come back as 404 and are treated like a day without data.
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Symbol not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooPriceResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let Some(item) = data.chart.result.as_ref().and_then(|r| r.first()) else {
            debug!("Empty chart result");
            return Ok(None);
        };

        let close = match date {
            Some(date) => item.close_on(date),
            None => item.latest_close(),
        };
        debug!(?close, "Resolved close");
        Ok(close)
    }
}

//! Pricing abstractions

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Ticker to closing price.
pub type PriceMap = HashMap<String, f64>;

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Closing price of `symbol` on `date`, or the latest close when `date` is
    /// `None`. `Ok(None)` means the source has nothing for that symbol and day,
    /// which includes symbols the source does not know.
    async fn fetch_close(&self, symbol: &str, date: Option<NaiveDate>) -> Result<Option<f64>>;
}

/// Looks up closes for all `tickers`, one after another.
///
/// Tickers without data are left out of the map. Any provider error fails the
/// whole batch and the offending ticker is not reported.
pub async fn fetch_prices(
    provider: &(dyn PriceProvider + Send + Sync),
    tickers: &[String],
    date: Option<NaiveDate>,
) -> Result<PriceMap> {
    let mut prices = PriceMap::with_capacity(tickers.len());
    for ticker in tickers {
        let close = provider
            .fetch_close(ticker, date)
            .await
            .map_err(|e| anyhow!("Batch price fetch failed: {e:#}"))?;
        match close {
            Some(price) => {
                prices.insert(ticker.clone(), price);
            }
            None => debug!(%ticker, ?date, "No close available"),
        }
    }
    Ok(prices)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Serves prices from a fixed map; a symbol listed in `failing` errors.
    #[derive(Default)]
    pub struct StaticPriceProvider {
        pub prices: HashMap<String, f64>,
        pub failing: Option<String>,
    }

    impl StaticPriceProvider {
        pub fn new(prices: &[(&str, f64)]) -> Self {
            StaticPriceProvider {
                prices: prices.iter().map(|(t, p)| (t.to_string(), *p)).collect(),
                failing: None,
            }
        }
    }

    #[async_trait]
    impl PriceProvider for StaticPriceProvider {
        async fn fetch_close(&self, symbol: &str, _date: Option<NaiveDate>) -> Result<Option<f64>> {
            if self.failing.as_deref() == Some(symbol) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.prices.get(symbol).copied())
        }
    }
}

//! Buy transactions derived from a contribution

use crate::core::config::Account;
use crate::core::date;
use crate::core::price::{PriceMap, PriceProvider, fetch_prices};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    Yahoo,
}

/// One activity as the import endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub account_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub quantity: f64,
    pub unit_price: f64,
    pub date: NaiveDate,
    pub currency: String,
    pub data_source: DataSource,
    pub fee: f64,
}

/// Result of splitting one contribution across an account's holdings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub transactions: Vec<Transaction>,
    /// Tickers left out because no usable price was found.
    pub skipped: Vec<String>,
}

/// Rounds a share quantity to 4 decimal places.
pub fn round_quantity(quantity: f64) -> f64 {
    (quantity * 10_000.0).round() / 10_000.0
}

/// Splits `amount` over the account's holdings at the given prices.
///
/// Holdings without a positive price are skipped rather than failing the
/// allocation; the rest are still bought.
pub fn allocate(account: &Account, amount: f64, date: NaiveDate, prices: &PriceMap) -> Allocation {
    let mut allocation = Allocation::default();

    for (ticker, weight) in account.holdings.iter() {
        let price = match prices.get(ticker) {
            Some(price) if *price > 0.0 && price.is_finite() => *price,
            _ => {
                warn!(%ticker, %date, account = %account.name, "No price, skipping");
                allocation.skipped.push(ticker.to_string());
                continue;
            }
        };

        let quantity = round_quantity(amount * weight / price);
        debug!(%ticker, weight, price, quantity, "Allocated");

        allocation.transactions.push(Transaction {
            account_id: account.account_id.clone(),
            symbol: ticker.to_string(),
            transaction_type: TransactionType::Buy,
            quantity,
            unit_price: price,
            date,
            currency: account.currency.clone(),
            data_source: DataSource::Yahoo,
            fee: 0.0,
        });
    }

    allocation
}

/// Prices the account's holdings and allocates `amount` across them.
///
/// With no `date` the latest closes are used and transactions are dated today.
#[instrument(skip(account, provider), fields(account = %account.name))]
pub async fn build_transactions(
    account: &Account,
    amount: f64,
    date: Option<NaiveDate>,
    provider: &(dyn PriceProvider + Send + Sync),
) -> Result<Allocation> {
    let prices = fetch_prices(provider, &account.holdings.tickers(), date).await?;
    let trade_date = date.unwrap_or_else(date::today);
    Ok(allocate(account, amount, trade_date, &prices))
}

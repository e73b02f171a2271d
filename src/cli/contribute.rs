use super::import::{ImportReport, process_contribution, validate_config};
use super::ui::{StyleType, style_text};
use crate::core::config::AppConfig;
use crate::core::date::normalize_to_today;
use crate::core::importer::ActivityImporter;
use crate::core::price::PriceProvider;
use crate::core::validate::is_valid_amount;
use anyhow::{Result, bail};
use chrono::NaiveDate;

/// Allocates a single ad-hoc contribution to one account.
///
/// Without a `date` the latest closes are used and the transactions are
/// dated today.
pub async fn run(
    config: &AppConfig,
    account_name: &str,
    amount: f64,
    date: Option<NaiveDate>,
    price_provider: &(dyn PriceProvider + Send + Sync),
    importer: Option<&(dyn ActivityImporter + Send + Sync)>,
) -> Result<ImportReport> {
    validate_config(config)?;
    let account = config.find_account(account_name)?;
    if !is_valid_amount(amount) {
        bail!("Contribution must be > 0 for {}", account.name);
    }

    println!(
        "\n{}",
        style_text(
            &format!("💼 Processing account: {}", account.name),
            StyleType::Title
        )
    );

    let mut report = ImportReport::default();
    process_contribution(
        account,
        amount,
        date.map(normalize_to_today),
        price_provider,
        importer,
        &mut report,
    )
    .await?;
    Ok(report)
}

use super::ui::{self, StyleType, style_text};
use crate::core::config::{Account, AppConfig};
use crate::core::date::normalize_to_today;
use crate::core::importer::{ActivityImporter, ImportOutcome};
use crate::core::price::PriceProvider;
use crate::core::transaction::build_transactions;
use crate::core::validate::validate_accounts;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Tally of what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub contributions: usize,
    pub transactions_created: usize,
    pub batches_rejected: usize,
    pub tickers_skipped: usize,
}

/// Validates every account, printing an acknowledgment for each one.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_accounts(&config.accounts, |account| {
        info!(account = %account.name, "Config validated");
        println!(
            "{}",
            style_text(
                &format!("✅ Config validated for {}", account.name),
                StyleType::Success
            )
        );
    })
}

/// Processes every scheduled contribution of every account, in file order.
///
/// With no `importer` the transactions are only printed.
pub async fn run(
    config: &AppConfig,
    price_provider: &(dyn PriceProvider + Send + Sync),
    importer: Option<&(dyn ActivityImporter + Send + Sync)>,
) -> Result<ImportReport> {
    validate_config(config)?;

    let mut report = ImportReport::default();
    for account in &config.accounts {
        println!(
            "\n{}",
            style_text(
                &format!("💼 Processing account: {}", account.name),
                StyleType::Title
            )
        );
        if account.contributions.is_empty() {
            println!("{}", style_text("No contributions", StyleType::Subtle));
        }

        for contribution in &account.contributions {
            let trade_date = normalize_to_today(contribution.date);
            if trade_date != contribution.date {
                info!(scheduled = %contribution.date, %trade_date, "Moved to business day");
            }
            process_contribution(
                account,
                contribution.amount,
                Some(trade_date),
                price_provider,
                importer,
                &mut report,
            )
            .await?;
        }
    }

    info!(?report, "Run finished");
    Ok(report)
}

/// Prices, allocates and submits (or previews) a single contribution.
pub(crate) async fn process_contribution(
    account: &Account,
    amount: f64,
    date: Option<NaiveDate>,
    price_provider: &(dyn PriceProvider + Send + Sync),
    importer: Option<&(dyn ActivityImporter + Send + Sync)>,
    report: &mut ImportReport,
) -> Result<()> {
    let when = date.map_or_else(|| "latest close".to_string(), |d| d.to_string());
    let spinner = ui::new_spinner(&format!("Fetching prices for {when}..."));
    let allocation = build_transactions(account, amount, date, price_provider).await;
    spinner.finish_and_clear();
    let allocation = allocation?;

    report.contributions += 1;
    report.tickers_skipped += allocation.skipped.len();
    for ticker in &allocation.skipped {
        println!(
            "{}",
            style_text(
                &format!("⚠️ No price for {ticker} on {when}, skipping"),
                StyleType::Warning
            )
        );
    }

    let Some(importer) = importer else {
        println!("{}", ui::transactions_table(&allocation.transactions));
        return Ok(());
    };

    match importer.submit(&allocation.transactions).await? {
        ImportOutcome::Created => {
            report.transactions_created += allocation.transactions.len();
            for tx in &allocation.transactions {
                println!("{}", style_text(&ui::added_line(tx), StyleType::Success));
            }
        }
        ImportOutcome::Rejected { status, body } => {
            warn!(status, account = %account.name, "Import rejected");
            report.batches_rejected += 1;
            println!(
                "{}",
                style_text(
                    &format!("❌ Error adding transactions: {body}"),
                    StyleType::Error
                )
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::importer::testing::RecordingImporter;
    use crate::core::price::testing::StaticPriceProvider;

    fn config(yaml: &str) -> AppConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const TWO_FUND: &str = r#"
accounts:
  - name: "Brokerage"
    account_id: "acc-1"
    holdings:
      VTI: 0.6
      BND: 0.4
    contributions:
      - date: 2024-06-12
        amount: 1000
      - date: 2024-06-15
        amount: 500
"#;

    #[tokio::test]
    async fn test_each_contribution_is_one_batch() {
        let provider = StaticPriceProvider::new(&[("VTI", 100.0), ("BND", 50.0)]);
        let importer = RecordingImporter::new(ImportOutcome::Created);

        let report = run(&config(TWO_FUND), &provider, Some(&importer))
            .await
            .unwrap();

        assert_eq!(
            report,
            ImportReport {
                contributions: 2,
                transactions_created: 4,
                batches_rejected: 0,
                tickers_skipped: 0,
            }
        );

        let batches = importer.batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        let first: Vec<_> = batches[0]
            .iter()
            .map(|t| (t.symbol.as_str(), t.quantity))
            .collect();
        assert_eq!(first, vec![("VTI", 6.0), ("BND", 8.0)]);
        // Saturday contribution lands on Friday.
        assert_eq!(
            batches[1][0].date,
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rejected_batch_does_not_stop_the_run() {
        let provider = StaticPriceProvider::new(&[("VTI", 100.0), ("BND", 50.0)]);
        let importer = RecordingImporter::new(ImportOutcome::Rejected {
            status: 400,
            body: "bad request".to_string(),
        });

        let report = run(&config(TWO_FUND), &provider, Some(&importer))
            .await
            .unwrap();

        assert_eq!(report.batches_rejected, 2);
        assert_eq!(report.transactions_created, 0);
        assert_eq!(importer.batches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_prices_still_submit_the_rest() {
        let provider = StaticPriceProvider::new(&[("VTI", 100.0)]);
        let importer = RecordingImporter::new(ImportOutcome::Created);

        let report = run(&config(TWO_FUND), &provider, Some(&importer))
            .await
            .unwrap();

        assert_eq!(report.tickers_skipped, 2);
        assert_eq!(report.transactions_created, 2);
    }

    #[tokio::test]
    async fn test_invalid_account_aborts_before_any_submission() {
        let yaml = r#"
accounts:
  - name: "Good"
    account_id: "acc-1"
    holdings: { VTI: 1.0 }
    contributions:
      - date: 2024-06-12
        amount: 100
  - name: "Bad"
    account_id: "acc-2"
    holdings: { VTI: 0.7 }
"#;
        let provider = StaticPriceProvider::new(&[("VTI", 100.0)]);
        let importer = RecordingImporter::new(ImportOutcome::Created);

        let result = run(&config(yaml), &provider, Some(&importer)).await;

        assert!(result.is_err());
        assert!(importer.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_failure_is_fatal() {
        let mut provider = StaticPriceProvider::new(&[("VTI", 100.0), ("BND", 50.0)]);
        provider.failing = Some("VTI".to_string());
        let importer = RecordingImporter::new(ImportOutcome::Created);

        let err = run(&config(TWO_FUND), &provider, Some(&importer))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Batch price fetch failed"));
        assert!(importer.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_submits_nothing() {
        let provider = StaticPriceProvider::new(&[("VTI", 100.0), ("BND", 50.0)]);
        let report = run(&config(TWO_FUND), &provider, None).await.unwrap();
        assert_eq!(report.contributions, 2);
        assert_eq!(report.transactions_created, 0);
    }
}

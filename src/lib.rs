pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::import::ImportReport;
use crate::core::config::{AppConfig, ImportSettings};
use crate::core::importer::ActivityImporter;
use crate::providers::{GhostfolioClient, YahooFinanceProvider};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    Validate,
    Import {
        dry_run: bool,
    },
    Contribute {
        account: String,
        amount: f64,
        date: Option<NaiveDate>,
        dry_run: bool,
    },
}

impl AppCommand {
    /// Whether the command talks to the import service.
    pub fn submits(&self) -> bool {
        match self {
            AppCommand::Validate => false,
            AppCommand::Import { dry_run } | AppCommand::Contribute { dry_run, .. } => !dry_run,
        }
    }
}

/// Loads the config (and, when submitting, the credentials from the
/// environment) and runs `command`.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Contribution importer starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let settings = if command.submits() {
        Some(ImportSettings::from_env()?)
    } else {
        None
    };

    run_with(command, &config, settings.as_ref()).await?;
    Ok(())
}

/// Runs `command` against an already loaded config. `settings` is required
/// for commands that submit.
pub async fn run_with(
    command: AppCommand,
    config: &AppConfig,
    settings: Option<&ImportSettings>,
) -> Result<ImportReport> {
    match command {
        AppCommand::Validate => {
            cli::validate::run(config)?;
            Ok(ImportReport::default())
        }
        AppCommand::Import { dry_run } => {
            let price_provider = YahooFinanceProvider::new(config.providers.yahoo_base_url())?;
            let client = import_client(dry_run, settings)?;
            cli::import::run(config, &price_provider, as_importer(&client)).await
        }
        AppCommand::Contribute {
            account,
            amount,
            date,
            dry_run,
        } => {
            let price_provider = YahooFinanceProvider::new(config.providers.yahoo_base_url())?;
            let client = import_client(dry_run, settings)?;
            cli::contribute::run(
                config,
                &account,
                amount,
                date,
                &price_provider,
                as_importer(&client),
            )
            .await
        }
    }
}

fn import_client(
    dry_run: bool,
    settings: Option<&ImportSettings>,
) -> Result<Option<GhostfolioClient>> {
    if dry_run {
        return Ok(None);
    }
    let settings = settings.context("Import settings are required to submit transactions")?;
    Ok(Some(GhostfolioClient::new(settings)?))
}

fn as_importer(client: &Option<GhostfolioClient>) -> Option<&(dyn ActivityImporter + Send + Sync)> {
    client
        .as_ref()
        .map(|c| c as &(dyn ActivityImporter + Send + Sync))
}

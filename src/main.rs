use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::Path;
use contrib_import::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for contrib_import::AppCommand {
    fn from(cmd: Commands) -> contrib_import::AppCommand {
        match cmd {
            Commands::Validate => contrib_import::AppCommand::Validate,
            Commands::Import { dry_run } => contrib_import::AppCommand::Import { dry_run },
            Commands::Contribute {
                account,
                amount,
                date,
                dry_run,
            } => contrib_import::AppCommand::Contribute {
                account,
                amount,
                date,
                dry_run,
            },
            Commands::Setup { .. } => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an example configuration
    Setup {
        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Check allocations and contributions without importing anything
    Validate,
    /// Import every scheduled contribution
    Import {
        /// Show the transactions instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Import a single contribution to one account
    Contribute {
        /// Account name or id
        #[arg(short, long)]
        account: String,

        /// Cash amount to allocate
        #[arg(long)]
        amount: f64,

        /// Trade date (YYYY-MM-DD); latest closes and today's date when omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Show the transactions instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let result = match cli.command {
        Some(Commands::Setup { force }) => {
            contrib_import::cli::setup::setup(cli.config_path.as_deref().map(Path::new), force)
                .map(|_| ())
        }
        Some(cmd) => contrib_import::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

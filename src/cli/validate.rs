use super::import::validate_config;
use super::ui;
use crate::core::config::AppConfig;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

/// Checks the config and shows the targets it describes, without fetching
/// prices or submitting anything.
pub fn run(config: &AppConfig) -> Result<()> {
    validate_config(config)?;
    println!("\n{}", allocation_table(config));
    Ok(())
}

fn allocation_table(config: &AppConfig) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Account"),
        ui::header_cell("Ticker"),
        ui::header_cell("Weight (%)"),
        ui::header_cell("Scheduled"),
    ]);

    for account in &config.accounts {
        let scheduled: f64 = account.contributions.iter().map(|c| c.amount).sum();
        for (i, (ticker, weight)) in account.holdings.iter().enumerate() {
            let (name, total) = if i == 0 {
                (
                    account.name.clone(),
                    format!("{:.2} {}", scheduled, account.currency),
                )
            } else {
                (String::new(), String::new())
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(ticker),
                Cell::new(format!("{:.2}", weight * 100.0)).set_alignment(CellAlignment::Right),
                Cell::new(total).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    table
}

use crate::core::transaction::Transaction;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Success,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Success => style(text).green(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Renders transactions that would be submitted.
pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Symbol"),
        header_cell("Type"),
        header_cell("Quantity"),
        header_cell("Unit price"),
        header_cell("Value"),
    ]);

    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.date),
            Cell::new(&tx.symbol),
            Cell::new("BUY"),
            number_cell(format!("{:.4}", tx.quantity)),
            number_cell(format!("{:.2} {}", tx.unit_price, tx.currency)),
            number_cell(format!("{:.2}", tx.quantity * tx.unit_price)),
        ]);
    }
    table
}

/// Line printed for each transaction the tracker accepted.
pub fn added_line(tx: &Transaction) -> String {
    format!(
        "✅ Added {} shares of {} on {} @ {}",
        tx.quantity, tx.symbol, tx.date, tx.unit_price
    )
}

/// A spinner shown while a blocking lookup runs.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(spinner_style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub mod ghostfolio;
pub mod yahoo_finance;

pub use ghostfolio::GhostfolioClient;
pub use yahoo_finance::YahooFinanceProvider;

//! Core business logic abstractions

pub mod config;
pub mod date;
pub mod importer;
pub mod log;
pub mod price;
pub mod transaction;
pub mod validate;

// Re-export main types for cleaner imports
pub use importer::{ActivityImporter, ImportOutcome};
pub use price::{PriceMap, PriceProvider};
pub use transaction::{Allocation, Transaction};

//! Submission of transactions to the portfolio tracker

use crate::core::transaction::Transaction;
use anyhow::Result;
use async_trait::async_trait;

/// How the import endpoint answered a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every activity in the batch was recorded.
    Created,
    /// Anything other than 201; nothing is assumed recorded.
    Rejected { status: u16, body: String },
}

impl ImportOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ImportOutcome::Created)
    }
}

#[async_trait]
pub trait ActivityImporter: Send + Sync {
    /// Sends all `transactions` as a single batch. Transport failures are
    /// errors; a response with an unexpected status is a `Rejected` outcome.
    async fn submit(&self, transactions: &[Transaction]) -> Result<ImportOutcome>;
}

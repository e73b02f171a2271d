//! Load-time checks on account allocations and contributions

use crate::core::config::Account;
use anyhow::{Result, bail};
use tracing::debug;

/// Allowed deviation of the summed weights from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Checks a single account, failing on the first violation found.
///
/// Weights must sum to 1.0 within [`WEIGHT_TOLERANCE`], no weight may be
/// negative and every contribution amount must be strictly positive.
pub fn validate_account(account: &Account) -> Result<()> {
    let total = account.holdings.total_weight();
    // Written so that a NaN total fails as well.
    if !((total - 1.0).abs() <= WEIGHT_TOLERANCE) {
        bail!(
            "Allocations must sum to 1.0, got {} for {}",
            total,
            account.name
        );
    }

    for (ticker, weight) in account.holdings.iter() {
        if weight < 0.0 {
            bail!("Negative allocation for {} in {}", ticker, account.name);
        }
    }

    for contribution in &account.contributions {
        if !is_valid_amount(contribution.amount) {
            bail!(
                "Contribution must be > 0 for {} on {}",
                account.name,
                contribution.date
            );
        }
    }

    debug!(account = %account.name, "Account validated");
    Ok(())
}

/// A contribution amount must be a finite number above zero.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Validates every account before anything else runs; `on_valid` is invoked
/// once per account that passes.
pub fn validate_accounts<F>(accounts: &[Account], mut on_valid: F) -> Result<()>
where
    F: FnMut(&Account),
{
    for account in accounts {
        validate_account(account)?;
        on_valid(account);
    }
    Ok(())
}

//! Update command handlers.

use crate::api::Mode;
use crate::commands::{budget_line, open, transaction_line, Out};
use crate::model::{Budget, BudgetPatch, EntityId, Transaction, TransactionPatch};
use crate::view::Palette;
use crate::{Config, Result};
use anyhow::ensure;

/// Sends `patch` for transaction `id` and returns the transaction as the store confirmed it.
///
/// # Errors
/// - Returns an error if `patch` has no fields or the store rejects the update.
pub async fn update_transaction(
    config: &Config,
    mode: Mode,
    id: &EntityId,
    patch: TransactionPatch,
) -> Result<Out<Transaction>> {
    ensure!(!patch.is_empty(), "Nothing to update, pass at least one field");
    let cache = open(config, mode).await?;
    let updated = cache.update_transaction(id, &patch).await?;
    let message = format!(
        "Updated transaction {}",
        transaction_line(&Palette::default(), &updated)
    );
    Ok(Out::new(message, updated))
}

pub async fn update_budget(
    config: &Config,
    mode: Mode,
    id: &EntityId,
    patch: BudgetPatch,
) -> Result<Out<Budget>> {
    ensure!(!patch.is_empty(), "Nothing to update, pass at least one field");
    let cache = open(config, mode).await?;
    let updated = cache.update_budget(id, &patch).await?;
    let message = format!(
        "Updated budget {}",
        budget_line(&Palette::default(), &updated)
    );
    Ok(Out::new(message, updated))
}

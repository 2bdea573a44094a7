//! List command handlers.

use crate::api::Mode;
use crate::commands::{budget_line, open, plural, transaction_line, Out};
use crate::model::{Budget, Transaction};
use crate::view::Palette;
use crate::{Config, Result};

/// Loads the remote store and returns every transaction, one display line per transaction.
pub async fn list_transactions(config: &Config, mode: Mode) -> Result<Out<Vec<Transaction>>> {
    let cache = open(config, mode).await?;
    let palette = Palette::default();
    let transactions = cache.transactions();
    let mut message = plural(transactions.len(), "transaction", "transactions");
    for t in &transactions {
        message.push('\n');
        message.push_str(&transaction_line(&palette, t));
    }
    Ok(Out::new(message, transactions))
}

/// Loads the remote store and returns every budget, one display line per budget.
pub async fn list_budgets(config: &Config, mode: Mode) -> Result<Out<Vec<Budget>>> {
    let cache = open(config, mode).await?;
    let palette = Palette::default();
    let budgets = cache.budgets();
    let mut message = plural(budgets.len(), "budget", "budgets");
    for b in &budgets {
        message.push('\n');
        message.push_str(&budget_line(&palette, b));
    }
    Ok(Out::new(message, budgets))
}

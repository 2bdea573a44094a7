//! Add command handlers.

use crate::api::Mode;
use crate::commands::{budget_line, open, transaction_line, Out};
use crate::model::{Budget, BudgetDraft, Transaction, TransactionDraft};
use crate::view::Palette;
use crate::{Config, Result};
use anyhow::ensure;

/// Creates a transaction in the remote store and returns it with the identity the store assigned.
///
/// # Errors
/// - Returns an error if the description or category is empty, or if the store rejects the create.
pub async fn add_transaction(
    config: &Config,
    mode: Mode,
    draft: TransactionDraft,
) -> Result<Out<Transaction>> {
    ensure!(
        !draft.description.trim().is_empty(),
        "A transaction needs a description"
    );
    ensure!(
        !draft.category.trim().is_empty(),
        "A transaction needs a category"
    );
    let cache = open(config, mode).await?;
    let created = cache.add_transaction(&draft).await?;
    let message = format!(
        "Added transaction {}",
        transaction_line(&Palette::default(), &created)
    );
    Ok(Out::new(message, created))
}

/// Creates a budget in the remote store.
pub async fn add_budget(config: &Config, mode: Mode, draft: BudgetDraft) -> Result<Out<Budget>> {
    ensure!(
        !draft.category.trim().is_empty(),
        "A budget needs a category"
    );
    let cache = open(config, mode).await?;
    let created = cache.add_budget(&draft).await?;
    let message = format!("Added budget {}", budget_line(&Palette::default(), &created));
    Ok(Out::new(message, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, TransactionType};
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    fn draft() -> TransactionDraft {
        TransactionDraft {
            amount: Decimal::new(1250, 2),
            date: "2025-02-01".into(),
            description: "Lunch".into(),
            category: "Food & Dining".into(),
            kind: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn test_add_transaction() {
        let env = TestEnv::new().await;
        let out = add_transaction(&env.config(), Mode::Test, draft())
            .await
            .unwrap();
        let created = out.structure().unwrap();
        assert!(!created.id().is_empty());
        assert_eq!(created.description(), "Lunch");
        assert!(out.message().contains("-$12.50"));
    }

    #[tokio::test]
    async fn test_add_transaction_requires_description() {
        let env = TestEnv::new().await;
        let mut d = draft();
        d.description = "  ".into();
        let e = add_transaction(&env.config(), Mode::Test, d)
            .await
            .unwrap_err();
        assert!(e.to_string().contains("description"));
    }

    #[tokio::test]
    async fn test_add_budget() {
        let env = TestEnv::new().await;
        let out = add_budget(
            &env.config(),
            Mode::Test,
            BudgetDraft {
                category: "Travel".into(),
                amount: Decimal::from(900),
                month: "2025-06".into(),
            },
        )
        .await
        .unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.category(), "Travel");
        assert!(out.message().contains("Travel (#F7DC6F)"));
    }
}

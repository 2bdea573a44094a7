use crate::model::{Collection, Entity, EntityId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spending limit for one category in one month. Uniqueness of (category, month) is left to the
/// caller.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    id: EntityId,
    category: String,
    amount: Decimal,
    /// A period key such as `2025-01`.
    month: String,
}

impl Budget {
    pub fn new(id: EntityId, draft: BudgetDraft) -> Self {
        Self {
            id,
            category: draft.category,
            amount: draft.amount,
            month: draft.month,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn month(&self) -> &str {
        &self.month
    }
}

impl Entity for Budget {
    type Draft = BudgetDraft;
    type Patch = BudgetPatch;
    const COLLECTION: Collection = Collection::Budgets;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BudgetDraft {
    pub category: String,
    pub amount: Decimal,
    pub month: String,
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BudgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}

impl BudgetPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

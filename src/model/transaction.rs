use crate::model::{Collection, Entity, EntityId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether money came in or went out. Determines the sign used when an amount is displayed; the
/// stored amount itself is never signed.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single transaction as confirmed by the remote store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: EntityId,
    amount: Decimal,
    date: String,
    description: String,
    category: String,
    #[serde(rename = "type")]
    kind: TransactionType,
}

impl Transaction {
    pub fn new(id: EntityId, draft: TransactionDraft) -> Self {
        Self {
            id,
            amount: draft.amount,
            date: draft.date,
            description: draft.description,
            category: draft.category,
            kind: draft.kind,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }
}

impl Entity for Transaction {
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;
    const COLLECTION: Collection = Collection::Transactions;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A transaction that has not been stored yet. The remote store assigns the identity.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub date: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// Any subset of a transaction's mutable fields. Fields left as `None` are not sent.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

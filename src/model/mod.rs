//! Types that represent the core data model, such as `Transaction` and `Budget`, and the
//! reconciliation of the raw shapes the remote store sends.
mod budget;
mod category;
mod id;
pub mod raw;
mod transaction;

pub use budget::{Budget, BudgetDraft, BudgetPatch};
pub use category::{default_categories, Category, DEFAULT_CATEGORIES, FALLBACK_COLOR};
pub use id::{EmptyIdError, EntityId};
pub use raw::{RawEntity, ReconcileError};
pub use transaction::{Transaction, TransactionDraft, TransactionPatch, TransactionType};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The remote collections.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Transactions,
    Budgets,
}

serde_plain::derive_display_from_serialize!(Collection);
serde_plain::derive_fromstr_from_deserialize!(Collection);

impl Collection {
    /// The resource path of the collection, relative to the configured base URL.
    pub fn path(&self) -> String {
        format!("api/{self}")
    }

    /// The resource path of one member of the collection. The id is percent-encoded into a single
    /// path segment.
    ///
    /// # Errors
    /// - `DotSegmentId` if `id` is `.` or `..`. URL resolution collapses those, percent-encoded or
    ///   not, into the collection or its parent, so they cannot address a member.
    pub fn member_path(&self, id: &EntityId) -> Result<String, DotSegmentId> {
        if matches!(id.as_str(), "." | "..") {
            return Err(DotSegmentId(id.clone()));
        }
        Ok(format!("{}/{}", self.path(), urlencoding::encode(id.as_str())))
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Transactions => "transaction",
            Collection::Budgets => "budget",
        }
    }
}

/// An entity kind that is stored remotely and mirrored by the cache.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The entity without identity, as sent on create.
    type Draft: Serialize + Debug + Send + Sync;

    /// A subset of mutable fields, as sent on update.
    type Patch: Serialize + Debug + Send + Sync;

    const COLLECTION: Collection;

    fn id(&self) -> &EntityId;
}

/// Returned when an id cannot be placed in a request path.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("the id '{0}' cannot be used in a request path")]
pub struct DotSegmentId(pub EntityId);

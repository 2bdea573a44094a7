//! The synchronized cache.
//!
//! `FinanceCache` is the single owner of the in-memory transactions and budgets. It never changes
//! a list speculatively: each mutation is sent through the matching `Remote` first, and only the
//! store's confirmed result is spliced into local state. State is published through a
//! `tokio::sync::watch` channel so any number of readers can observe it.

mod list;

use crate::api::{Remote, Transport};
use crate::error::TransportError;
use crate::model::{
    Budget, BudgetDraft, BudgetPatch, Entity, EntityId, Transaction, TransactionDraft,
    TransactionPatch,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

type Res<T> = std::result::Result<T, TransportError>;

/// The fixed indication stored when the initial load fails.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, thiserror::Error)]
#[error("Failed to load data")]
pub struct LoadError;

/// A snapshot of everything the cache holds.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FinanceState {
    /// Most recent first after additions, otherwise in load order.
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    /// True until the initial load has finished, successfully or not.
    pub loading: bool,
    pub error: Option<LoadError>,
}

impl Default for FinanceState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            budgets: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// Holds the authoritative lists and routes every change through the remote store.
pub struct FinanceCache {
    state: watch::Sender<FinanceState>,
    transactions: Remote<Transaction>,
    budgets: Remote<Budget>,
    mounted: AtomicBool,
}

impl FinanceCache {
    /// Creates an empty cache in the loading state. Nothing is fetched until `mount`.
    pub fn new(transactions: Remote<Transaction>, budgets: Remote<Budget>) -> Self {
        let (state, _) = watch::channel(FinanceState::default());
        Self {
            state,
            transactions,
            budgets,
            mounted: AtomicBool::new(false),
        }
    }

    /// Creates a cache whose adapters share one `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(Remote::new(transport.clone()), Remote::new(transport))
    }

    /// Performs the initial bulk load of both collections. Only the first call does anything.
    ///
    /// A failure is not returned; it is recorded in `FinanceState::error`, both lists stay empty
    /// and `loading` is cleared.
    pub async fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("Cache is already mounted");
            return;
        }
        info!("Loading finance data");
        let result = tokio::try_join!(self.transactions.list(), self.budgets.list());
        match result {
            Ok((transactions, budgets)) => {
                info!(
                    "Loaded {} transactions and {} budgets",
                    transactions.len(),
                    budgets.len()
                );
                self.state.send_modify(|s| {
                    s.transactions = transactions;
                    s.budgets = budgets;
                    s.loading = false;
                    s.error = None;
                });
            }
            Err(e) => {
                error!("Failed to load data: {e}");
                self.state.send_modify(|s| {
                    s.transactions.clear();
                    s.budgets.clear();
                    s.loading = false;
                    s.error = Some(LoadError);
                });
            }
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> FinanceState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<FinanceState> {
        self.state.subscribe()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().transactions.clone()
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.state.borrow().budgets.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<LoadError> {
        self.state.borrow().error
    }

    pub async fn add_transaction(&self, draft: &TransactionDraft) -> Res<Transaction> {
        self.add::<Transaction>(draft).await
    }

    /// Returns the transaction as confirmed by the store. If `id` is not held locally the result
    /// is not inserted.
    pub async fn update_transaction(
        &self,
        id: &EntityId,
        patch: &TransactionPatch,
    ) -> Res<Transaction> {
        self.update::<Transaction>(id, patch).await
    }

    pub async fn delete_transaction(&self, id: &EntityId) -> Res<()> {
        self.delete::<Transaction>(id).await
    }

    pub async fn add_budget(&self, draft: &BudgetDraft) -> Res<Budget> {
        self.add::<Budget>(draft).await
    }

    /// Returns the budget as confirmed by the store. If `id` is not held locally the result is not
    /// inserted.
    pub async fn update_budget(&self, id: &EntityId, patch: &BudgetPatch) -> Res<Budget> {
        self.update::<Budget>(id, patch).await
    }

    pub async fn delete_budget(&self, id: &EntityId) -> Res<()> {
        self.delete::<Budget>(id).await
    }

    async fn add<E: Cached>(&self, draft: &E::Draft) -> Res<E> {
        let created = E::remote(self).create(draft).await?;
        self.state
            .send_modify(|s| list::prepend(E::items_mut(s), created.clone()));
        info!("Added {} {}", E::COLLECTION.singular(), created.id());
        Ok(created)
    }

    async fn update<E: Cached>(&self, id: &EntityId, patch: &E::Patch) -> Res<E> {
        let updated = E::remote(self).update(id, patch).await?;
        let mut replaced = 0;
        self.state.send_if_modified(|s| {
            replaced = list::replace(E::items_mut(s), id, &updated);
            replaced > 0
        });
        if replaced == 0 {
            debug!(
                "Updated {} {id} is not held locally, leaving state unchanged",
                E::COLLECTION.singular()
            );
        } else {
            info!("Updated {} {id}", E::COLLECTION.singular());
        }
        Ok(updated)
    }

    async fn delete<E: Cached>(&self, id: &EntityId) -> Res<()> {
        E::remote(self).delete(id).await?;
        let mut removed = 0;
        self.state.send_if_modified(|s| {
            removed = list::remove(E::items_mut(s), id);
            removed > 0
        });
        info!("Deleted {} {id} ({removed} removed locally)", E::COLLECTION.singular());
        Ok(())
    }
}

/// Connects an entity kind to its list in `FinanceState` and its adapter in `FinanceCache`.
trait Cached: Entity {
    fn items_mut(state: &mut FinanceState) -> &mut Vec<Self>;

    fn remote(cache: &FinanceCache) -> &Remote<Self>;
}

impl Cached for Transaction {
    fn items_mut(state: &mut FinanceState) -> &mut Vec<Self> {
        &mut state.transactions
    }

    fn remote(cache: &FinanceCache) -> &Remote<Self> {
        &cache.transactions
    }
}

impl Cached for Budget {
    fn items_mut(state: &mut FinanceState) -> &mut Vec<Self> {
        &mut state.budgets
    }

    fn remote(cache: &FinanceCache) -> &Remote<Self> {
        &cache.budgets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryTransport, Method, Res as RawRes};
    use crate::error::{Operation, TransportErrorKind};
    use crate::model::TransactionType;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::{mpsc, oneshot};

    fn tx(id: &str, amount: i64) -> Value {
        json!({
            "_id": id,
            "amount": amount,
            "date": "2025-01-05",
            "description": format!("item {id}"),
            "category": "Other",
            "type": "expense"
        })
    }

    fn draft(amount: i64) -> TransactionDraft {
        TransactionDraft {
            amount: Decimal::from(amount),
            date: "2025-01-06".into(),
            description: "new".into(),
            category: "Shopping".into(),
            kind: TransactionType::Expense,
        }
    }

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn ids(items: &[Transaction]) -> Vec<String> {
        items.iter().map(|t| t.id().to_string()).collect()
    }

    async fn mounted(transport: Arc<MemoryTransport>) -> FinanceCache {
        let cache = FinanceCache::with_transport(transport);
        cache.mount().await;
        cache
    }

    #[tokio::test]
    async fn test_initial_state() {
        let cache = FinanceCache::with_transport(Arc::new(MemoryTransport::seeded()));
        let state = cache.snapshot();
        assert!(state.loading);
        assert!(state.error.is_none());
        assert!(state.transactions.is_empty());
        assert!(state.budgets.is_empty());
    }

    #[tokio::test]
    async fn test_mount_loads_both_collections() {
        let cache = mounted(Arc::new(MemoryTransport::seeded())).await;
        let state = cache.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.transactions.len(), 5);
        assert_eq!(state.budgets.len(), 3);
        assert!(state.transactions.iter().all(|t| !t.id().is_empty()));
    }

    #[tokio::test]
    async fn test_mount_failure_leaves_lists_empty() {
        let t = Arc::new(MemoryTransport::seeded());
        t.fail_next(
            Method::Get,
            "api/budgets",
            TransportErrorKind::Status {
                status: 500,
                body: "boom".into(),
            },
        );
        let cache = mounted(t).await;
        let state = cache.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, Some(LoadError));
        assert_eq!(state.error.unwrap().to_string(), "Failed to load data");
        assert!(state.transactions.is_empty());
        assert!(state.budgets.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_load_failure_leaves_lists_empty() {
        let t = Arc::new(MemoryTransport::seeded());
        t.fail_next(
            Method::Get,
            "api/transactions",
            TransportErrorKind::Network("connection reset".into()),
        );
        let cache = mounted(t).await;
        let state = cache.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, Some(LoadError));
        assert!(state.transactions.is_empty());
        assert!(state.budgets.is_empty());
    }

    #[tokio::test]
    async fn test_mount_runs_once() {
        let t = Arc::new(MemoryTransport::seeded());
        let cache = mounted(t.clone()).await;
        cache.mount().await;
        let gets = t
            .calls()
            .into_iter()
            .filter(|c| c.method == Method::Get)
            .count();
        assert_eq!(gets, 2);
    }

    #[tokio::test]
    async fn test_add_prepends() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1), tx("b", 2)], vec![]));
        let cache = mounted(t).await;
        let created = cache.add_transaction(&draft(10)).await.unwrap();
        let items = cache.transactions();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], created);
        assert_eq!(ids(&items[1..]), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_add_failure_leaves_state() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1)], vec![]));
        let cache = mounted(t.clone()).await;
        let before = cache.snapshot();
        t.fail_next(
            Method::Post,
            "api/transactions",
            TransportErrorKind::Status {
                status: 422,
                body: "amount is required".into(),
            },
        );
        let e = cache.add_transaction(&draft(10)).await.unwrap_err();
        assert_eq!(e.operation(), Operation::Create);
        assert_eq!(cache.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let t = Arc::new(MemoryTransport::new(
            vec![tx("a", 1), tx("b", 2), tx("c", 3)],
            vec![],
        ));
        let cache = mounted(t).await;
        let patch = TransactionPatch {
            amount: Some(Decimal::from(20)),
            ..Default::default()
        };
        cache.update_transaction(&id("b"), &patch).await.unwrap();
        let items = cache.transactions();
        assert_eq!(ids(&items), vec!["a", "b", "c"]);
        assert_eq!(items[1].amount(), Decimal::from(20));
        assert_eq!(items[1].description(), "item b");
        assert_eq!(items[0].amount(), Decimal::from(1));
        assert_eq!(items[2].amount(), Decimal::from(3));
    }

    #[tokio::test]
    async fn test_update_of_unheld_id_is_noop() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1)], vec![]));
        let cache = FinanceCache::with_transport(t.clone());
        cache.mount().await;
        // Present remotely but not locally.
        t.post("api/transactions", tx("ignored", 0)).await.unwrap();
        let remote_only = t.stored(crate::model::Collection::Transactions)[1]["_id"]
            .as_str()
            .unwrap()
            .to_string();
        let before = cache.snapshot();
        let patch = TransactionPatch {
            description: Some("changed".into()),
            ..Default::default()
        };
        let updated = cache
            .update_transaction(&id(&remote_only), &patch)
            .await
            .unwrap();
        assert_eq!(updated.description(), "changed");
        assert_eq!(cache.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_state() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1)], vec![]));
        let cache = mounted(t.clone()).await;
        let before = cache.snapshot();
        t.fail_next(
            Method::Put,
            "api/transactions/a",
            TransportErrorKind::Network("reset".into()),
        );
        let patch = TransactionPatch {
            amount: Some(Decimal::from(99)),
            ..Default::default()
        };
        assert!(cache.update_transaction(&id("a"), &patch).await.is_err());
        assert_eq!(cache.snapshot(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let t = Arc::new(MemoryTransport::new(
            vec![tx("a", 1), tx("b", 2), tx("c", 3)],
            vec![],
        ));
        let cache = mounted(t).await;
        cache.delete_transaction(&id("b")).await.unwrap();
        assert_eq!(ids(&cache.transactions()), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_state() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1), tx("b", 2)], vec![]));
        let cache = mounted(t.clone()).await;
        t.fail_next(
            Method::Delete,
            "api/transactions/a",
            TransportErrorKind::Status {
                status: 503,
                body: "unavailable".into(),
            },
        );
        let e = cache.delete_transaction(&id("a")).await.unwrap_err();
        assert_eq!(e.operation(), Operation::Delete);
        assert_eq!(ids(&cache.transactions()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_budget_mutations() {
        let t = Arc::new(MemoryTransport::new(
            vec![],
            vec![json!({"id": "b1", "category": "Travel", "amount": 100, "month": "2025-01"})],
        ));
        let cache = mounted(t).await;
        let created = cache
            .add_budget(&BudgetDraft {
                category: "Education".into(),
                amount: Decimal::from(50),
                month: "2025-01".into(),
            })
            .await
            .unwrap();
        assert_eq!(cache.budgets()[0], created);
        let patch = BudgetPatch {
            amount: Some(Decimal::from(120)),
            ..Default::default()
        };
        cache.update_budget(&id("b1"), &patch).await.unwrap();
        assert_eq!(cache.budgets()[1].amount(), Decimal::from(120));
        cache.delete_budget(created.id()).await.unwrap();
        let budgets = cache.budgets();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].id(), &id("b1"));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1)], vec![]));
        let cache = FinanceCache::with_transport(t);
        let mut rx = cache.subscribe();
        cache.mount().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().transactions.len(), 1);
        cache.add_transaction(&draft(5)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().transactions.len(), 2);
    }

    /// The end-to-end scenario: load, add, delete, then a failing update.
    #[tokio::test]
    async fn test_end_to_end() {
        let t = Arc::new(MemoryTransport::new(vec![tx("a", 1)], vec![]));
        let cache = mounted(t.clone()).await;
        let state = cache.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(ids(&state.transactions), vec!["a"]);
        assert!(state.budgets.is_empty());

        let b = cache.add_transaction(&draft(10)).await.unwrap();
        let b_id = b.id().to_string();
        assert_eq!(ids(&cache.transactions()), vec![b_id.clone(), "a".to_string()]);

        cache.delete_transaction(&id("a")).await.unwrap();
        assert_eq!(ids(&cache.transactions()), vec![b_id.clone()]);

        t.fail_next(
            Method::Put,
            format!("api/transactions/{b_id}"),
            TransportErrorKind::Network("offline".into()),
        );
        let patch = TransactionPatch {
            amount: Some(Decimal::from(20)),
            ..Default::default()
        };
        let e = cache.update_transaction(b.id(), &patch).await.unwrap_err();
        assert_eq!(e.operation(), Operation::Update);
        assert_eq!(cache.transactions(), vec![b]);
    }

    /// Wraps a `MemoryTransport` and holds each PUT whose body has a registered gate until the gate
    /// is opened. Arrivals are reported so a test knows both requests are in flight.
    struct GatedTransport {
        inner: MemoryTransport,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        arrivals: mpsc::UnboundedSender<String>,
    }

    #[async_trait::async_trait]
    impl Transport for GatedTransport {
        async fn get(&self, path: &str) -> RawRes<Value> {
            self.inner.get(path).await
        }

        async fn post(&self, path: &str, body: Value) -> RawRes<Value> {
            self.inner.post(path, body).await
        }

        async fn put(&self, path: &str, body: Value) -> RawRes<Value> {
            let key = body.to_string();
            let gate = self.gates.lock().unwrap().remove(&key);
            let _ = self.arrivals.send(key);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.put(path, body).await
        }

        async fn delete(&self, path: &str) -> RawRes<()> {
            self.inner.delete(path).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_updates_last_completion_wins() {
        let (arrivals_tx, mut arrivals) = mpsc::unbounded_channel();
        let (open_first, first_gate) = oneshot::channel();
        let (open_second, second_gate) = oneshot::channel();
        let first = TransactionPatch {
            amount: Some(Decimal::from(1)),
            ..Default::default()
        };
        let second = TransactionPatch {
            amount: Some(Decimal::from(2)),
            ..Default::default()
        };
        let mut gates = HashMap::new();
        gates.insert(serde_json::to_value(&first).unwrap().to_string(), first_gate);
        gates.insert(serde_json::to_value(&second).unwrap().to_string(), second_gate);
        let transport = Arc::new(GatedTransport {
            inner: MemoryTransport::new(vec![tx("a", 0)], vec![]),
            gates: Mutex::new(gates),
            arrivals: arrivals_tx,
        });
        let cache = Arc::new(FinanceCache::with_transport(transport));
        cache.mount().await;

        let c = cache.clone();
        let first_call = tokio::spawn(async move { c.update_transaction(&id("a"), &first).await });
        let c = cache.clone();
        let second_call =
            tokio::spawn(async move { c.update_transaction(&id("a"), &second).await });

        // Both requests are in flight before either resolves.
        arrivals.recv().await.unwrap();
        arrivals.recv().await.unwrap();

        open_second.send(()).unwrap();
        second_call.await.unwrap().unwrap();
        assert_eq!(cache.transactions()[0].amount(), Decimal::from(2));

        open_first.send(()).unwrap();
        first_call.await.unwrap().unwrap();
        assert_eq!(cache.transactions()[0].amount(), Decimal::from(1));
    }
}

//! Implements the `Transport` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a backend. It mimics the backend's REST routes, assigns `_id` values
//! on create the way the real store does, and lets tests queue failures for specific requests.

use crate::api::{Res, Transport};
use crate::error::TransportErrorKind;
use crate::model::raw::{canonical_id, RawEntity, ALT_ID};
use crate::model::Collection;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// The HTTP verb a request was (or would have been) sent with.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request observed by a `MemoryTransport`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug)]
struct Failure {
    method: Method,
    path: String,
    kind: TransportErrorKind,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<Collection, Vec<Value>>,
    failures: Vec<Failure>,
    calls: Vec<Call>,
}

/// An in-process stand-in for the remote store.
#[derive(Debug)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl Default for MemoryTransport {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::seeded()
    }
}

impl MemoryTransport {
    /// Creates a store holding the given raw objects. Objects may use either identity field.
    pub fn new(transactions: Vec<Value>, budgets: Vec<Value>) -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(Collection::Transactions, transactions);
        collections.insert(Collection::Budgets, budgets);
        Self {
            state: Mutex::new(State {
                collections,
                ..State::default()
            }),
        }
    }

    /// Creates a store with no data.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Creates a store holding the seed data from this module.
    pub fn seeded() -> Self {
        Self::new(seed_transactions(), seed_budgets())
    }

    /// Makes the next `method` request to exactly `path` fail with `kind`. Queued failures are
    /// consumed in the order they were added.
    pub fn fail_next(&self, method: Method, path: impl Into<String>, kind: TransportErrorKind) {
        self.lock().failures.push(Failure {
            method,
            path: path.into(),
            kind,
        });
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// The raw objects currently stored for `collection`.
    pub fn stored(&self, collection: Collection) -> Vec<Value> {
        self.lock()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the store half-written, so poisoning is
        // ignored.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handle(&self, method: Method, path: &str, body: Option<Value>) -> Res<Value> {
        let mut state = self.lock();
        trace!("{method:?} {path} (memory)");
        state.calls.push(Call {
            method,
            path: path.to_string(),
            body: body.clone(),
        });
        if let Some(ix) = state
            .failures
            .iter()
            .position(|f| f.method == method && f.path == path)
        {
            return Err(state.failures.remove(ix).kind);
        }

        let (collection, id) = route(path)?;
        let items = state.collections.entry(collection).or_default();
        match (method, id) {
            (Method::Get, None) => Ok(Value::Array(items.clone())),
            (Method::Post, None) => {
                let mut object = as_object(body)?;
                object.insert(
                    ALT_ID.to_string(),
                    Value::String(uuid::Uuid::new_v4().simple().to_string()),
                );
                let created = Value::Object(object);
                items.push(created.clone());
                Ok(created)
            }
            (Method::Put, Some(id)) => {
                let patch = as_object(body)?;
                let ix = position(items, &id).ok_or_else(|| not_found(&id))?;
                if let Value::Object(existing) = &mut items[ix] {
                    for (k, v) in patch {
                        existing.insert(k, v);
                    }
                }
                Ok(items[ix].clone())
            }
            (Method::Delete, Some(id)) => {
                let ix = position(items, &id).ok_or_else(|| not_found(&id))?;
                items.remove(ix);
                Ok(Value::Null)
            }
            _ => Err(TransportErrorKind::Status {
                status: 405,
                body: format!("{method:?} is not allowed on {path}"),
            }),
        }
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, path: &str) -> Res<Value> {
        self.handle(Method::Get, path, None)
    }

    async fn post(&self, path: &str, body: Value) -> Res<Value> {
        self.handle(Method::Post, path, Some(body))
    }

    async fn put(&self, path: &str, body: Value) -> Res<Value> {
        self.handle(Method::Put, path, Some(body))
    }

    async fn delete(&self, path: &str) -> Res<()> {
        self.handle(Method::Delete, path, None).map(|_| ())
    }
}

/// Splits `api/{collection}[/{id}]` into its parts.
fn route(path: &str) -> Res<(Collection, Option<String>)> {
    let mut parts = path.trim_matches('/').split('/');
    let collection = match (parts.next(), parts.next()) {
        (Some("api"), Some(name)) => Collection::from_str(name).ok(),
        _ => None,
    }
    .ok_or_else(|| TransportErrorKind::Status {
        status: 404,
        body: format!("no route for {path}"),
    })?;
    let id = parts
        .next()
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|id| id.into_owned())
                .map_err(|e| TransportErrorKind::Status {
                    status: 400,
                    body: format!("invalid id segment '{segment}': {e}"),
                })
        })
        .transpose()?;
    if parts.next().is_some() {
        return Err(TransportErrorKind::Status {
            status: 404,
            body: format!("no route for {path}"),
        });
    }
    Ok((collection, id))
}

fn position(items: &[Value], id: &str) -> Option<usize> {
    items.iter().position(|item| {
        RawEntity::try_from(item.clone())
            .ok()
            .and_then(|raw| canonical_id(&raw).ok())
            .is_some_and(|found| found == id)
    })
}

fn as_object(body: Option<Value>) -> Res<Map<String, Value>> {
    match body {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(TransportErrorKind::Status {
            status: 400,
            body: "request body must be a JSON object".to_string(),
        }),
    }
}

fn not_found(id: &str) -> TransportErrorKind {
    TransportErrorKind::Status {
        status: 404,
        body: format!("no entity with id '{id}'"),
    }
}

/// Seed transaction data. Mixes both identity conventions on purpose.
fn seed_transactions() -> Vec<Value> {
    vec![
        json!({"_id": "seed-t1", "amount": 3200, "date": "2025-01-01", "description": "January salary", "category": "Income", "type": "income"}),
        json!({"_id": "seed-t2", "amount": 87.43, "date": "2025-01-03", "description": "Whole Foods Market", "category": "Food & Dining", "type": "expense"}),
        json!({"id": "seed-t3", "amount": 52.3, "date": "2025-01-04", "description": "Shell gas station", "category": "Transportation", "type": "expense"}),
        json!({"_id": "seed-t4", "amount": 142.67, "date": "2025-01-06", "description": "PG&E electric", "category": "Bills & Utilities", "type": "expense"}),
        json!({"id": "seed-t5", "amount": 15.99, "date": "2025-01-08", "description": "Streaming subscription", "category": "Entertainment", "type": "expense"}),
    ]
}

/// Seed budget data.
fn seed_budgets() -> Vec<Value> {
    vec![
        json!({"_id": "seed-b1", "category": "Food & Dining", "amount": 400, "month": "2025-01"}),
        json!({"id": "seed-b2", "category": "Transportation", "amount": 150, "month": "2025-01"}),
        json!({"_id": "seed-b3", "category": "Entertainment", "amount": 60, "month": "2025-01"}),
    ]
}

//! The per-entity Remote Adapter.

use crate::api::Transport;
use crate::error::{Operation, TransportError, TransportErrorKind};
use crate::model::raw::{self, RawEntity, ReconcileError};
use crate::model::{Entity, EntityId};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

type Res<T> = std::result::Result<T, TransportError>;

/// Translates list/create/update/delete intents for one entity kind into single `Transport` calls,
/// and turns every entity in the response into a reconciled, typed `E`.
pub struct Remote<E> {
    transport: Arc<dyn Transport>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Remote<E> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> Remote<E>
where
    E: Entity,
{
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _entity: PhantomData,
        }
    }

    /// Fetches the full collection.
    pub async fn list(&self) -> Res<Vec<E>> {
        let op = Operation::List;
        let value = self
            .transport
            .get(&E::COLLECTION.path())
            .await
            .map_err(|kind| fail::<E>(op, kind))?;
        let items = raw::reconcile_all(value)
            .map_err(|e| fail::<E>(op, e.into()))?
            .into_iter()
            .map(|r| raw::decode::<E>(r).map_err(|e| fail::<E>(op, e.into())))
            .collect::<Res<Vec<E>>>()?;
        debug!("Fetched {} {}", items.len(), E::COLLECTION);
        Ok(items)
    }

    /// Submits a new entity and returns it with the identity the store assigned.
    pub async fn create(&self, draft: &E::Draft) -> Res<E> {
        let op = Operation::Create;
        let body = to_body::<E, _>(op, draft)?;
        let value = self
            .transport
            .post(&E::COLLECTION.path(), body)
            .await
            .map_err(|kind| fail::<E>(op, kind))?;
        let created = entity::<E>(op, value)?;
        debug!("Created {} {}", E::COLLECTION.singular(), created.id());
        Ok(created)
    }

    /// Submits `patch` for `id` and returns the full entity as confirmed by the store.
    pub async fn update(&self, id: &EntityId, patch: &E::Patch) -> Res<E> {
        let op = Operation::Update;
        let path = member_path::<E>(op, id)?;
        let body = to_body::<E, _>(op, patch)?;
        let value = self
            .transport
            .put(&path, body)
            .await
            .map_err(|kind| fail::<E>(op, kind))?;
        let updated = entity::<E>(op, value)?;
        debug!("Updated {} {id}", E::COLLECTION.singular());
        Ok(updated)
    }

    /// Requests removal of `id`.
    pub async fn delete(&self, id: &EntityId) -> Res<()> {
        let op = Operation::Delete;
        let path = member_path::<E>(op, id)?;
        self.transport
            .delete(&path)
            .await
            .map_err(|kind| fail::<E>(op, kind))?;
        debug!("Deleted {} {id}", E::COLLECTION.singular());
        Ok(())
    }
}

fn fail<E: Entity>(op: Operation, kind: TransportErrorKind) -> TransportError {
    TransportError::new(op, E::COLLECTION, kind)
}

fn member_path<E: Entity>(op: Operation, id: &EntityId) -> Res<String> {
    E::COLLECTION
        .member_path(id)
        .map_err(|e| fail::<E>(op, e.into()))
}

fn to_body<E: Entity, B: Serialize + ?Sized>(op: Operation, body: &B) -> Res<Value> {
    let value = serde_json::to_value(body)
        .map_err(|e| fail::<E>(op, TransportErrorKind::Decode(e.to_string())))?;
    trace!("{op} body {value}");
    Ok(value)
}

fn entity<E: Entity>(op: Operation, value: Value) -> Res<E> {
    let reconciled = RawEntity::try_from(value)
        .and_then(|r| raw::reconcile(&r))
        .map_err(|e| fail::<E>(op, e.into()))?;
    raw::decode(reconciled).map_err(|e| fail::<E>(op, e.into()))
}

impl From<ReconcileError> for TransportErrorKind {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::MissingIdentity => TransportErrorKind::MissingIdentity,
            other => TransportErrorKind::Decode(other.to_string()),
        }
    }
}

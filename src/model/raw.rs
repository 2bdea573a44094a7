//! Inbound entity shapes and the identifier reconciler.
//!
//! Different parts of the backend answer with either `id` or `_id` as the identity field. A
//! `RawEntity` is whatever JSON object came over the wire; `reconcile` is the only way to turn it
//! into something with a guaranteed canonical `id`, and `decode` is the only way to turn a
//! reconciled object into a typed entity. Nothing downstream of the adapter sees a `RawEntity`.

use crate::model::EntityId;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The canonical identity field.
pub const ID: &str = "id";

/// The alternate identity field used by some backend responses.
pub const ALT_ID: &str = "_id";

/// A JSON object as decoded from the remote store, shape not statically guaranteed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntity(Map<String, Value>);

/// Why a raw value could not be reconciled or decoded.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    #[error("expected a JSON object but found {0}")]
    NotAnObject(&'static str),

    #[error("expected a JSON array but found {0}")]
    NotAnArray(&'static str),

    #[error("neither 'id' nor '_id' holds a usable identity")]
    MissingIdentity,

    #[error("{0}")]
    Decode(String),
}

impl RawEntity {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl TryFrom<Value> for RawEntity {
    type Error = ReconcileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ReconcileError::NotAnObject(type_name(&other))),
        }
    }
}

impl From<RawEntity> for Value {
    fn from(raw: RawEntity) -> Self {
        Value::Object(raw.0)
    }
}

/// Produces a copy of `raw` whose `id` field holds the canonical identity: `id` when it is present
/// and usable, otherwise `_id`. All other fields, including `_id`, are carried over untouched.
/// Applying it to its own output returns the same value.
pub fn reconcile(raw: &RawEntity) -> Result<RawEntity, ReconcileError> {
    let id = identity_of(raw.get(ID))
        .or_else(|| identity_of(raw.get(ALT_ID)))
        .ok_or(ReconcileError::MissingIdentity)?;
    let mut fields = raw.0.clone();
    fields.insert(ID.to_string(), Value::String(id));
    Ok(RawEntity(fields))
}

/// Splits a list response into raw entities and reconciles each one.
pub fn reconcile_all(value: Value) -> Result<Vec<RawEntity>, ReconcileError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(ReconcileError::NotAnArray(type_name(&other))),
    };
    items
        .into_iter()
        .map(|item| RawEntity::try_from(item).and_then(|raw| reconcile(&raw)))
        .collect()
}

/// Decodes a reconciled entity into its typed form.
pub fn decode<T>(reconciled: RawEntity) -> Result<T, ReconcileError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(Value::Object(reconciled.0))
        .map_err(|e| ReconcileError::Decode(e.to_string()))
}

/// Reads a usable identity out of a field value. Strings must be non-empty; numbers are accepted
/// and rendered in decimal.
fn identity_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Convenience for callers that only need the identity.
pub fn canonical_id(raw: &RawEntity) -> Result<EntityId, ReconcileError> {
    let reconciled = reconcile(raw)?;
    match reconciled.get(ID) {
        Some(Value::String(s)) => {
            EntityId::new(s.clone()).map_err(|_| ReconcileError::MissingIdentity)
        }
        _ => Err(ReconcileError::MissingIdentity),
    }
}

//! Error types.
//!
//! Application plumbing (configuration, filesystem, command handlers) uses `anyhow` through the
//! `Error` and `Result` aliases. The synchronized data layer has exactly one typed failure,
//! `TransportError`, which tells the caller that an intended remote operation did not happen.

use crate::model::{Collection, DotSegmentId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The remote operation that was being attempted when a `TransportError` occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

serde_plain::derive_display_from_serialize!(Operation);
serde_plain::derive_fromstr_from_deserialize!(Operation);

/// What went wrong below the adapter boundary.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TransportErrorKind {
    /// The request never produced a response: connection failure, timeout, TLS, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The remote store answered with a non-success status.
    #[error("remote store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected entity shape.
    #[error("unable to decode response: {0}")]
    Decode(String),

    /// A returned entity carried neither a usable `id` nor `_id`.
    #[error("response entity has no identity")]
    MissingIdentity,

    /// The id cannot address a member path. No request was sent.
    #[error(transparent)]
    InvalidId(#[from] DotSegmentId),
}

/// The failure of a single Remote Adapter call. Carries no recovery semantics beyond "the intended
/// operation did not happen remotely".
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransportError {
    operation: Operation,
    collection: Collection,
    kind: TransportErrorKind,
}

impl TransportError {
    pub fn new(operation: Operation, collection: Collection, kind: TransportErrorKind) -> Self {
        Self {
            operation,
            collection,
            kind,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.operation {
            Operation::List => write!(
                f,
                "could not retrieve {} collection: {}",
                self.collection, self.kind
            ),
            Operation::Create => write!(
                f,
                "could not create {}: {}",
                self.collection.singular(),
                self.kind
            ),
            Operation::Update => write!(
                f,
                "could not update {}: {}",
                self.collection.singular(),
                self.kind
            ),
            Operation::Delete => write!(
                f,
                "could not delete {}: {}",
                self.collection.singular(),
                self.kind
            ),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

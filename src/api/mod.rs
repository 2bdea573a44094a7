//! The remote side of the data layer.
//!
//! `Transport` is the raw JSON seam: it knows how to reach the remote store but nothing about
//! entities. `Remote<E>` is the per-entity adapter built on top of it; it owns the resource paths,
//! runs every response through the identifier reconciler and decodes the typed entity.

mod http;
mod memory;
mod remote;

pub use http::HttpTransport;
pub use memory::{Call, MemoryTransport, Method};
pub use remote::Remote;

use crate::error::TransportErrorKind;
use crate::{Config, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The result of a raw `Transport` call.
pub type Res<T> = std::result::Result<T, TransportErrorKind>;

/// The environment variable that switches the program to use the in-memory store.
pub const TEST_MODE_ENV: &str = "FINSYNC_IN_TEST_MODE";

/// Selects which `Transport` implementation backs the adapters.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the configured backend over HTTP.
    #[default]
    Http,
    /// Use a seeded, in-process `MemoryTransport`.
    Test,
}

impl Mode {
    /// `Mode::Test` when `FINSYNC_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(s) if !s.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Raw request/response access to the remote store. Paths are relative to the store's base URL,
/// e.g. `api/transactions/65a1`. A transport does not know which entity operation it serves, so it
/// reports only the `TransportErrorKind`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Res<Value>;

    async fn post(&self, path: &str, body: Value) -> Res<Value>;

    async fn put(&self, path: &str, body: Value) -> Res<Value>;

    async fn delete(&self, path: &str) -> Res<()>;
}

/// Creates the `Transport` selected by `mode`.
pub fn transport(config: &Config, mode: Mode) -> Result<Arc<dyn Transport>> {
    debug!("Creating {mode:?} transport");
    Ok(match mode {
        Mode::Http => Arc::new(HttpTransport::new(
            config.base_url().clone(),
            config.timeout(),
        )?),
        Mode::Test => Arc::new(MemoryTransport::default()),
    })
}

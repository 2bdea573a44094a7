//! Command handlers for the finsync CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler that talks to the
//! remote store opens a `FinanceCache`, mounts it, and then works through it so the CLI sees the
//! same confirmed-only state an embedding application would.

mod add;
mod delete;
mod init;
mod list;
mod update;

use crate::api::{self, Mode, Transport};
use crate::cache::FinanceCache;
use crate::model::{Budget, Entity, Transaction};
use crate::view::{format_amount, format_date, Palette};
use crate::{Config, Result};
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use add::{add_budget, add_transaction};
pub use delete::{delete_budget, delete_transaction};
pub use init::init;
pub use list::{list_budgets, list_transactions};
pub use update::{update_budget, update_transaction};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds a cache over the transport selected by `mode` and performs the initial load.
///
/// # Errors
/// - Returns an error if the transport cannot be created or if the initial load failed.
async fn open(config: &Config, mode: Mode) -> Result<FinanceCache> {
    let transport = api::transport(config, mode)?;
    mounted(config, transport).await
}

async fn mounted(config: &Config, transport: Arc<dyn Transport>) -> Result<FinanceCache> {
    let cache = FinanceCache::with_transport(transport);
    cache.mount().await;
    if let Some(e) = cache.error() {
        bail!("{e} from {}", config.base_url())
    }
    Ok(cache)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{count} {}", if count == 1 { singular } else { plural })
}

/// One display line for a transaction, e.g. `Jan 05,2025  -$87.43  Food & Dining (#FF6B6B)`.
fn transaction_line(palette: &Palette, t: &Transaction) -> String {
    format!(
        "{}  {}  {}  {} ({})  [{}]",
        format_date(t.date()),
        format_amount(t.amount(), t.kind()),
        t.description(),
        t.category(),
        palette.color_for(t.category()),
        t.id()
    )
}

fn budget_line(palette: &Palette, b: &Budget) -> String {
    format!(
        "{}  {} ({})  ${}  [{}]",
        b.month(),
        b.category(),
        palette.color_for(b.category()),
        b.amount().round_dp(2),
        b.id()
    )
}

//! Delete command handlers.

use crate::api::Mode;
use crate::commands::{open, Out};
use crate::model::EntityId;
use crate::{Config, Result};

/// Deletes one transaction by id. Returns the id that was deleted.
pub async fn delete_transaction(config: &Config, mode: Mode, id: &EntityId) -> Result<Out<String>> {
    let cache = open(config, mode).await?;
    cache.delete_transaction(id).await?;
    Ok(Out::new(
        format!(
            "Deleted transaction {id}, {} remaining",
            cache.transactions().len()
        ),
        id.to_string(),
    ))
}

/// Deletes one budget by id. Returns the id that was deleted.
pub async fn delete_budget(config: &Config, mode: Mode, id: &EntityId) -> Result<Out<String>> {
    let cache = open(config, mode).await?;
    cache.delete_budget(id).await?;
    Ok(Out::new(
        format!("Deleted budget {id}, {} remaining", cache.budgets().len()),
        id.to_string(),
    ))
}

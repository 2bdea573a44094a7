use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, if needed, and an initial `config.json`.
///
/// # Arguments
/// - `finsync_home` - The directory that will be the root of data directory, e.g. `$HOME/finsync`
/// - `base_url` - The root URL of the remote finance store, e.g. `http://localhost:5000`
/// - `timeout_secs` - The per-request timeout. Defaults to 30 seconds when `None`.
///
/// # Errors
/// - Returns an error if the URL is invalid, a config already exists, or any file operation fails.
pub async fn init(
    finsync_home: &Path,
    base_url: &str,
    timeout_secs: Option<u64>,
) -> Result<Out<()>> {
    let config = Config::create(finsync_home, base_url, timeout_secs)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the finsync config at {}",
        config.config_path().display()
    )
    .into())
}

use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Deserialize a JSON file into type `T`.
pub(crate) async fn deserialize<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Create a directory and any missing parents. Succeeds if it already exists.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

/// Resolve `path` to an absolute path. The path must exist.
pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize {}", path.display()))
}

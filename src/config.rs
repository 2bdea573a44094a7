//! Configuration file handling for finsync.
//!
//! The configuration file is stored at `$FINSYNC_HOME/config.json` and holds the location of the
//! remote finance store along with the per-request timeout.

use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "finsync";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINSYNC_HOME` and from there it loads `$FINSYNC_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    base_url: Url,
}

impl Config {
    /// Creates the data directory, if needed, and writes an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/finsync`
    /// - `base_url` - The root URL of the remote store, e.g. `http://localhost:5000`. Resource
    ///   paths such as `api/transactions` are resolved against it.
    /// - `timeout_secs` - The per-request timeout. `None` leaves it out of the file and the default
    ///   of 30 seconds applies.
    ///
    /// # Errors
    /// - Returns an error if `base_url` is not a valid URL, if a config file already exists, or if
    ///   any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        base_url: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        if let Some(t) = timeout_secs {
            ensure!(t > 0, "The timeout must be at least one second");
        }

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finsync home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile {
            base_url: base_url.to_string(),
            timeout_secs,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    /// This will
    /// - validate that `finsync_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(finsync_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finsync_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Finsync Home is missing, run 'finsync init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let base_url = parse_base_url(&config_file.base_url)
            .with_context(|| format!("Invalid base_url in '{}'", config_path.display()))?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout for the HTTP transport.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.config_file
                .timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }
}

fn parse_base_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Unable to parse '{s}' as a URL"))?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        "The base URL must use http or https, got '{}'",
        url.scheme()
    );
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finsync",
///   "config_version": 1,
///   "base_url": "http://localhost:5000",
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finsync"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Root URL of the remote store
    base_url: String,

    /// Per-request timeout in seconds. Defaults to 30 if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_url: String::new(),
            timeout_secs: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("finsync_home");

        let config = Config::create(&home_dir, "http://localhost:5000", None)
            .await
            .unwrap();

        assert_eq!(config.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.config_path().is_file());
        let written = utils::read(config.config_path()).await.unwrap();
        assert!(written.contains("\"app_name\": \"finsync\""));
        assert!(!written.contains("timeout_secs"));
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), "https://finance.example.com/v1", Some(5))
            .await
            .unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(loaded.base_url().as_str(), "https://finance.example.com/v1");
        assert_eq!(loaded.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_config_create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), "http://localhost:5000", None)
            .await
            .unwrap();
        let e = Config::create(dir.path(), "http://other:5000", None)
            .await
            .unwrap_err();
        assert!(e.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path(), "not a url", None).await.is_err());
        assert!(Config::create(dir.path(), "ftp://host/x", None).await.is_err());
        assert!(Config::create(dir.path(), "http://host", Some(0)).await.is_err());
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let e = Config::load(dir.path()).await.unwrap_err();
        assert!(e.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "finsync",
            "config_version": 1,
            "base_url": "http://127.0.0.1:8080"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.base_url().port(), Some(8080));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "base_url": "http://localhost"
        }"#;
        utils::write(&path, json).await.unwrap();
        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_load_invalid_base_url() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "finsync",
            "config_version": 1,
            "base_url": "::::"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json)
            .await
            .unwrap();
        let e = Config::load(dir.path()).await.unwrap_err();
        assert!(e.to_string().contains("Invalid base_url"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        let original = ConfigFile {
            base_url: "http://localhost:5000/".to_string(),
            timeout_secs: Some(12),
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        let read = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, read);
    }
}

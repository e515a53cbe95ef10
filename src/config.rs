//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json` and holds the settings of the
//! application, currently just the optional URL of the remote collection to sync to.

use crate::db::Db;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "expense";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPENSE_SQLITE: &str = "expense.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json` and opens the
/// database. The database handle lives as long as the `Config` and is shared by its clones.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory and:
    /// - Creates an initial `config.json` file, with `sync_url` if one is given
    /// - Creates and initializes the SQLite database
    ///
    /// # Errors
    /// - Returns an error if `sync_url` is not an http or https URL.
    /// - Returns an error if any file operations fail, or if a config file or database already
    ///   exists. Nothing is written in that case.
    pub async fn create(dir: impl Into<PathBuf>, sync_url: Option<&str>) -> Result<Self> {
        let sync_url = sync_url
            .map(|url| parse_sync_url(url).map(String::from))
            .transpose()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expense home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        let sqlite_path = root.join(EXPENSE_SQLITE);
        for existing in [&config_path, &sqlite_path] {
            if existing.exists() {
                bail!(
                    "'{}' already exists, the expense home is already initialized",
                    existing.display()
                );
            }
        }

        // The config file is written last so a failed database setup leaves no config behind
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;
        let config_file = ConfigFile {
            sync_url,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `expense_home` exists and that the config file exists
    /// - load the config file
    /// - open the database, running any pending migrations
    pub async fn load(expense_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expense_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expense home directory is missing, run 'expense init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(EXPENSE_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// The URL of the remote collection, if one was configured.
    pub fn sync_url(&self) -> Option<&str> {
        self.config_file.sync_url.as_deref()
    }

    /// Closes the database. Call this once, at the end of the process.
    pub async fn close(&self) {
        self.db.close().await
    }
}

/// Parses and validates the URL of a remote collection. Only http and https are accepted.
pub(crate) fn parse_sync_url(s: &str) -> Result<Url> {
    let url = Url::parse(s.trim()).with_context(|| format!("Invalid sync URL '{s}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("The sync URL must use http or https, got '{other}'"),
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense",
///   "config_version": 1,
///   "sync_url": "https://example.mockapi.io/api/v1/transactions"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the REST collection that `sync` pushes to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_url: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sync_url: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is for a different app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

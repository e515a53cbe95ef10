use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` file, storing `sync_url` if one is given
/// - Creates the SQLite database with the current schema
///
/// # Arguments
/// - `expense_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expense`
/// - `sync_url` - The URL of the REST collection used by `expense sync`, e.g.
///   `https://example.mockapi.io/api/v1/transactions`. It can also be given later with
///   `expense sync --url`.
///
/// # Errors
/// - Returns an error if `sync_url` is not an http or https URL.
/// - Returns an error if any file operations fail or the expense home is already initialized.
pub async fn init(expense_home: &Path, sync_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(expense_home, sync_url)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let message = format!(
        "Successfully created the expense directory at {}",
        config.root().display()
    );
    config.close().await;
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expense");
        let out = init(&home, None).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("expense.sqlite").is_file());

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.db().count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_twice_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), None).await.unwrap();
        let err = init(dir.path(), None).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}

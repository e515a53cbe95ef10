//! Pushes the active transactions to the remote collection.
//!
//! A sync is a full replacement: every item the remote holds is deleted, then every active
//! transaction is posted. The steps are not atomic. If one fails the sync stops where it is and
//! whatever was already deleted or posted stays that way.

use crate::api::{self, Mode, Remote, RemotePayload};
use crate::commands::{plural, Out};
use crate::config::parse_sync_url;
use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::model::TypeFilter;
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What a successful sync did.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of remote items deleted.
    pub deleted: usize,
    /// Number of local transactions posted.
    pub posted: usize,
}

/// Replaces the contents of the remote collection with the active transactions.
///
/// `url` takes precedence over the `sync_url` in `config.json`. In `Mode::Testing` an in-memory
/// collection is used and no requests are made.
///
/// # Errors
///
/// - A config error if no URL is given or configured, or the URL is not http or https.
/// - A sync error, with the message "Sync failed", if any step fails.
pub async fn sync(config: Config, url: Option<&str>, mode: Mode) -> Result<Out<SyncReport>> {
    let url = url
        .or(config.sync_url())
        .ok_or_else(|| {
            anyhow!("No sync URL, pass --url or run 'expense init --sync-url' to configure one")
        })
        .and_then(parse_sync_url)
        .pub_result(ErrorType::Config)?;

    info!("Syncing to {url}");
    let mut remote = api::remote(url, mode);
    let report = run_sync(config.db(), remote.as_mut())
        .await
        .context("Sync failed")
        .pub_result(ErrorType::Sync)?;

    let message = format!(
        "Sync complete: deleted {}, posted {}",
        plural(report.deleted, "remote item"),
        plural(report.posted, "transaction"),
    );
    Ok(Out::new(message, report))
}

/// The steps of a sync, in order. Each remote call is awaited before the next is made.
pub(crate) async fn run_sync(db: &Db, remote: &mut (dyn Remote + Send)) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    let existing = remote
        .list()
        .await
        .context("Unable to list the remote collection")?;
    debug!("The remote collection has {} items", existing.len());

    for item in &existing {
        remote
            .delete(&item.id)
            .await
            .with_context(|| format!("Unable to delete remote item {}", item.id))?;
        report.deleted += 1;
    }

    let active = db
        .list_active(None, TypeFilter::All)
        .await
        .context("Unable to read the active transactions")?;
    debug!("Posting {} active transactions", active.len());

    for transaction in &active {
        remote
            .create(&RemotePayload::from(transaction))
            .await
            .with_context(|| format!("Unable to post transaction {}", transaction.id()))?;
        report.posted += 1;
    }

    Ok(report)
}

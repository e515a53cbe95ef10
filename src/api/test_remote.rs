//! Implements the `Remote` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a REST endpoint.

use crate::api::{Remote, RemoteId, RemoteItem, RemotePayload};
use crate::model::TransactionType;
use crate::Result;
use anyhow::{bail, Context};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Which call, if any, should fail.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub(crate) enum FailOn {
    #[default]
    Never,
    List,
    /// Fail the nth (zero-based) delete.
    Delete(usize),
    /// Fail the nth (zero-based) create.
    Create(usize),
}

/// The contents of the in-memory collection and the call counters.
#[derive(Debug, Default, Clone)]
pub(crate) struct TestRemoteState {
    pub(crate) items: Vec<(RemoteId, RemotePayload)>,
    pub(crate) fail_on: FailOn,
    pub(crate) deletes: usize,
    pub(crate) creates: usize,
}

/// An implementation of the `Remote` trait that keeps the collection in memory. Clones share the
/// same state so a test can hand one to `sync` and inspect the other.
#[derive(Debug, Clone)]
pub(crate) struct TestRemote {
    state: Arc<Mutex<TestRemoteState>>,
}

impl TestRemote {
    pub(crate) fn new(items: Vec<RemotePayload>) -> Self {
        let items = items.into_iter().map(|p| (new_id(), p)).collect();
        Self {
            state: Arc::new(Mutex::new(TestRemoteState {
                items,
                ..Default::default()
            })),
        }
    }

    #[cfg(test)]
    pub(crate) fn fail_on(&self, fail_on: FailOn) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_on = fail_on;
        }
    }

    /// A copy of the current state.
    #[cfg(test)]
    pub(crate) fn state(&self) -> TestRemoteState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The payloads currently in the collection, in insertion order.
    #[cfg(test)]
    pub(crate) fn payloads(&self) -> Vec<RemotePayload> {
        self.state().items.into_iter().map(|(_, p)| p).collect()
    }
}

impl Default for TestRemote {
    /// Seeded with two items that a sync is expected to replace.
    fn default() -> Self {
        Self::new(default_data())
    }
}

#[async_trait::async_trait]
impl Remote for TestRemote {
    async fn list(&mut self) -> Result<Vec<RemoteItem>> {
        let state = self.lock()?;
        if state.fail_on == FailOn::List {
            bail!("Simulated failure listing the remote collection");
        }
        Ok(state
            .items
            .iter()
            .map(|(id, _)| RemoteItem { id: id.clone() })
            .collect())
    }

    async fn delete(&mut self, id: &RemoteId) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_on == FailOn::Delete(state.deletes) {
            bail!("Simulated failure deleting remote item {id}");
        }
        state.deletes += 1;
        let before = state.items.len();
        state.items.retain(|(item_id, _)| item_id != id);
        if state.items.len() == before {
            bail!("Remote item {id} not found");
        }
        Ok(())
    }

    async fn create(&mut self, payload: &RemotePayload) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_on == FailOn::Create(state.creates) {
            bail!("Simulated failure creating remote item '{}'", payload.title);
        }
        state.creates += 1;
        state.items.push((new_id(), payload.clone()));
        Ok(())
    }
}

impl TestRemote {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, TestRemoteState>> {
        self.state
            .lock()
            .ok()
            .context("The test remote state lock is poisoned")
    }
}

fn new_id() -> RemoteId {
    RemoteId::new(Uuid::new_v4().to_string())
}

/// Seed data, as if an earlier device had already synced.
fn default_data() -> Vec<RemotePayload> {
    vec![
        RemotePayload {
            title: "Tiền nhà".to_string(),
            amount: 3_500_000.0,
            transaction_type: TransactionType::Expense,
            created_at: "2025-09-01 08:00:00".to_string(),
        },
        RemotePayload {
            title: "Lương tháng 9".to_string(),
            amount: 10_000_000.0,
            transaction_type: TransactionType::Income,
            created_at: "2025-09-30 17:00:00".to_string(),
        },
    ]
}

//! Talks to the remote REST collection that local transactions are pushed to.
//!
//! The collection is addressed by a single base URL and is expected to support `GET /` (list),
//! `DELETE /{id}` and `POST /` with a JSON body. There is no authentication and no pagination.

mod http_remote;
mod test_remote;

use crate::model::{Transaction, TransactionType};
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

pub(crate) use http_remote::HttpRemote;
pub(crate) use test_remote::TestRemote;
#[cfg(test)]
pub(crate) use test_remote::FailOn;

/// When this environment variable is set and non-empty, `sync` uses an in-memory collection
/// instead of making HTTP requests.
pub const TEST_MODE_ENV: &str = "EXPENSE_SYNC_IN_TEST_MODE";

/// Whether to use a real HTTP endpoint or an in-memory stand-in.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` if `EXPENSE_SYNC_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Http,
        }
    }
}

/// The id the remote assigned to an item. Some services use numbers, others strings; both are
/// kept as text.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub(crate) struct RemoteId(String);

impl RemoteId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Ok(RemoteId(s)),
            Raw::Number(n) => Ok(RemoteId(n.to_string())),
        }
    }
}

/// An item of the remote collection. Only the id matters to us; other fields are ignored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct RemoteItem {
    pub(crate) id: RemoteId,
}

/// The body POSTed for each local transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RemotePayload {
    pub(crate) title: String,
    pub(crate) amount: f64,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    #[serde(rename = "createdAt")]
    pub(crate) created_at: String,
}

impl From<&Transaction> for RemotePayload {
    fn from(t: &Transaction) -> Self {
        Self {
            title: t.title().to_string(),
            amount: t.amount().value(),
            transaction_type: t.transaction_type(),
            created_at: t.created_at().to_string(),
        }
    }
}

/// The operations `sync` needs from a remote collection.
#[async_trait::async_trait]
pub(crate) trait Remote {
    /// Fetches every item in the collection.
    async fn list(&mut self) -> Result<Vec<RemoteItem>>;

    /// Deletes one item by id.
    async fn delete(&mut self, id: &RemoteId) -> Result<()>;

    /// Adds an item to the collection.
    async fn create(&mut self, payload: &RemotePayload) -> Result<()>;
}

/// Creates the `Remote` for `url`. In `Mode::Testing` no network requests are made.
pub(crate) fn remote(url: Url, mode: Mode) -> Box<dyn Remote + Send> {
    match mode {
        Mode::Http => Box::new(HttpRemote::new(url)),
        Mode::Testing => Box::new(TestRemote::default()),
    }
}

//! Command handlers for the expense CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod query;
mod stats;
mod sync;
mod update;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::{delete_transaction, purge_transaction, restore_transaction};
pub use init::init;
pub use insert::insert_transaction;
pub use query::{list_transactions, list_trash, show_transaction};
pub use stats::{statistics, Statistics};
pub use sync::{sync, SyncReport};
pub use update::update_transaction;

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

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
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

/// `"1 transaction"`, `"2 transactions"`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_from_str() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "transaction"), "0 transactions");
        assert_eq!(plural(1, "transaction"), "1 transaction");
        assert_eq!(plural(2, "item"), "2 items");
    }
}

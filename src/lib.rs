//! expense-sync: a personal income and expense tracker backed by SQLite.
//!
//! Transactions are recorded, searched, edited, moved to a trash, restored and purged through the
//! `commands` module. Monthly statistics are computed from the active transactions, and
//! `commands::sync` pushes them to a REST collection.

pub mod args;
pub mod commands;

mod api;
mod config;
mod db;
mod error;
mod model;
mod stats;
mod utils;


pub use api::{Mode, TEST_MODE_ENV};
pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
pub use model::{Amount, NewTransaction, Transaction, TransactionEdit, TransactionType, TypeFilter};
pub use stats::{MonthlyTotal, Summary, MONTHS};

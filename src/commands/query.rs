//! Read-only commands: listing active transactions, listing the trash and showing one transaction.

use crate::args::{IdArgs, ListArgs};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};

/// Lists active transactions, newest first, optionally narrowed by a search string and a type.
///
/// A blank or missing search string matches everything. The search is a case-insensitive substring
/// match against both the title and the type column.
pub async fn list_transactions(config: Config, args: ListArgs) -> Result<Out<Vec<Transaction>>> {
    let db = config.db();
    let transactions = db
        .list_active(args.search(), args.kind())
        .await
        .pub_result(ErrorType::Database)?;
    let trashed = db.count_trashed().await.pub_result(ErrorType::Database)?;

    let mut message = listing(&transactions, "No transactions found");
    if trashed > 0 {
        message.push_str(&format!("\n{trashed} in the trash"));
    }
    Ok(Out::new(message, transactions))
}

/// Lists the transactions in the trash, most recently created first.
pub async fn list_trash(config: Config) -> Result<Out<Vec<Transaction>>> {
    let transactions = config
        .db()
        .list_trashed()
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(&transactions, "The trash is empty");
    Ok(Out::new(message, transactions))
}

/// Shows one transaction whether or not it is in the trash. An unknown id is reported in the
/// message and is not an error.
pub async fn show_transaction(config: Config, args: IdArgs) -> Result<Out<Option<Transaction>>> {
    let id = args.id();
    let found = config
        .db()
        .get(id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = match &found {
        None => format!("Transaction {id} not found"),
        Some(t) if t.is_deleted() => format!("{t}  (in trash)"),
        Some(t) => t.to_string(),
    };
    Ok(Out::new(message, found))
}

fn listing(transactions: &[Transaction], empty: &str) -> String {
    if transactions.is_empty() {
        return empty.to_string();
    }
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(plural(transactions.len(), "transaction"));
    lines.extend(transactions.iter().map(|t| t.to_string()));
    lines.join("\n")
}

//! Update command handler.

use crate::args::EditArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Transaction, TransactionEdit};
use crate::{Config, Result};

/// Overwrites the title and amount of a transaction. The type, `createdAt` and trash state are
/// left alone.
///
/// The new values are validated the same way as `add`. An id that does not exist is not an error:
/// nothing is changed and the message says so.
///
/// # Returns
///
/// The transaction as stored after the change, or `None` when `id` does not exist.
pub async fn update_transaction(
    config: Config,
    args: EditArgs,
) -> Result<Out<Option<Transaction>>> {
    let id = args.id();
    let edit =
        TransactionEdit::parse(args.title(), args.amount()).pub_result(ErrorType::Validation)?;

    let db = config.db();
    let changed = db.update(id, &edit).await.pub_result(ErrorType::Database)?;
    if changed == 0 {
        return Ok(Out::new(format!("Transaction {id} not found"), None));
    }

    let updated = db.get(id).await.pub_result(ErrorType::Database)?;
    let message = match &updated {
        Some(t) => format!("Updated {t}"),
        None => format!("Transaction {id} not found"),
    };
    Ok(Out::new(message, updated))
}

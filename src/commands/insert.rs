//! Insert command handler.

use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{NewTransaction, Transaction};
use crate::{Config, Result};

/// Inserts a new active transaction into the local SQLite database.
///
/// The title and amount are validated before anything is written: a blank title or an amount that
/// is not a non-negative number is rejected with `ErrorType::Validation` and the database is left
/// unchanged. The `id` and `createdAt` are assigned by the database.
///
/// # Returns
///
/// On success, returns an `Out` containing the transaction as stored.
///
/// # Errors
///
/// - Returns a validation error for bad input.
/// - Returns an error if the database operation fails.
pub async fn insert_transaction(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let new = NewTransaction::parse(args.title(), args.amount(), args.kind())
        .pub_result(ErrorType::Validation)?;

    let transaction = config
        .db()
        .insert(&new)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!("Added {transaction}");
    Ok(Out::new(message, transaction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{TransactionType, TypeFilter};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_insert_transaction() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("Lương", "10,000,000", TransactionType::Income);

        let out = insert_transaction(env.config(), args).await.unwrap();

        let stored = out.structure().unwrap();
        assert_eq!(stored.title(), "Lương");
        assert_eq!(stored.amount().value(), 10_000_000.0);
        assert_eq!(stored.transaction_type(), TransactionType::Income);
        assert!(!stored.is_deleted());
        assert!(out.message().contains("+ 10,000,000 ₫"), "{}", out.message());

        let found = env.db().get(stored.id()).await.unwrap().unwrap();
        assert_eq!(&found, stored);
    }

    #[tokio::test]
    async fn test_insert_blank_title_writes_nothing() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("   ", "50000", TransactionType::Expense);

        let err = insert_transaction(env.config(), args).await.unwrap_err();

        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert!(format!("{err:#}").contains("Missing data"));
        let all = env.db().list_active(None, TypeFilter::All).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_insert_non_numeric_amount_writes_nothing() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("Cà phê", "abc", TransactionType::Expense);

        let err = insert_transaction(env.config(), args).await.unwrap_err();

        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert_eq!(env.db().count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_negative_amount_is_rejected() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("Cà phê", "-5", TransactionType::Expense);
        let err = insert_transaction(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }
}

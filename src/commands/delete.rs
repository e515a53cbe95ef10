//! Trash command handlers: soft delete, restore and purge.
//!
//! None of these treat an unknown id as an error. The returned count says how many rows changed,
//! which is 0 or 1.

use crate::args::IdArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Moves a transaction to the trash. It stays reachable by id and can be restored.
pub async fn delete_transaction(config: Config, args: IdArgs) -> Result<Out<u64>> {
    let id = args.id();
    let changed = config
        .db()
        .soft_delete(id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(outcome(changed, id, format!("Moved transaction {id} to the trash")), changed))
}

/// Takes a transaction out of the trash.
pub async fn restore_transaction(config: Config, args: IdArgs) -> Result<Out<u64>> {
    let id = args.id();
    let changed = config
        .db()
        .restore(id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(outcome(changed, id, format!("Restored transaction {id}")), changed))
}

/// Permanently removes a transaction, whether it is active or in the trash.
pub async fn purge_transaction(config: Config, args: IdArgs) -> Result<Out<u64>> {
    let id = args.id();
    let changed = config
        .db()
        .purge(id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(outcome(changed, id, format!("Permanently deleted transaction {id}")), changed))
}

fn outcome(changed: u64, id: i64, done: String) -> String {
    if changed == 0 {
        format!("Transaction {id} not found")
    } else {
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TransactionType, TypeFilter};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete_then_restore() {
        let env = TestEnv::new().await;
        let coffee = env.insert("Cà phê", 50_000.0, TransactionType::Expense).await;

        let out = delete_transaction(env.config(), IdArgs::new(coffee.id()))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&1));
        assert!(out.message().contains("trash"));
        assert!(env
            .db()
            .list_active(None, TypeFilter::All)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(env.db().list_trashed().await.unwrap().len(), 1);

        let out = restore_transaction(env.config(), IdArgs::new(coffee.id()))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&1));
        assert_eq!(
            out.message(),
            format!("Restored transaction {}", coffee.id())
        );
        let active = env.db().list_active(None, TypeFilter::All).await.unwrap();
        assert_eq!(active, vec![coffee]);
    }

    #[tokio::test]
    async fn test_purge() {
        let env = TestEnv::new().await;
        let active = env.insert("A", 1.0, TransactionType::Income).await;
        let trashed = env.insert("B", 1.0, TransactionType::Expense).await;
        env.db().soft_delete(trashed.id()).await.unwrap();

        for id in [active.id(), trashed.id()] {
            let out = purge_transaction(env.config(), IdArgs::new(id))
                .await
                .unwrap();
            assert_eq!(out.structure(), Some(&1));
            assert!(env.db().get(id).await.unwrap().is_none());
        }
        assert_eq!(env.db().count_active().await.unwrap(), 0);
        assert_eq!(env.db().count_trashed().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_noop() {
        let env = TestEnv::new().await;
        env.insert("A", 1.0, TransactionType::Income).await;

        let out = delete_transaction(env.config(), IdArgs::new(999))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&0));
        assert_eq!(out.message(), "Transaction 999 not found");

        let out = restore_transaction(env.config(), IdArgs::new(999))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&0));

        let out = purge_transaction(env.config(), IdArgs::new(999))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&0));
        assert_eq!(env.db().count_active().await.unwrap(), 1);
    }
}

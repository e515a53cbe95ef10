//! This module is responsible for reading, writing and managing the SQLite database.

mod migrations;
mod query;

use crate::model::{
    Amount, NewTransaction, Transaction, TransactionEdit, TransactionType, TypeFilter,
};
use crate::stats::MonthSum;
use crate::Result;
use anyhow::{bail, Context};
use query::{ListQuery, COLUMNS};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const MONTHLY_SUMS: &str = "SELECT strftime('%m', createdAt) AS month, type, \
     TOTAL(amount) AS total FROM transactions \
     WHERE deleted = 0 AND strftime('%m', createdAt) IS NOT NULL \
     GROUP BY month, type ORDER BY month ASC";

const MONTHLY_SUMS_FOR_YEAR: &str = "SELECT strftime('%m', createdAt) AS month, type, \
     TOTAL(amount) AS total FROM transactions \
     WHERE deleted = 0 AND strftime('%m', createdAt) IS NOT NULL \
     AND strftime('%Y', createdAt) = ? \
     GROUP BY month, type ORDER BY month ASC";

/// The handle to the SQLite database. It is opened once, when the `Config` is loaded, and shared
/// by every operation. Cloning is cheap and clones share the same connection.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        Self::migrate(pool).await
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        let current = migrations::bootstrap(&pool).await?;
        migrations::run(&pool, current, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// Closes the underlying connection. Further use of this `Db` or its clones will fail.
    pub(crate) async fn close(&self) {
        self.pool.close().await
    }

    /// Active transactions, newest first. `search` matches title or type, case-insensitively.
    pub(crate) async fn list_active(
        &self,
        search: Option<&str>,
        type_filter: TypeFilter,
    ) -> Result<Vec<Transaction>> {
        self.list(ListQuery::active(search, type_filter)).await
    }

    /// Transactions in the trash, most recently created first.
    pub(crate) async fn list_trashed(&self) -> Result<Vec<Transaction>> {
        self.list(ListQuery::trashed()).await
    }

    async fn list(&self, list_query: ListQuery) -> Result<Vec<Transaction>> {
        let sql = list_query.sql();
        debug!("Listing transactions: {sql}");
        let mut query = sqlx::query(&sql);
        for value in list_query.binds() {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;
        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            let transaction = transaction_from_row(row)?;
            if list_query.matches(&transaction) {
                transactions.push(transaction);
            }
        }
        Ok(transactions)
    }

    /// Gets a transaction whether it is active or in the trash.
    pub(crate) async fn get(&self, id: i64) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {COLUMNS} FROM transactions WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to get transaction {id}"))?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    /// Inserts an active transaction and returns it as stored, with its `id` and `createdAt`.
    pub(crate) async fn insert(&self, transaction: &NewTransaction) -> Result<Transaction> {
        let result = sqlx::query("INSERT INTO transactions (title, amount, type) VALUES (?, ?, ?)")
            .bind(&transaction.title)
            .bind(transaction.amount.value())
            .bind(transaction.transaction_type.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to insert transaction")?;
        let id = result.last_insert_rowid();
        debug!("Inserted transaction {id}");
        self.get(id)
            .await?
            .with_context(|| format!("Transaction {id} is missing right after being inserted"))
    }

    /// Overwrites title and amount. Returns the number of rows changed, 0 if `id` does not exist.
    pub(crate) async fn update(&self, id: i64, edit: &TransactionEdit) -> Result<u64> {
        let result = sqlx::query("UPDATE transactions SET title = ?, amount = ? WHERE id = ?")
            .bind(&edit.title)
            .bind(edit.amount.value())
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update transaction {id}"))?;
        Ok(result.rows_affected())
    }

    /// Moves a transaction to the trash.
    pub(crate) async fn soft_delete(&self, id: i64) -> Result<u64> {
        self.set_deleted(id, true).await
    }

    /// Takes a transaction out of the trash.
    pub(crate) async fn restore(&self, id: i64) -> Result<u64> {
        self.set_deleted(id, false).await
    }

    async fn set_deleted(&self, id: i64, deleted: bool) -> Result<u64> {
        let result = sqlx::query("UPDATE transactions SET deleted = ? WHERE id = ?")
            .bind(i64::from(deleted))
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to set deleted={deleted} on transaction {id}"))?;
        Ok(result.rows_affected())
    }

    /// Removes the row permanently.
    pub(crate) async fn purge(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to purge transaction {id}"))?;
        Ok(result.rows_affected())
    }

    pub(crate) async fn count_active(&self) -> Result<u64> {
        self.count(false).await
    }

    pub(crate) async fn count_trashed(&self) -> Result<u64> {
        self.count(true).await
    }

    async fn count(&self, deleted: bool) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE deleted = ?")
            .bind(i64::from(deleted))
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;
        Ok(u64::try_from(row.0).unwrap_or_default())
    }

    /// Sums of active amounts grouped by the month of `createdAt` and by type. Rows whose
    /// `createdAt` has no month are left out. With `year`, only that year's rows are summed.
    pub(crate) async fn monthly_sums(&self, year: Option<i32>) -> Result<Vec<MonthSum>> {
        let query = match year {
            Some(year) => sqlx::query(MONTHLY_SUMS_FOR_YEAR).bind(format!("{year:04}")),
            None => sqlx::query(MONTHLY_SUMS),
        };
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to compute monthly sums")?;

        let mut sums = Vec::with_capacity(rows.len());
        for row in &rows {
            let month: String = row.try_get("month")?;
            let type_text: String = row.try_get("type")?;
            let total: f64 = row.try_get("total")?;
            sums.push(MonthSum {
                month,
                transaction_type: parse_type(&type_text)?,
                total,
            });
        }
        Ok(sums)
    }

    /// Sums of active amounts by type.
    pub(crate) async fn totals_by_type(&self) -> Result<Vec<(TransactionType, f64)>> {
        let rows = sqlx::query(
            "SELECT type, TOTAL(amount) AS total FROM transactions WHERE deleted = 0 GROUP BY type",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute totals")?;

        let mut totals = Vec::with_capacity(rows.len());
        for row in &rows {
            let type_text: String = row.try_get("type")?;
            let total: f64 = row.try_get("total")?;
            totals.push((parse_type(&type_text)?, total));
        }
        Ok(totals)
    }

    /// Overwrites `createdAt`, which no user-facing operation can do. Used to place test data in
    /// a particular month.
    #[cfg(test)]
    pub(crate) async fn _set_created_at(&self, id: i64, created_at: &str) -> Result<()> {
        sqlx::query("UPDATE transactions SET createdAt = ? WHERE id = ?")
            .bind(created_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to set createdAt")?;
        Ok(())
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);

    // A single connection: SQLite has one writer and every operation here runs in sequence.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open the SQLite database at {}", path.display()))
}

fn parse_type(s: &str) -> Result<TransactionType> {
    TransactionType::from_str(s).with_context(|| format!("Unknown transaction type '{s}'"))
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let type_text: String = row.try_get("type")?;
    let created_at: Option<String> = row.try_get("createdAt")?;
    let deleted: Option<i64> = row.try_get("deleted")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        amount: Amount::from_stored(row.try_get("amount")?),
        transaction_type: parse_type(&type_text)?,
        created_at: created_at.unwrap_or_default(),
        deleted: deleted.unwrap_or_default() != 0,
    })
}

//! Builds the `SELECT` statements used to list transactions.
//!
//! The statement is assembled only from the fixed clauses below. The type filter is passed as a
//! bound parameter, never spliced into the SQL. Search text is matched against the fetched rows
//! by `matches`. SQLite's `LIKE` only folds ASCII case, so it would miss `Điện` for `điện`.

use crate::model::{Transaction, TransactionType, TypeFilter};

pub(super) const COLUMNS: &str = "id, title, amount, type, createdAt, deleted";

const SELECT: &str = "SELECT id, title, amount, type, createdAt, deleted FROM transactions";
const ACTIVE: &str = " WHERE deleted = 0";
const TRASHED: &str = " WHERE deleted = 1";
const TYPE: &str = " AND type = ?";
const NEWEST_ID_FIRST: &str = " ORDER BY id DESC";
const NEWEST_CREATED_FIRST: &str = " ORDER BY createdAt DESC, id DESC";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
    Active,
    Trashed,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Order {
    NewestIdFirst,
    NewestCreatedFirst,
}

/// A listing query over the `transactions` table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ListQuery {
    state: State,
    /// Lowercased search text.
    search: Option<String>,
    transaction_type: Option<TransactionType>,
    order: Order,
}

impl ListQuery {
    /// Active transactions, newest id first. Search text that is empty or only whitespace is
    /// ignored. Otherwise it is used as given, surrounding spaces included.
    pub(crate) fn active(search: Option<&str>, type_filter: TypeFilter) -> Self {
        let search = search
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase);
        Self {
            state: State::Active,
            search,
            transaction_type: type_filter.transaction_type(),
            order: Order::NewestIdFirst,
        }
    }

    /// Trashed transactions, most recently created first.
    pub(crate) fn trashed() -> Self {
        Self {
            state: State::Trashed,
            search: None,
            transaction_type: None,
            order: Order::NewestCreatedFirst,
        }
    }

    pub(crate) fn sql(&self) -> String {
        let mut sql = String::from(SELECT);
        sql.push_str(match self.state {
            State::Active => ACTIVE,
            State::Trashed => TRASHED,
        });
        if self.transaction_type.is_some() {
            sql.push_str(TYPE);
        }
        sql.push_str(match self.order {
            Order::NewestIdFirst => NEWEST_ID_FIRST,
            Order::NewestCreatedFirst => NEWEST_CREATED_FIRST,
        });
        sql
    }

    /// The values to bind, in the order their placeholders appear in `sql`.
    pub(crate) fn binds(&self) -> Vec<String> {
        self.transaction_type
            .map(|t| vec![t.as_str().to_string()])
            .unwrap_or_default()
    }

    /// True when `transaction` passes the search filter: its title or type contains the search
    /// text, ignoring case. Always true when there is no search text.
    pub(crate) fn matches(&self, transaction: &Transaction) -> bool {
        let Some(search) = &self.search else {
            return true;
        };
        transaction.title().to_lowercase().contains(search.as_str())
            || transaction
                .transaction_type()
                .as_str()
                .to_lowercase()
                .contains(search.as_str())
    }
}

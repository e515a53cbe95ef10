use crate::model::Amount;
use crate::Result;
use anyhow::bail;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The format SQLite's `datetime('now','localtime')` produces for `createdAt`.
pub(crate) const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a transaction is money coming in or going out. Stored as `Thu` and `Chi`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "Thu", alias = "thu", alias = "income")]
    Income,
    #[serde(rename = "Chi", alias = "chi", alias = "expense")]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The value written to the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Thu",
            TransactionType::Expense => "Chi",
        }
    }
}

/// Restricts a listing to one `TransactionType`, or to none with `All`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "Thu", alias = "thu", alias = "income")]
    Income,
    #[serde(rename = "Chi", alias = "chi", alias = "expense")]
    Expense,
}

serde_plain::derive_display_from_serialize!(TypeFilter);
serde_plain::derive_fromstr_from_deserialize!(TypeFilter);

impl TypeFilter {
    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Income => Some(TransactionType::Income),
            TypeFilter::Expense => Some(TransactionType::Expense),
        }
    }
}

/// A row of the `transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) created_at: String,
    pub(crate) deleted: bool,
}

impl Transaction {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The creation timestamp exactly as stored, normally `YYYY-MM-DD HH:MM:SS` in local time.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Parses `created_at`. Returns `None` for values that were not written by SQLite's default.
    pub fn created_at_local(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }

    /// True when the transaction is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<5} {}  {}  {}",
            self.id,
            self.created_at,
            self.title,
            self.amount.signed_display(self.transaction_type)
        )
    }
}

/// A validated transaction that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub(crate) title: String,
    pub(crate) amount: Amount,
    pub(crate) transaction_type: TransactionType,
}

impl NewTransaction {
    pub fn new(
        title: impl AsRef<str>,
        amount: Amount,
        transaction_type: TransactionType,
    ) -> Result<Self> {
        Ok(Self {
            title: validate_title(title.as_ref())?,
            amount,
            transaction_type,
        })
    }

    /// Validates raw user input. Fails before anything is written if `title` is blank or
    /// `amount` is not a number.
    pub fn parse(title: &str, amount: &str, transaction_type: TransactionType) -> Result<Self> {
        let title = validate_title(title)?;
        let amount = Amount::from_str(amount)?;
        Ok(Self {
            title,
            amount,
            transaction_type,
        })
    }
}

/// A validated change of title and amount for an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEdit {
    pub(crate) title: String,
    pub(crate) amount: Amount,
}

impl TransactionEdit {
    pub fn parse(title: &str, amount: &str) -> Result<Self> {
        let title = validate_title(title)?;
        let amount = Amount::from_str(amount)?;
        Ok(Self { title, amount })
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        bail!("Missing data: a title is required");
    }
    Ok(trimmed.to_string())
}

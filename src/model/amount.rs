//! Amount type for the value of a transaction.
//!
//! Amounts are stored unsigned. Whether money came in or went out is carried by the
//! `TransactionType`, so `Amount` refuses negative, `NaN` and infinite values.

use crate::model::TransactionType;
use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The currency symbol appended when an amount is shown to the user.
const CURRENCY: &str = "₫";

/// A finite, non-negative monetary value.
///
/// # Examples
///
/// ```
/// # use expense_sync::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("10,000,000").unwrap();
/// assert_eq!(amount.value(), 10_000_000.0);
/// assert_eq!(amount.to_string(), "10,000,000");
/// assert!(Amount::from_str("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Creates an `Amount`, failing if `value` is negative or not finite.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            bail!("Amount must be a number, got {value}");
        }
        if value < 0.0 {
            bail!("Amount must not be negative, use the transaction type for money going out");
        }
        Ok(Self(value))
    }

    /// Wraps a value read back from storage. Values in the database were validated on the way in.
    pub(crate) fn from_stored(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Formats the amount the way it appears in a listing, e.g. `+ 10,000,000 ₫` for income and
    /// `- 50,000 ₫` for an expense.
    pub fn signed_display(&self, transaction_type: TransactionType) -> String {
        let sign = match transaction_type {
            TransactionType::Income => '+',
            TransactionType::Expense => '-',
        };
        format!("{sign} {self} {CURRENCY}")
    }
}

impl FromStr for Amount {
    type Err = anyhow::Error;

    /// Parses user input. Surrounding whitespace is ignored, and commas are allowed as thousands
    /// separators in the integer part.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("Missing data: an amount is required");
        }
        let value = strip_thousands(trimmed)
            .and_then(|cleaned| f64::from_str(&cleaned).ok())
            .with_context(|| format!("Amount must be a number, got '{trimmed}'"))?;
        Amount::new(value)
    }
}

/// Removes thousands separators, returning `None` when a comma is anywhere other than between
/// groups of three digits in the integer part (`1,5` and `1,2,3` are not numbers).
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (integer, fraction) = match s.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (s, None),
    };
    if fraction.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let digits = integer.trim_start_matches(['+', '-']);
    let sign = &integer[..integer.len() - digits.len()];
    let mut groups = digits.split(',');
    let first = groups.next()?;
    let is_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if first.is_empty() || first.len() > 3 || !is_digits(first) {
        return None;
    }
    let mut cleaned = format!("{sign}{first}");
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        cleaned.push_str(group);
    }
    if let Some(fraction) = fraction {
        cleaned.push('.');
        cleaned.push_str(fraction);
    }
    Some(cleaned)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", format_num::format_num!(",.0f", self.0))
        } else {
            write!(f, "{}", format_num::format_num!(",.2f", self.0))
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

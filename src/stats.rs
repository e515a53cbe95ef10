//! Monthly statistics over active transactions.
//!
//! The result always has one slot per calendar month, January first, whether or not anything was
//! recorded in that month. Nothing here writes to the database.

use crate::db::Db;
use crate::model::TransactionType;
use crate::Result;
use serde::{Deserialize, Serialize};

/// The number of month slots in `monthly_totals`.
pub const MONTHS: usize = 12;

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Two digits, `"01"` through `"12"`.
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// Totals across all active transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income: f64,
    pub expense: f64,
    /// `income - expense`
    pub balance: f64,
}

/// One group of the `GROUP BY month, type` query.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthSum {
    pub(crate) month: String,
    pub(crate) transaction_type: TransactionType,
    pub(crate) total: f64,
}

/// Twelve slots of income and expense totals. With `year`, only that year is counted; without it
/// every year is folded into the same twelve months.
pub(crate) async fn monthly_totals(db: &Db, year: Option<i32>) -> Result<Vec<MonthlyTotal>> {
    let sums = db.monthly_sums(year).await?;
    Ok(fold_months(sums))
}

pub(crate) async fn summary(db: &Db) -> Result<Summary> {
    let mut summary = Summary::default();
    for (transaction_type, total) in db.totals_by_type().await? {
        match transaction_type {
            TransactionType::Income => summary.income += total,
            TransactionType::Expense => summary.expense += total,
        }
    }
    summary.balance = summary.income - summary.expense;
    Ok(summary)
}

fn empty_months() -> Vec<MonthlyTotal> {
    (1..=MONTHS)
        .map(|m| MonthlyTotal {
            month: format!("{m:02}"),
            income: 0.0,
            expense: 0.0,
        })
        .collect()
}

/// Places each sum into its month slot. A month label that is not `01`..`12` is ignored.
fn fold_months(sums: impl IntoIterator<Item = MonthSum>) -> Vec<MonthlyTotal> {
    let mut months = empty_months();
    for sum in sums {
        let Some(slot) = sum
            .month
            .parse::<usize>()
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|ix| months.get_mut(ix))
        else {
            continue;
        };
        match sum.transaction_type {
            TransactionType::Income => slot.income = sum.total,
            TransactionType::Expense => slot.expense = sum.total,
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTransaction;
    use crate::test::TestEnv;

    fn sum(month: &str, transaction_type: TransactionType, total: f64) -> MonthSum {
        MonthSum {
            month: month.to_string(),
            transaction_type,
            total,
        }
    }

    #[test]
    fn test_fold_empty_has_twelve_zero_months() {
        let months = fold_months(Vec::new());
        assert_eq!(months.len(), MONTHS);
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(
            labels,
            vec!["01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12"]
        );
        assert!(months.iter().all(|m| m.income == 0.0 && m.expense == 0.0));
    }

    #[test]
    fn test_fold_places_sums() {
        let months = fold_months(vec![
            sum("01", TransactionType::Income, 10.0),
            sum("01", TransactionType::Expense, 4.0),
            sum("12", TransactionType::Expense, 2.5),
        ]);
        assert_eq!(months[0].income, 10.0);
        assert_eq!(months[0].expense, 4.0);
        assert_eq!(months[11].expense, 2.5);
        assert_eq!(months[11].income, 0.0);
    }

    #[test]
    fn test_fold_ignores_bad_months() {
        let months = fold_months(vec![
            sum("00", TransactionType::Income, 1.0),
            sum("13", TransactionType::Income, 1.0),
            sum("xx", TransactionType::Income, 1.0),
        ]);
        assert_eq!(months.len(), MONTHS);
        assert!(months.iter().all(|m| m.income == 0.0));
    }

    #[tokio::test]
    async fn test_monthly_totals_empty_database() {
        let env = TestEnv::new().await;
        let months = monthly_totals(&env.db(), None).await.unwrap();
        assert_eq!(months.len(), MONTHS);
        assert_eq!(months[0].month, "01");
        assert_eq!(months[11].month, "12");
    }

    #[tokio::test]
    async fn test_monthly_totals_from_database() {
        let env = TestEnv::new().await;
        let salary = env.insert("Lương", 10_000_000.0, TransactionType::Income).await;
        let coffee = env.insert("Cà phê", 50_000.0, TransactionType::Expense).await;
        let tea = env.insert("Trà", 20_000.0, TransactionType::Expense).await;
        env.set_created_at(salary.id(), "2025-10-31 18:00:00").await;
        env.set_created_at(coffee.id(), "2025-11-01 08:00:00").await;
        env.set_created_at(tea.id(), "2025-11-02 08:00:00").await;

        let months = monthly_totals(&env.db(), None).await.unwrap();
        assert_eq!(months[9].income, 10_000_000.0);
        assert_eq!(months[10].expense, 70_000.0);
        assert_eq!(months[10].income, 0.0);
    }

    #[tokio::test]
    async fn test_summary() {
        let env = TestEnv::new().await;
        env.insert("Lương", 100.0, TransactionType::Income).await;
        env.insert("Cà phê", 30.0, TransactionType::Expense).await;
        let db = env.db();
        let trashed = db
            .insert(&NewTransaction::parse("Bỏ", "1000", TransactionType::Expense).unwrap())
            .await
            .unwrap();
        db.soft_delete(trashed.id()).await.unwrap();

        let s = summary(&db).await.unwrap();
        assert_eq!(
            s,
            Summary {
                income: 100.0,
                expense: 30.0,
                balance: 70.0
            }
        );
    }
}

//! Statistics command handler.

use crate::args::StatsArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::stats::{self, MonthlyTotal, Summary};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

/// The output of `expense stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Totals over every active transaction, regardless of `year`.
    pub summary: Summary,
    /// Exactly twelve entries, `"01"` through `"12"`.
    pub months: Vec<MonthlyTotal>,
}

/// Computes the income and expense totals of each calendar month, plus an overall summary.
/// Trashed transactions are not counted. Nothing is written.
pub async fn statistics(config: Config, args: StatsArgs) -> Result<Out<Statistics>> {
    let db = config.db();
    let summary = stats::summary(db).await.pub_result(ErrorType::Database)?;
    let months = stats::monthly_totals(db, args.year())
        .await
        .pub_result(ErrorType::Database)?;
    let count = db.count_active().await.pub_result(ErrorType::Database)?;

    let mut lines = Vec::with_capacity(months.len() + 2);
    lines.push(format!(
        "Income {}  Expense {}  Balance {}  ({})",
        money(summary.income),
        money(summary.expense),
        money(summary.balance),
        plural(count as usize, "transaction")
    ));
    match args.year() {
        Some(year) => lines.push(format!("Month   Income / Expense ({year})")),
        None => lines.push("Month   Income / Expense".to_string()),
    }
    for m in &months {
        lines.push(format!(
            "{}      {} / {}",
            m.month,
            money(m.income),
            money(m.expense)
        ));
    }

    Ok(Out::new(lines.join("\n"), Statistics { summary, months }))
}

/// Formats a total, which unlike a stored amount may be negative.
fn money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    match Amount::new(value.abs()) {
        Ok(amount) => format!("{sign}{amount} ₫"),
        Err(_) => format!("{value} ₫"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use crate::stats::MONTHS;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_statistics_empty() {
        let env = TestEnv::new().await;
        let out = statistics(env.config(), StatsArgs::default()).await.unwrap();
        let s = out.structure().unwrap();
        assert_eq!(s.months.len(), MONTHS);
        assert_eq!(s.summary, Summary::default());
        assert!(s.months.iter().all(|m| m.income == 0.0 && m.expense == 0.0));
    }

    #[tokio::test]
    async fn test_statistics() {
        let env = TestEnv::new().await;
        let salary = env.insert("Lương", 10_000_000.0, TransactionType::Income).await;
        let coffee = env.insert("Cà phê", 50_000.0, TransactionType::Expense).await;
        let old = env.insert("Cũ", 5.0, TransactionType::Expense).await;
        env.set_created_at(salary.id(), "2025-10-31 18:00:00").await;
        env.set_created_at(coffee.id(), "2025-11-01 08:00:00").await;
        env.set_created_at(old.id(), "2024-11-01 08:00:00").await;

        let out = statistics(env.config(), StatsArgs::default()).await.unwrap();
        let s = out.structure().unwrap();
        assert_eq!(s.months[9].income, 10_000_000.0);
        assert_eq!(s.months[10].expense, 50_005.0);
        assert_eq!(s.summary.balance, 10_000_000.0 - 50_005.0);
        assert!(out.message().contains("Balance 9,949,995 ₫"), "{}", out.message());
        assert!(out.message().contains("(3 transactions)"), "{}", out.message());

        let out = statistics(env.config(), StatsArgs::new(Some(2024)))
            .await
            .unwrap();
        let s = out.structure().unwrap();
        assert_eq!(s.months[9].income, 0.0);
        assert_eq!(s.months[10].expense, 5.0);
    }

    #[test]
    fn test_money_negative() {
        assert_eq!(money(-1500.0), "-1,500 ₫");
        assert_eq!(money(0.0), "0 ₫");
    }
}

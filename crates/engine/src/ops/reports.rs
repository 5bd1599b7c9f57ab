//! Read-only aggregation over an account's operations.
//!
//! Reports take no locks: a write committing during the scan may or may not
//! be reflected.

use std::collections::HashMap;

use serde::Serialize;

use crate::{DateRange, Kind, Money, ResultEngine, util::checked_sum};

use super::Engine;

/// Label used for operations whose category cannot be resolved.
pub const UNKNOWN_CATEGORY: &str = "(unknown)";

/// Totals over a period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub income: Money,
    pub expense: Money,
    /// `income - expense`
    pub net: Money,
}

impl Summary {
    fn add(&mut self, kind: Kind, amount: Money) -> ResultEngine<()> {
        match kind {
            Kind::Income => self.income = checked_sum(self.income, amount, "income total")?,
            Kind::Expense => self.expense = checked_sum(self.expense, amount, "expense total")?,
        }
        self.net = checked_sum(self.income, -self.expense, "net total")?;
        Ok(())
    }
}

/// Totals of one category over a period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category_id: String,
    /// [`UNKNOWN_CATEGORY`] when the category is gone.
    pub name: String,
    /// `None` when the category is gone.
    pub kind: Option<Kind>,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

impl Engine {
    pub async fn summary_by_period(
        &self,
        account_id: &str,
        range: DateRange,
    ) -> ResultEngine<Summary> {
        let mut summary = Summary::default();
        for operation in self.list_operations(account_id, range).await? {
            summary.add(operation.kind, operation.amount)?;
        }
        Ok(summary)
    }

    /// Per-category totals sorted by expense, then income, both descending.
    pub async fn breakdown_by_category(
        &self,
        account_id: &str,
        range: DateRange,
    ) -> ResultEngine<Vec<CategorySummary>> {
        let operations = self.list_operations(account_id, range).await?;

        let mut totals: HashMap<String, Summary> = HashMap::new();
        for operation in &operations {
            totals
                .entry(operation.category_id.clone())
                .or_default()
                .add(operation.kind, operation.amount)?;
        }

        let names: HashMap<String, (String, Kind)> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|category| (category.id, (category.name, category.kind)))
            .collect();

        let mut rows: Vec<CategorySummary> = totals
            .into_iter()
            .map(|(category_id, totals)| {
                let (name, kind) = match names.get(&category_id) {
                    Some((name, kind)) => (name.clone(), Some(*kind)),
                    None => (UNKNOWN_CATEGORY.to_string(), None),
                };
                CategorySummary {
                    category_id,
                    name,
                    kind,
                    income: totals.income,
                    expense: totals.expense,
                    net: totals.net,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.expense
                .cmp(&a.expense)
                .then_with(|| b.income.cmp(&a.income))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        Ok(rows)
    }
}

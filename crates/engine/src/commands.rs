//! Command structs for ledger operations.
//!
//! These types group parameters for the write operations (apply, replace,
//! edit), keeping call sites readable and avoiding long argument lists.

use chrono::NaiveDate;

use crate::{Kind, Money};

/// Record a new income or expense on an account.
#[derive(Clone, Debug)]
pub struct ApplyOperationCmd {
    pub kind: Kind,
    pub account_id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category_id: String,
    pub description: String,
}

impl ApplyOperationCmd {
    #[must_use]
    pub fn new(
        kind: Kind,
        account_id: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            account_id: account_id.into(),
            amount,
            date,
            category_id: category_id.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn income(
        account_id: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        category_id: impl Into<String>,
    ) -> Self {
        Self::new(Kind::Income, account_id, amount, date, category_id)
    }

    #[must_use]
    pub fn expense(
        account_id: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        category_id: impl Into<String>,
    ) -> Self {
        Self::new(Kind::Expense, account_id, amount, date, category_id)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Overwrite every mutable field of an existing operation.
#[derive(Clone, Debug)]
pub struct ReplaceOperationCmd {
    pub operation_id: String,
    pub kind: Kind,
    pub amount: Money,
    pub date: NaiveDate,
    pub category_id: String,
    pub description: String,
}

impl ReplaceOperationCmd {
    #[must_use]
    pub fn new(
        operation_id: impl Into<String>,
        kind: Kind,
        amount: Money,
        date: NaiveDate,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            kind,
            amount,
            date,
            category_id: category_id.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// How a patch points at a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryRef {
    Id(String),
    /// Matched case-insensitively against categories of the resulting kind,
    /// created when missing.
    Name(String),
}

/// Partial update of an operation: `None` leaves the field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationPatch {
    pub kind: Option<Kind>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<CategoryRef>,
    pub description: Option<String>,
}

impl OperationPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn category_id(mut self, id: impl Into<String>) -> Self {
        self.category = Some(CategoryRef::Id(id.into()));
        self
    }

    /// Matched against categories of the resulting kind; a missing one is
    /// created before the edit runs and deleted again if the edit fails.
    #[must_use]
    pub fn category_name(mut self, name: impl Into<String>) -> Self {
        self.category = Some(CategoryRef::Name(name.into()));
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

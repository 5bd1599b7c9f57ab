//! The module contains `Operation` struct and its implementation.
//!
//! An operation is a single income or expense recorded against one account
//! and labelled with one category.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Kind, Money, ResultEngine,
    util::{new_id, parse_stored_money, require_date, require_id, require_positive},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub kind: Kind,
    pub account_id: String,
    /// Always strictly positive; the sign lives in `kind`.
    pub amount: Money,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: String,
}

impl Operation {
    /// Validates the fields and assigns a fresh id.
    pub fn new(
        kind: Kind,
        account_id: &str,
        amount: Money,
        date: NaiveDate,
        category_id: &str,
        description: &str,
    ) -> ResultEngine<Self> {
        let operation = Self {
            id: new_id(),
            kind,
            account_id: account_id.trim().to_string(),
            amount,
            date,
            description: description.trim().to_string(),
            category_id: category_id.trim().to_string(),
        };
        operation.validate()
    }

    /// Checks every field and returns the operation with its amount rounded.
    pub fn validate(mut self) -> ResultEngine<Self> {
        require_id(&self.id, "operation")?;
        require_id(&self.account_id, "account")?;
        require_id(&self.category_id, "category")?;
        self.amount = require_positive(self.amount, "amount")?;
        self.date = require_date(self.date)?;
        Ok(self)
    }

    /// Effect on the account balance: `+amount` for income, `-amount` for
    /// expense.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: i32,
    pub account_id: String,
    pub amount: String,
    pub date: Date,
    pub description: String,
    pub category_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Operation> for ActiveModel {
    fn from(value: &Operation) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            kind: ActiveValue::Set(value.kind.into()),
            account_id: ActiveValue::Set(value.account_id.clone()),
            amount: ActiveValue::Set(value.amount.to_string()),
            date: ActiveValue::Set(value.date),
            description: ActiveValue::Set(value.description.clone()),
            category_id: ActiveValue::Set(value.category_id.clone()),
        }
    }
}

impl TryFrom<Model> for Operation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: Kind::try_from(model.kind)?,
            amount: parse_stored_money(&model.amount, "operation amount")?,
            id: model.id,
            account_id: model.account_id,
            date: model.date,
            description: model.description,
            category_id: model.category_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_rounds_and_trims() {
        let op = Operation::new(
            Kind::Expense,
            "acc",
            "12.345".parse().unwrap(),
            date(2024, 3, 1),
            "cat",
            "  lunch ",
        )
        .unwrap();
        assert_eq!(op.amount, Money::from_cents(1235));
        assert_eq!(op.description, "lunch");
        assert_eq!(op.signed_amount(), Money::from_cents(-1235));
    }

    #[test]
    fn invalid_fields_fail_validation() {
        let ok_date = date(2024, 1, 1);
        let amount = Money::from_cents(100);
        let cases = [
            Operation::new(Kind::Income, "", amount, ok_date, "cat", ""),
            Operation::new(Kind::Income, "acc", amount, ok_date, " ", ""),
            Operation::new(Kind::Income, "acc", Money::ZERO, ok_date, "cat", ""),
            Operation::new(Kind::Income, "acc", Money::from_cents(-5), ok_date, "cat", ""),
            Operation::new(Kind::Income, "acc", amount, date(1, 1, 1), "cat", ""),
        ];
        for case in cases {
            assert!(case.unwrap_err().is_validation());
        }
    }

    #[test]
    fn model_conversion_keeps_fields() {
        let op = Operation::new(
            Kind::Income,
            "acc",
            Money::from_cents(5000),
            date(2024, 5, 6),
            "cat",
            "salary",
        )
        .unwrap();
        let model = Model {
            id: op.id.clone(),
            kind: 1,
            account_id: "acc".to_string(),
            amount: "50.00".to_string(),
            date: date(2024, 5, 6),
            description: "salary".to_string(),
            category_id: "cat".to_string(),
        };
        assert_eq!(Operation::try_from(model).unwrap(), op);
    }
}

//! The module contains `Account` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Kind, Money, ResultEngine,
    util::{
        checked_sum, new_id, normalize_required_name, parse_stored_money, require_id,
        require_positive,
    },
};

/// A bank account, wallet or anything else where money is kept.
///
/// The balance is always the signed sum of the account operations and never
/// goes below zero. It is only mutated through [`credit`](Account::credit)
/// and [`debit`](Account::debit) inside a ledger transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, generated once and never changed.
    pub id: String,
    pub name: String,
    pub balance: Money,
}

impl Account {
    /// Creates an account with a zero balance.
    pub fn new(name: &str) -> ResultEngine<Self> {
        let account = Self {
            id: new_id(),
            name: normalize_required_name(name, "account")?,
            balance: Money::ZERO,
        };
        account.validate()?;
        Ok(account)
    }

    pub fn validate(&self) -> ResultEngine<()> {
        require_id(&self.id, "account")?;
        normalize_required_name(&self.name, "account")?;
        if self.balance.is_negative() {
            return Err(EngineError::InsufficientFunds(format!(
                "account '{}' has a negative balance",
                self.name
            )));
        }
        Ok(())
    }

    /// Returns `true` if `amount` is positive and covered by the balance.
    #[must_use]
    pub fn can_debit(&self, amount: Money) -> bool {
        amount
            .normalize()
            .is_some_and(|amount| self.balance >= amount)
    }

    pub fn rename(&mut self, name: &str) -> ResultEngine<()> {
        self.name = normalize_required_name(name, "account")?;
        Ok(())
    }

    pub fn credit(&mut self, amount: Money) -> ResultEngine<()> {
        let amount = require_positive(amount, "credit amount")?;
        self.balance = checked_sum(self.balance, amount, "balance")?;
        Ok(())
    }

    /// Overdraft is never permitted.
    pub fn debit(&mut self, amount: Money) -> ResultEngine<()> {
        let amount = require_positive(amount, "debit amount")?;
        if self.balance < amount {
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} cannot cover {amount}",
                self.balance
            )));
        }
        self.balance = checked_sum(self.balance, -amount, "balance")?;
        Ok(())
    }

    /// Applies the effect of an operation: income credits, expense debits.
    pub fn apply(&mut self, kind: Kind, amount: Money) -> ResultEngine<()> {
        match kind {
            Kind::Income => self.credit(amount),
            Kind::Expense => self.debit(amount),
        }
    }

    /// Removes the effect of an operation: reversing an income debits,
    /// reversing an expense credits.
    pub fn revert(&mut self, kind: Kind, amount: Money) -> ResultEngine<()> {
        match kind {
            Kind::Income => self.debit(amount),
            Kind::Expense => self.credit(amount),
        }
    }

    /// Undoes `old` and redoes `new` as a single balance transition.
    ///
    /// Only the resulting balance has to be non-negative: the intermediate
    /// value after the undo step is never observable, so shrinking an income
    /// that the balance could not fully give back still succeeds when the
    /// new amount keeps the account covered.
    pub fn replace(&mut self, old: (Kind, Money), new: (Kind, Money)) -> ResultEngine<()> {
        let old_amount = require_positive(old.1, "previous amount")?;
        let new_amount = require_positive(new.1, "new amount")?;

        let undone = checked_sum(self.balance, -old.0.signed(old_amount), "balance")?;
        let redone = checked_sum(undone, new.0.signed(new_amount), "balance")?;
        if redone.is_negative() {
            return Err(EngineError::InsufficientFunds(format!(
                "balance {} cannot cover replacing {} {} with {} {}",
                self.balance, old.0, old_amount, new.0, new_amount
            )));
        }
        self.balance = redone;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::operations::Entity")]
    Operations,
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            balance: ActiveValue::Set(value.balance.to_string()),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: parse_stored_money(&model.balance, "balance")?,
            id: model.id,
            name: model.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(cents: i64) -> Account {
        let mut account = Account::new("Cash").unwrap();
        account.balance = Money::from_cents(cents);
        account
    }

    #[test]
    fn new_account_starts_empty() {
        let account = Account::new("  Savings ").unwrap();
        assert_eq!(account.name, "Savings");
        assert_eq!(account.balance, Money::ZERO);
        assert!(!account.id.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            Account::new("   ").unwrap_err(),
            EngineError::InvalidName("account name must not be empty".to_string())
        );
        let mut account = account(0);
        assert!(account.rename("").is_err());
        assert_eq!(account.name, "Cash");
    }

    #[test]
    fn credit_and_debit() {
        let mut account = account(10000);
        account.credit(Money::from_cents(2550)).unwrap();
        assert_eq!(account.balance, Money::from_cents(12550));
        account.debit(Money::from_cents(12550)).unwrap();
        assert_eq!(account.balance, Money::ZERO);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut account = account(100);
        assert!(account.credit(Money::ZERO).unwrap_err().is_validation());
        assert!(account.debit(Money::from_cents(-1)).unwrap_err().is_validation());
        assert_eq!(account.balance, Money::from_cents(100));
    }

    #[test]
    fn overdraft_is_rejected() {
        let mut account = account(100);
        let err = account.debit(Money::from_cents(101)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds(_)));
        assert_eq!(account.balance, Money::from_cents(100));
        assert!(!account.can_debit(Money::from_cents(101)));
        assert!(account.can_debit(Money::from_cents(100)));
    }

    #[test]
    fn replace_checks_only_the_final_balance() {
        // income 200 and expense 150 leave 50; shrinking the income to 190
        // goes through a virtual -150 but ends at 40.
        let mut account = account(5000);
        account
            .replace(
                (Kind::Income, Money::from_cents(20000)),
                (Kind::Income, Money::from_cents(19000)),
            )
            .unwrap();
        assert_eq!(account.balance, Money::from_cents(4000));

        let err = account
            .replace(
                (Kind::Income, Money::from_cents(19000)),
                (Kind::Income, Money::from_cents(10000)),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds(_)));
        assert_eq!(account.balance, Money::from_cents(4000));
    }

    #[test]
    fn credit_past_the_decimal_range_is_rejected() {
        let huge: Money = "50000000000000000000000000000".parse().unwrap();
        let mut account = account(0);
        account.credit(huge).unwrap();
        let err = account.credit(huge).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(account.balance, huge);

        let err = account
            .replace((Kind::Expense, huge), (Kind::Income, huge))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(account.balance, huge);
    }

    #[test]
    fn replace_can_flip_kind() {
        let mut account = account(10000);
        account
            .replace(
                (Kind::Expense, Money::from_cents(3000)),
                (Kind::Income, Money::from_cents(3000)),
            )
            .unwrap();
        assert_eq!(account.balance, Money::from_cents(16000));
    }
}

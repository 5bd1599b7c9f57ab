use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Account, EngineError, Money, ResultEngine, accounts, operations, util::checked_sum,
};

use super::{Engine, locks, with_tx};

impl Engine {
    /// Creates an account with a zero balance.
    pub async fn create_account(&self, name: &str) -> ResultEngine<Account> {
        let account = Account::new(name)?;
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        tracing::debug!(account_id = %account.id, name = %account.name, "account created");
        Ok(account)
    }

    pub async fn account(&self, id: &str) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("account {id}")))?;
        Account::try_from(model)
    }

    /// All accounts ordered by name.
    pub async fn list_accounts(&self) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .order_by_asc(accounts::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn rename_account(&self, id: &str, name: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let mut account = locks::lock_account(&db_tx, id).await?;
            account.rename(name)?;
            accounts::ActiveModel {
                id: ActiveValue::Unchanged(account.id.clone()),
                name: ActiveValue::Set(account.name.clone()),
                balance: ActiveValue::NotSet,
            }
            .update(&db_tx)
            .await?;
            Ok(account)
        })
    }

    /// Deletes an account that has no operations left.
    pub async fn delete_account(&self, id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = locks::lock_account(&db_tx, id).await?;
            let used = operations::Entity::find()
                .filter(operations::Column::AccountId.eq(id))
                .count(&db_tx)
                .await?;
            if used > 0 {
                return Err(EngineError::InUse(format!(
                    "account '{}' has {used} operations",
                    account.name
                )));
            }
            accounts::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Recomputes the balance from the account operations under the row lock.
    ///
    /// Returns `(stored, recomputed)`. A recomputed balance below zero is
    /// rejected and nothing is written.
    pub async fn reconcile_account(&self, id: &str) -> ResultEngine<(Money, Money)> {
        let (old, new) = with_tx!(self, |db_tx| {
            let mut account = locks::lock_account(&db_tx, id).await?;
            let models = operations::Entity::find()
                .filter(operations::Column::AccountId.eq(id))
                .all(&db_tx)
                .await?;
            let mut recomputed = Money::ZERO;
            for model in models {
                let operation = crate::Operation::try_from(model)?;
                recomputed = checked_sum(recomputed, operation.signed_amount(), "balance")?;
            }
            if recomputed.is_negative() {
                return Err(EngineError::InsufficientFunds(format!(
                    "operations of account '{}' sum to {recomputed}",
                    account.name
                )));
            }
            let old = account.balance;
            if old != recomputed {
                account.balance = recomputed;
                locks::store_balance(&db_tx, &account).await?;
            }
            Ok((old, recomputed))
        })?;
        if old != new {
            tracing::warn!(account_id = %id, %old, %new, "account balance reconciled");
        }
        Ok((old, new))
    }
}

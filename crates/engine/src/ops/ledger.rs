//! Apply, reverse and replace: the only paths that change a balance.
//!
//! Each one is a single unit of work. The account row is locked before the
//! balance is read, so two writers on the same account serialize while
//! writers on different accounts do not contend. Any failure rolls back both
//! the operation row and the balance.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    ApplyOperationCmd, Category, CategoryRef, DateRange, EngineError, Money, Operation,
    OperationPatch, ReplaceOperationCmd, ResultEngine, categories, operations,
    util::{require_date, require_id, require_positive},
};

use super::{Engine, locks, with_tx};

/// Reads a category inside the running transaction.
async fn require_category(db_tx: &DatabaseTransaction, id: &str) -> ResultEngine<Category> {
    let model = categories::Entity::find_by_id(id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("category {id}")))?;
    Category::try_from(model)
}

impl Engine {
    /// Records a new operation and moves the account balance accordingly.
    ///
    /// Income credits the account, expense debits it; an expense larger than
    /// the balance fails with `InsufficientFunds` and nothing is written.
    pub async fn apply_operation(&self, cmd: ApplyOperationCmd) -> ResultEngine<Operation> {
        let operation = Operation::new(
            cmd.kind,
            &cmd.account_id,
            cmd.amount,
            cmd.date,
            &cmd.category_id,
            &cmd.description,
        )?;

        let balance = with_tx!(self, |db_tx| {
            let mut account = locks::lock_account(&db_tx, &operation.account_id).await?;
            require_category(&db_tx, &operation.category_id)
                .await?
                .require_kind(operation.kind)?;
            account.apply(operation.kind, operation.amount)?;
            operations::ActiveModel::from(&operation)
                .insert(&db_tx)
                .await?;
            locks::store_balance(&db_tx, &account).await?;
            Ok(account.balance)
        })?;

        tracing::debug!(
            operation_id = %operation.id,
            account_id = %operation.account_id,
            kind = %operation.kind,
            amount = %operation.amount,
            %balance,
            "operation applied"
        );
        Ok(operation)
    }

    /// Deletes an operation and takes its effect off the balance.
    ///
    /// Reversing an income debits the account and fails with
    /// `InsufficientFunds` when the money has already been spent. A second
    /// reverse of the same id fails with `NotFound`.
    pub async fn reverse_operation(&self, id: &str) -> ResultEngine<Operation> {
        let id = require_id(id, "operation")?;
        let (operation, balance) = with_tx!(self, |db_tx| {
            let operation = locks::lock_operation(&db_tx, &id).await?;
            let mut account = locks::lock_account(&db_tx, &operation.account_id).await?;
            account.revert(operation.kind, operation.amount)?;
            operations::Entity::delete_by_id(operation.id.clone())
                .exec(&db_tx)
                .await?;
            locks::store_balance(&db_tx, &account).await?;
            Ok((operation, account.balance))
        })?;

        tracing::debug!(
            operation_id = %operation.id,
            account_id = %operation.account_id,
            %balance,
            "operation reversed"
        );
        Ok(operation)
    }

    /// Overwrites every mutable field of an operation.
    ///
    /// The old effect is undone and the new one applied against the balance
    /// read under the account lock. The category must agree with the new
    /// kind. On failure the operation row and the balance keep their
    /// previous values.
    pub async fn replace_operation(&self, cmd: ReplaceOperationCmd) -> ResultEngine<Operation> {
        let operation_id = require_id(&cmd.operation_id, "operation")?;
        let category_id = require_id(&cmd.category_id, "category")?;
        let amount = require_positive(cmd.amount, "amount")?;
        let date = require_date(cmd.date)?;
        let description = cmd.description.trim().to_string();

        let (operation, balance) = with_tx!(self, |db_tx| {
            let old = locks::lock_operation(&db_tx, &operation_id).await?;
            let next = Operation {
                id: old.id.clone(),
                kind: cmd.kind,
                account_id: old.account_id.clone(),
                amount,
                date,
                description: description.clone(),
                category_id: category_id.clone(),
            };
            self.replace_locked(&db_tx, old, next).await
        })?;

        tracing::debug!(
            operation_id = %operation.id,
            account_id = %operation.account_id,
            %balance,
            "operation replaced"
        );
        Ok(operation)
    }

    /// Applies a partial update: fields left `None` keep their current value.
    ///
    /// A category given by name is looked up among categories of the
    /// resulting kind and created when missing, before the transaction
    /// starts. If the edit then fails, a category created for it is
    /// deleted again.
    pub async fn edit_operation(&self, id: &str, patch: OperationPatch) -> ResultEngine<Operation> {
        let id = require_id(id, "operation")?;
        if patch.is_empty() {
            return self.operation(&id).await;
        }
        let OperationPatch {
            kind,
            amount,
            date,
            category,
            description,
        } = patch;

        let amount = amount
            .map(|amount| require_positive(amount, "amount"))
            .transpose()?;
        let date = date.map(require_date).transpose()?;
        let mut created = None;
        let category_id = match category {
            Some(CategoryRef::Id(category_id)) => Some(require_id(&category_id, "category")?),
            Some(CategoryRef::Name(name)) => {
                let kind = match kind {
                    Some(kind) => kind,
                    None => self.operation(&id).await?.kind,
                };
                let (category, fresh) = self.resolve_category(&name, kind).await?;
                if fresh {
                    created = Some(category.id.clone());
                }
                Some(category.id)
            }
            None => None,
        };
        let description = description.map(|text| text.trim().to_string());

        let outcome: ResultEngine<(Operation, Money)> = with_tx!(self, |db_tx| {
            let old = locks::lock_operation(&db_tx, &id).await?;
            let next = Operation {
                id: old.id.clone(),
                kind: kind.unwrap_or(old.kind),
                account_id: old.account_id.clone(),
                amount: amount.unwrap_or(old.amount),
                date: date.unwrap_or(old.date),
                description: description.clone().unwrap_or_else(|| old.description.clone()),
                category_id: category_id.clone().unwrap_or_else(|| old.category_id.clone()),
            };
            self.replace_locked(&db_tx, old, next).await
        });

        let (operation, balance) = match outcome {
            Ok(done) => done,
            Err(err) => {
                if let Some(category_id) = created {
                    self.drop_unused_category(&category_id).await;
                }
                return Err(err);
            }
        };

        tracing::debug!(
            operation_id = %operation.id,
            account_id = %operation.account_id,
            %balance,
            "operation edited"
        );
        Ok(operation)
    }

    /// Removes a category created for an edit that did not commit.
    async fn drop_unused_category(&self, id: &str) {
        let result = match self.categories.has_operations(id).await {
            Ok(false) => self.categories.delete(id).await,
            Ok(true) => Ok(()),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::warn!(category_id = id, error = %err, "could not drop category of a failed edit");
        }
    }

    /// Undo-then-redo on a locked operation. Returns the stored operation
    /// and the new balance.
    async fn replace_locked(
        &self,
        db_tx: &DatabaseTransaction,
        old: Operation,
        next: Operation,
    ) -> ResultEngine<(Operation, Money)> {
        let next = next.validate()?;
        require_category(db_tx, &next.category_id)
            .await?
            .require_kind(next.kind)?;

        let mut account = locks::lock_account(db_tx, &old.account_id).await?;
        account.replace((old.kind, old.amount), (next.kind, next.amount))?;

        let mut active = operations::ActiveModel::from(&next);
        active.id = ActiveValue::Unchanged(next.id.clone());
        active.account_id = ActiveValue::Unchanged(next.account_id.clone());
        active.update(db_tx).await?;
        locks::store_balance(db_tx, &account).await?;
        Ok((next, account.balance))
    }

    pub async fn operation(&self, id: &str) -> ResultEngine<Operation> {
        let model = operations::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("operation {id}")))?;
        Operation::try_from(model)
    }

    /// Operations of an account inside `range`, ordered by date then id.
    pub async fn list_operations(
        &self,
        account_id: &str,
        range: DateRange,
    ) -> ResultEngine<Vec<Operation>> {
        self.account(account_id).await?;
        operations::Entity::find()
            .filter(operations::Column::AccountId.eq(account_id))
            .filter(operations::Column::Date.between(range.from(), range.to()))
            .order_by_asc(operations::Column::Date)
            .order_by_asc(operations::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Operation::try_from)
            .collect()
    }
}

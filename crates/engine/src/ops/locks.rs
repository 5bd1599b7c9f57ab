//! Row locks for the ledger transactions.
//!
//! `SELECT … FOR UPDATE` where the backend has it. SQLite ignores that
//! clause, so there the row is first touched with a no-op `UPDATE`, which
//! takes the database write lock until the transaction ends.

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseBackend, DatabaseTransaction, QuerySelect, Statement,
    prelude::*,
};

use crate::{Account, EngineError, Operation, ResultEngine, accounts, operations};

async fn touch(db_tx: &DatabaseTransaction, sql: &str, id: &str) -> ResultEngine<()> {
    let backend = db_tx.get_database_backend();
    if backend == DatabaseBackend::Sqlite {
        db_tx
            .execute(Statement::from_sql_and_values(
                backend,
                sql,
                vec![id.to_string().into()],
            ))
            .await?;
    }
    Ok(())
}

/// Locks the account row and returns its current state.
pub(super) async fn lock_account(db_tx: &DatabaseTransaction, id: &str) -> ResultEngine<Account> {
    touch(db_tx, "UPDATE accounts SET balance = balance WHERE id = ?;", id).await?;
    let model = accounts::Entity::find_by_id(id.to_string())
        .lock_exclusive()
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("account {id}")))?;
    Account::try_from(model)
}

/// Locks the operation row. Callers lock the owning account afterwards.
pub(super) async fn lock_operation(
    db_tx: &DatabaseTransaction,
    id: &str,
) -> ResultEngine<Operation> {
    touch(db_tx, "UPDATE operations SET amount = amount WHERE id = ?;", id).await?;
    let model = operations::Entity::find_by_id(id.to_string())
        .lock_exclusive()
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("operation {id}")))?;
    Operation::try_from(model)
}

/// Writes the balance of a locked account back.
pub(super) async fn store_balance(db_tx: &DatabaseTransaction, account: &Account) -> ResultEngine<()> {
    accounts::ActiveModel {
        id: ActiveValue::Unchanged(account.id.clone()),
        name: ActiveValue::NotSet,
        balance: ActiveValue::Set(account.balance.to_string()),
    }
    .update(db_tx)
    .await?;
    Ok(())
}

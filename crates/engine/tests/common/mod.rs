#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{Account, ApplyOperationCmd, Category, Engine, Kind, Money, Operation};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn money(value: &str) -> Money {
    value.parse().unwrap()
}

pub struct Fixture {
    pub account: Account,
    pub salary: Category,
    pub food: Category,
}

pub async fn fixture(engine: &Engine) -> Fixture {
    Fixture {
        account: engine.create_account("Cash").await.unwrap(),
        salary: engine.create_category("Salary", Kind::Income).await.unwrap(),
        food: engine.create_category("Food", Kind::Expense).await.unwrap(),
    }
}

pub async fn income(engine: &Engine, fx: &Fixture, amount: &str, day: u32) -> Operation {
    engine
        .apply_operation(ApplyOperationCmd::income(
            fx.account.id.clone(),
            money(amount),
            date(2024, 1, day),
            fx.salary.id.clone(),
        ))
        .await
        .unwrap()
}

pub async fn expense(engine: &Engine, fx: &Fixture, amount: &str, day: u32) -> Operation {
    engine
        .apply_operation(ApplyOperationCmd::expense(
            fx.account.id.clone(),
            money(amount),
            date(2024, 1, day),
            fx.food.id.clone(),
        ))
        .await
        .unwrap()
}

pub async fn balance(engine: &Engine, account_id: &str) -> Money {
    engine.account(account_id).await.unwrap().balance
}

/// Signed sum of the stored operations of an account.
pub async fn operations_total(engine: &Engine, account_id: &str) -> Money {
    engine
        .list_operations(account_id, engine::DateRange::all())
        .await
        .unwrap()
        .iter()
        .map(Operation::signed_amount)
        .sum()
}

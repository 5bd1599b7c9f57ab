mod common;

use sea_orm::{ConnectionTrait, Statement};

use engine::{ApplyOperationCmd, DateRange, Kind, Money, UNKNOWN_CATEGORY};

use common::{date, engine_with_db, expense, fixture, income, money};

#[tokio::test]
async fn summary_sums_by_sign_inside_the_range() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;
    income(&engine, &fx, "1000", 1).await;
    expense(&engine, &fx, "120.40", 5).await;
    expense(&engine, &fx, "0.10", 10).await;
    income(&engine, &fx, "50", 20).await;

    let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 10)).unwrap();
    let summary = engine.summary_by_period(&fx.account.id, range).await.unwrap();
    assert_eq!(summary.income, money("1000"));
    assert_eq!(summary.expense, money("120.50"));
    assert_eq!(summary.net, money("879.50"));

    let empty = DateRange::new(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
    let summary = engine.summary_by_period(&fx.account.id, empty).await.unwrap();
    assert_eq!(summary.net, Money::ZERO);
}

#[tokio::test]
async fn breakdown_is_sorted_by_expense_then_income() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;
    let rent = engine.create_category("Rent", Kind::Expense).await.unwrap();
    let bonus = engine.create_category("Bonus", Kind::Income).await.unwrap();

    income(&engine, &fx, "1000", 1).await;
    engine
        .apply_operation(ApplyOperationCmd::income(
            fx.account.id.clone(),
            money("300"),
            date(2024, 1, 2),
            bonus.id.clone(),
        ))
        .await
        .unwrap();
    expense(&engine, &fx, "80", 3).await;
    expense(&engine, &fx, "20", 4).await;
    engine
        .apply_operation(ApplyOperationCmd::expense(
            fx.account.id.clone(),
            money("500"),
            date(2024, 1, 5),
            rent.id.clone(),
        ))
        .await
        .unwrap();

    let rows = engine
        .breakdown_by_category(&fx.account.id, DateRange::all())
        .await
        .unwrap();
    let order: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(order, vec!["Rent", "Food", "Salary", "Bonus"]);

    assert_eq!(rows[1].expense, money("100"));
    assert_eq!(rows[1].net, money("-100"));
    assert_eq!(rows[1].kind, Some(Kind::Expense));
    assert_eq!(rows[2].income, money("1000"));
    assert_eq!(rows[2].net, money("1000"));
}

#[tokio::test]
async fn unresolved_category_is_reported_as_unknown() {
    let (engine, db) = engine_with_db().await;
    let fx = fixture(&engine).await;
    income(&engine, &fx, "100", 1).await;
    expense(&engine, &fx, "30", 2).await;

    // drop the category row behind the engine's back
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "PRAGMA foreign_keys = OFF"))
        .await
        .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM categories WHERE id = ?",
        vec![fx.food.id.clone().into()],
    ))
    .await
    .unwrap();
    // a fresh engine on the same database starts with an empty cache
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let rows = engine
        .breakdown_by_category(&fx.account.id, DateRange::all())
        .await
        .unwrap();
    let unknown = rows
        .iter()
        .find(|row| row.category_id == fx.food.id)
        .unwrap();
    assert_eq!(unknown.name, UNKNOWN_CATEGORY);
    assert_eq!(unknown.kind, None);
    assert_eq!(unknown.expense, money("30"));
}

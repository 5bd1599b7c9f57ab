mod common;

use std::collections::BTreeSet;

use engine::{DateRange, EngineError, Format, Kind, Money, Row, read_rows, write_rows};

use common::{date, engine_with_db, expense, fixture, income, money};

type Record = (i32, Money, chrono::NaiveDate, String, String);

fn records(rows: &[Row]) -> BTreeSet<Record> {
    rows.iter()
        .map(|row| {
            (
                row.kind,
                row.amount,
                row.date,
                row.category.clone(),
                row.description.clone(),
            )
        })
        .collect()
}

#[tokio::test]
async fn export_then_import_reproduces_the_operations() {
    for format in [Format::Csv, Format::Json, Format::Yaml] {
        let (engine, _db) = engine_with_db().await;
        let fx = fixture(&engine).await;
        income(&engine, &fx, "1500", 1).await;
        expense(&engine, &fx, "12.30", 2).await;
        expense(&engine, &fx, "7.70", 2).await;

        let exported = engine
            .export_rows(&fx.account.id, DateRange::all())
            .await
            .unwrap();
        assert_eq!(exported.len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ops.out");
        write_rows(&path, format, &exported).unwrap();
        let decoded = read_rows(&path, format).unwrap();
        assert_eq!(records(&decoded), records(&exported));

        let target = engine.create_account("Copy").await.unwrap();
        let report = engine.import_rows(&target.id, &decoded).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.into_result().unwrap(), 3);

        let reimported = engine
            .export_rows(&target.id, DateRange::all())
            .await
            .unwrap();
        assert_eq!(records(&reimported), records(&exported));
        assert_eq!(
            engine.account(&target.id).await.unwrap().balance,
            money("1480")
        );

        // Salary and Food were matched by name and kind, not duplicated
        assert_eq!(engine.list_categories().await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn import_creates_missing_categories_once() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.create_account("Main").await.unwrap();
    let rows = vec![
        Row {
            kind: 1,
            amount: money("100"),
            date: date(2024, 3, 1),
            category: "Freelance".to_string(),
            description: "invoice 1".to_string(),
        },
        Row {
            kind: 1,
            amount: money("50"),
            date: date(2024, 3, 2),
            category: "freelance".to_string(),
            description: "invoice 2".to_string(),
        },
        Row {
            kind: -1,
            amount: money("20"),
            date: date(2024, 3, 3),
            category: "Freelance".to_string(),
            description: "fees".to_string(),
        },
    ];

    let imported = engine
        .import_rows(&account.id, &rows)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(imported, 3);

    let categories = engine.list_categories().await.unwrap();
    let kinds: Vec<Kind> = categories.iter().map(|category| category.kind).collect();
    assert_eq!(kinds, vec![Kind::Expense, Kind::Income]);
    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        money("130")
    );
}

#[tokio::test]
async fn import_stops_at_the_first_failing_row() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.create_account("Main").await.unwrap();
    let row = |kind: i32, amount: &str, day: u32| Row {
        kind,
        amount: money(amount),
        date: date(2024, 3, day),
        category: "Misc".to_string(),
        description: String::new(),
    };
    let rows = vec![row(1, "10", 1), row(-1, "25", 2), row(1, "5", 3)];

    let report = engine.import_rows(&account.id, &rows).await.unwrap();
    assert_eq!(report.imported, 1);
    let (index, err) = report.failed.as_ref().unwrap();
    assert_eq!(*index, 1);
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert!(matches!(report.into_result(), Err(EngineError::Import(_))));

    assert_eq!(
        engine.account(&account.id).await.unwrap().balance,
        money("10")
    );

    let bad_kind = vec![row(0, "1", 4)];
    let report = engine.import_rows(&account.id, &bad_kind).await.unwrap();
    assert!(matches!(report.failed, Some((0, EngineError::InvalidKind(_)))));

    assert!(matches!(
        engine.import_rows("missing", &rows).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn export_is_limited_to_the_range() {
    let (engine, _db) = engine_with_db().await;
    let fx = fixture(&engine).await;
    income(&engine, &fx, "10", 1).await;
    income(&engine, &fx, "20", 15).await;

    let range = DateRange::new(date(2024, 1, 10), date(2024, 1, 31)).unwrap();
    let rows = engine.export_rows(&fx.account.id, range).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, money("20"));
    assert_eq!(rows[0].category, "Salary");
}

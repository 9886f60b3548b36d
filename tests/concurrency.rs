use std::{sync::Arc, thread, time::Duration};

use plandb::{
    catalog::{Catalog, Database},
    config::EngineConfig,
    context::{ExecutionContext, Session},
    data_types::DataType,
    plan::{CreateDatabase, PlanNode, PlanRef, ResolvedTable},
    row::{Row, Value},
    row_iter::collect_rows,
    schema::{Column, Schema},
    DBError, PlanDB, ResultSet,
};

const THREADS: usize = 16;

#[test]
fn concurrent_creates_of_distinct_databases() {
    let db = PlanDB::new();
    thread::scope(|s| {
        for i in 0..THREADS {
            let db = &db;
            s.spawn(move || {
                let session = db.new_session();
                assert_eq!(
                    db.execute_in_session(&session, &format!("CREATE DATABASE db_{i}")),
                    Ok(ResultSet::empty())
                );
            });
        }
    });

    assert_eq!(db.catalog().len(), Ok(THREADS));
    for i in 0..THREADS {
        assert_eq!(db.catalog().has_database(&format!("db_{i}")), Ok(true));
    }
}

#[test]
fn concurrent_create_if_not_exists_of_the_same_name() {
    let catalog = Arc::new(Catalog::new());
    thread::scope(|s| {
        for _ in 0..THREADS {
            let catalog = Arc::clone(&catalog);
            s.spawn(move || {
                let ctx = ExecutionContext::new(Arc::new(Session::new()));
                let node: PlanRef =
                    Arc::new(CreateDatabase::new(catalog, "shared", true, None, None));
                assert_eq!(node.row_iter(&ctx).and_then(collect_rows), Ok(vec![]));
            });
        }
    });
    assert_eq!(catalog.all_databases(), Ok(vec!["shared".to_string()]));
}

#[test]
fn readers_and_writers_share_the_catalog() {
    let db = PlanDB::new();
    db.execute("CREATE DATABASE base").unwrap();
    thread::scope(|s| {
        for i in 0..THREADS {
            let db = &db;
            s.spawn(move || {
                let session = db.new_session();
                if i % 2 == 0 {
                    db.execute_in_session(&session, &format!("CREATE DATABASE w_{i}"))
                        .unwrap();
                } else {
                    let rs = db.execute_in_session(&session, "SHOW DATABASES").unwrap();
                    assert!(rs.rows.contains(&Row::new(vec![Value::String("base".to_string())])));
                }
            });
        }
    });
    assert_eq!(db.catalog().len(), Ok(1 + THREADS / 2));
}

fn numbers_table(rows: i64) -> ResolvedTable {
    let catalog = Catalog::new();
    let db = catalog.add_database(Database::new("test")).unwrap();
    let table = db
        .create_table(
            "numbers",
            Schema::new(vec![Column::new("n", DataType::Int64)]),
        )
        .unwrap();
    table
        .insert_data((0..rows).map(|n| Row::new(vec![Value::Int64(n)])).collect())
        .unwrap();
    ResolvedTable::new("test", table)
}

#[test]
fn cancellation_stops_a_running_scan() {
    let scan = numbers_table(10);
    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let handle = ctx.cancellation().clone();

    let mut iter = scan.row_iter(&ctx).unwrap();
    assert_eq!(iter.next(), Ok(Some(Row::new(vec![Value::Int64(0)]))));
    assert_eq!(iter.next(), Ok(Some(Row::new(vec![Value::Int64(1)]))));

    thread::spawn(move || handle.cancel()).join().unwrap();
    assert_eq!(iter.next(), Err(DBError::Cancelled));
    assert_eq!(iter.close(), Ok(()));
}

#[test]
fn expired_deadline_fails_the_statement() {
    let scan = numbers_table(3);
    let ctx = ExecutionContext::new(Arc::new(Session::new())).with_timeout(Duration::ZERO);
    assert_eq!(scan.row_iter(&ctx).map(|_| ()), Err(DBError::DeadlineExceeded));
}

#[test]
fn statement_timeout_from_config() {
    let config = EngineConfig {
        statement_timeout_ms: Some(0),
        ..EngineConfig::default()
    };
    let db = PlanDB::with_config(config).unwrap();
    assert_eq!(db.execute("SHOW DATABASES"), Err(DBError::DeadlineExceeded));
}

#[test]
fn config_is_read_from_json() {
    let config = EngineConfig::from_json(
        r#"{"case_sensitive_names": true, "default_database": "app"}"#,
    )
    .unwrap();
    assert!(config.case_sensitive_names);
    assert_eq!(config.default_database, Some("app".to_string()));
    assert_eq!(config.statement_timeout_ms, None);

    let db = PlanDB::with_config(config).unwrap();
    assert_eq!(
        db.default_session().current_database(),
        Some("app".to_string())
    );
    assert_eq!(db.execute("CREATE TABLE t (id INT)"), Ok(ResultSet::empty()));
    // names differing only in case are distinct databases
    assert_eq!(db.execute("CREATE DATABASE App"), Ok(ResultSet::empty()));
    assert_eq!(db.catalog().len(), Ok(2));

    assert_eq!(EngineConfig::from_json("{}"), Ok(EngineConfig::default()));
    assert!(EngineConfig::from_json("not json").is_err());
}

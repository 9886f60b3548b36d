use plandb::{
    data_types::DataType,
    row::{Row, Value},
    schema::{Column, Schema},
    DBError, PlanDB, ResultSet,
};

fn orders_db() -> PlanDB {
    let db = PlanDB::new();
    assert_eq!(
        db.execute("create database shop; use shop"),
        Ok(ResultSet::empty())
    );
    assert_eq!(
        db.execute("create table orders (id int, amount double, userId text)"),
        Ok(ResultSet::empty())
    );
    assert_eq!(
        db.execute("insert into orders values (1, 30.0, '101'), (2, 60, '102')"),
        Ok(ResultSet::empty())
    );
    db
}

fn orders_schema() -> Schema {
    Schema::new(vec![
        Column::new("id", DataType::Int64).with_source("orders"),
        Column::new("amount", DataType::Float64).with_source("orders"),
        Column::new("userId", DataType::String).with_source("orders"),
    ])
}

#[test]
fn create_insert_and_query() {
    let db = orders_db();
    assert_eq!(
        db.default_session().variable("row_count"),
        Some(Value::Int64(2))
    );

    let expected_results = ResultSet::new(
        orders_schema(),
        vec![Row::new(vec![
            Value::Int64(2),
            Value::Float64(60.0),
            Value::String("102".to_string()),
        ])],
    );
    assert_eq!(
        db.execute("select * from orders where id > 1"),
        Ok(expected_results)
    );
}

#[test]
fn query_with_projection_and_expressions() {
    let db = orders_db();
    let expected_results = ResultSet::new(
        Schema::new(vec![
            Column::new("id", DataType::Int64),
            Column::new("total", DataType::Float64),
        ]),
        vec![Row::new(vec![Value::Int64(1), Value::Float64(45.0)])],
    );
    assert_eq!(
        db.execute("select id, amount * 1.5 as total from orders where amount < 50"),
        Ok(expected_results)
    );
}

#[test]
fn query_with_limit_and_offset() {
    let db = orders_db();
    db.execute("insert into orders (id, amount) values (3, 10)")
        .unwrap();

    let rs = db.execute("select id from orders limit 1 offset 1").unwrap();
    assert_eq!(rs.rows, vec![Row::new(vec![Value::Int64(2)])]);

    // columns missing from the insert are null
    let rs = db.execute("select userId from orders where id = 3").unwrap();
    assert_eq!(rs.rows, vec![Row::new(vec![Value::Null])]);
}

#[test]
fn query_over_several_tables() {
    let db = orders_db();
    db.execute("create table users (id int, name varchar(20))")
        .unwrap();
    db.execute("insert into users values (1, 'ann'), (2, 'bob')")
        .unwrap();

    let rs = db
        .execute("select orders.id, users.name from orders, users where orders.id = users.id")
        .unwrap();
    assert_eq!(
        rs.rows,
        vec![
            Row::new(vec![Value::Int64(1), Value::String("ann".to_string())]),
            Row::new(vec![Value::Int64(2), Value::String("bob".to_string())]),
        ]
    );
    assert_eq!(rs.schema.names(), vec!["id".to_string(), "name".to_string()]);
}

#[test]
fn insert_from_select_copies_rows() {
    let db = orders_db();
    db.execute("create table archive (id int, amount double, userId text)")
        .unwrap();
    db.execute("insert into archive select * from orders").unwrap();
    assert_eq!(
        db.default_session().variable("row_count"),
        Some(Value::Int64(2))
    );
    // a table fed from itself only sees the rows present when the scan started
    db.execute("insert into orders select * from orders").unwrap();
    assert_eq!(db.execute("select * from orders").unwrap().rows.len(), 4);
    assert_eq!(db.execute("select * from archive").unwrap().rows.len(), 2);
}

#[test]
fn select_without_from() {
    let db = PlanDB::new();
    let expected_results = ResultSet::new(
        Schema::new(vec![Column::new("two", DataType::Int64)]),
        vec![Row::new(vec![Value::Int64(2)])],
    );
    assert_eq!(db.execute("select 1 + 1 as two"), Ok(expected_results));
}

#[test]
fn qualified_table_names_do_not_need_a_current_database() {
    let db = orders_db();
    let session = db.new_session();
    assert_eq!(session.current_database(), None);
    let rs = db
        .execute_in_session(&session, "select id from shop.orders")
        .unwrap();
    assert_eq!(rs.rows.len(), 2);
}

#[test]
fn create_table_if_not_exists_warns() {
    let db = orders_db();
    assert_eq!(
        db.execute("create table orders (id int)"),
        Err(DBError::TableAlreadyExists("orders".to_string()))
    );
    assert_eq!(
        db.execute("create table if not exists orders (id int)"),
        Ok(ResultSet::empty())
    );
    let warnings = db.default_session().warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, 1050);
}

#[test]
fn query_errors() {
    let db = orders_db();
    assert_eq!(
        db.execute("select * from missing"),
        Err(DBError::TableNotFound("missing".to_string()))
    );
    assert_eq!(
        db.execute("select nope from orders"),
        Err(DBError::ColumnNotFound("nope".to_string()))
    );
    assert_eq!(
        db.execute("select * from nowhere.orders"),
        Err(DBError::DatabaseNotFound("nowhere".to_string()))
    );
    assert!(matches!(
        db.execute("insert into orders values (1, 'abc', 'x')"),
        Err(DBError::InterpretingError(_))
    ));
    assert!(matches!(db.execute("selec 1"), Err(DBError::ParserError(_))));
    assert!(matches!(db.execute(""), Err(DBError::ParserError(_))));

    let fresh = PlanDB::new();
    assert_eq!(
        fresh.execute("select * from orders"),
        Err(DBError::NoDatabaseSelected)
    );
}

#[test]
fn unqualified_column_present_in_several_tables_is_ambiguous() {
    let db = orders_db();
    db.execute("create table users (id int, name text)").unwrap();
    db.execute("insert into users values (1, 'ann')").unwrap();

    assert_eq!(
        db.execute("select id from orders, users"),
        Err(DBError::AmbiguousColumn("id".to_string()))
    );
    assert_eq!(
        db.execute("select name from orders, users where id = 1"),
        Err(DBError::AmbiguousColumn("id".to_string()))
    );
    // a column only one side has still binds without qualification
    let rs = db
        .execute("select amount, name from orders, users where orders.id = 1")
        .unwrap();
    assert_eq!(
        rs.rows,
        vec![Row::new(vec![
            Value::Float64(30.0),
            Value::String("ann".to_string())
        ])]
    );
}

#[test]
fn insert_rejects_a_column_listed_twice() {
    let db = orders_db();
    assert_eq!(
        db.execute("insert into orders (id, id) values (7, 8)"),
        Err(DBError::DuplicateColumn("id".to_string()))
    );
    assert_eq!(db.execute("select * from orders").unwrap().rows.len(), 2);
}

#[test]
fn table_aliases_qualify_columns() {
    let db = orders_db();
    let rs = db
        .execute("select o.id from orders as o where o.amount > 50")
        .unwrap();
    assert_eq!(rs.rows, vec![Row::new(vec![Value::Int64(2)])]);

    let rs = db
        .execute("select a.id, b.id from orders a, orders b where a.id < b.id")
        .unwrap();
    assert_eq!(
        rs.rows,
        vec![Row::new(vec![Value::Int64(1), Value::Int64(2)])]
    );

    // once aliased, the table name no longer qualifies its columns
    assert_eq!(
        db.execute("select orders.id from orders as o"),
        Err(DBError::ColumnNotFound("orders.id".to_string()))
    );
}

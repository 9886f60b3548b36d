use std::{
    any::Any,
    fmt::Display,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use plandb::{
    analyzer::{rules::ResolveTablesRule, rules::Rule, AnalyzerContext},
    catalog::{Catalog, Database},
    context::{ExecutionContext, Session},
    data_types::DataType,
    expressions::{BinaryOp, Expression},
    plan::{
        describe_tree, nillary_with_children, transform_up, CreateDatabase, CrossJoin, Filter,
        InsertInto, Limit, PlanNode, PlanRef, Project, ResolvedTable, UnresolvedTable, Values,
    },
    row::{Row, Value},
    row_iter::{collect_rows, BoxedRowIter, RowIter},
    schema::{Column, Schema},
    DBError, DBResult,
};

fn same_node(a: &PlanRef, b: &PlanRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn int_rows(values: &[i64]) -> Vec<Row> {
    values
        .iter()
        .map(|v| Row::new(vec![Value::Int64(*v)]))
        .collect()
}

fn values(v: &[i64]) -> PlanRef {
    Arc::new(Values::new(int_rows(v)))
}

fn setup_catalog() -> (Arc<Catalog>, Arc<Session>) {
    let catalog = Arc::new(Catalog::new());
    let db = catalog.add_database(Database::new("shop")).unwrap();
    db.create_table(
        "orders",
        Schema::new(vec![Column::new("id", DataType::Int64)]),
    )
    .unwrap();
    db.create_table(
        "users",
        Schema::new(vec![Column::new("uid", DataType::Int64)]),
    )
    .unwrap();
    let session = Arc::new(Session::new());
    session.set_current_database(Some("shop".to_string()));
    (catalog, session)
}

/// Source node counting how many rows were pulled and how often it was closed.
#[derive(Debug, Clone)]
struct CountingSource {
    rows: usize,
    fail_at: Option<usize>,
    fail_close: bool,
    pulls: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl CountingSource {
    fn new(rows: usize) -> Self {
        CountingSource {
            rows,
            fail_at: None,
            fail_close: false,
            pulls: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Display for CountingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CountingSource({})", self.rows)
    }
}

impl PlanNode for CountingSource {
    fn resolved(&self) -> bool {
        true
    }

    fn schema(&self) -> Option<Schema> {
        Some(Schema::new(vec![Column::new("n", DataType::Int64)]))
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        nillary_with_children(self, children)
    }

    fn row_iter(&self, _ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        Ok(Box::new(CountingIter {
            source: self.clone(),
            pos: 0,
            closed: false,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct CountingIter {
    source: CountingSource,
    pos: usize,
    closed: bool,
}

impl RowIter for CountingIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        if self.pos >= self.source.rows {
            return Ok(None);
        }
        self.source.pulls.fetch_add(1, Ordering::SeqCst);
        if self.source.fail_at == Some(self.pos) {
            return Err(DBError::InterpretingError("broken source".to_string()));
        }
        self.pos += 1;
        Ok(Some(Row::new(vec![Value::Int64(self.pos as i64)])))
    }

    fn close(&mut self) -> DBResult<()> {
        if !self.closed {
            self.closed = true;
            self.source.closes.fetch_add(1, Ordering::SeqCst);
            if self.source.fail_close {
                return Err(DBError::Unknown("close failed".to_string()));
            }
        }
        Ok(())
    }
}

#[test]
fn with_children_rejects_wrong_arity() {
    let catalog = Arc::new(Catalog::new());
    let ddl: PlanRef = Arc::new(CreateDatabase::new(catalog, "a", false, None, None));
    assert_eq!(
        ddl.with_children(vec![values(&[1])]).map(|_| ()),
        Err(DBError::ArityMismatch {
            node: "CreateDatabase".to_string(),
            expected: 0,
            actual: 1,
        })
    );

    let filter: PlanRef = Arc::new(Filter::new(
        Expression::literal(Value::Boolean(true)),
        values(&[1]),
    ));
    assert_eq!(
        filter.with_children(vec![]).map(|_| ()),
        Err(DBError::ArityMismatch {
            node: "Filter".to_string(),
            expected: 1,
            actual: 0,
        })
    );

    let join: PlanRef = Arc::new(CrossJoin::new(values(&[1]), values(&[2])));
    assert_eq!(
        join.with_children(vec![values(&[3])]).map(|_| ()),
        Err(DBError::ArityMismatch {
            node: "CrossJoin".to_string(),
            expected: 2,
            actual: 1,
        })
    );
}

#[test]
fn with_children_builds_a_new_node_and_keeps_the_original() {
    let left = values(&[1]);
    let right = values(&[2]);
    let join: PlanRef = Arc::new(CrossJoin::new(Arc::clone(&left), Arc::clone(&right)));

    let new_left = values(&[3]);
    let new_right = values(&[4]);
    let rebuilt = join
        .with_children(vec![Arc::clone(&new_left), Arc::clone(&new_right)])
        .unwrap();

    let rebuilt_children = rebuilt.children();
    assert!(same_node(&rebuilt_children[0], &new_left));
    assert!(same_node(&rebuilt_children[1], &new_right));

    let original_children = join.children();
    assert!(same_node(&original_children[0], &left));
    assert!(same_node(&original_children[1], &right));
}

#[test]
fn leaf_nodes_accept_an_empty_child_list() {
    let leaf = values(&[1, 2]);
    let copy = leaf.with_children(vec![]).unwrap();
    assert!(copy.children().is_empty());
    assert_eq!(copy.to_string(), leaf.to_string());
}

#[test]
fn resolution_depends_on_children_and_expressions() {
    let (catalog, session) = setup_catalog();

    let unresolved: PlanRef = Arc::new(UnresolvedTable::new(None, "orders"));
    assert!(!unresolved.resolved());
    let over_unresolved: PlanRef = Arc::new(Limit::new(0, Some(1), Arc::clone(&unresolved)));
    assert!(!over_unresolved.resolved());

    let table = catalog
        .database("shop")
        .unwrap()
        .try_get_table("orders")
        .unwrap();
    let scan: PlanRef = Arc::new(ResolvedTable::new("shop", table));
    assert!(scan.resolved());

    let filter: PlanRef = Arc::new(Filter::new(
        Expression::binary(
            BinaryOp::Gt,
            Expression::column("id"),
            Expression::literal(Value::Int64(1)),
        ),
        Arc::clone(&scan),
    ));
    assert!(!filter.resolved());

    let ctx = ExecutionContext::new(session);
    assert!(matches!(
        filter.row_iter(&ctx).map(|_| ()),
        Err(DBError::NotResolved(_))
    ));
}

#[test]
fn transform_up_shares_untouched_subtrees() {
    let (catalog, session) = setup_catalog();
    let table = catalog
        .database("shop")
        .unwrap()
        .try_get_table("orders")
        .unwrap();
    let left: PlanRef = Arc::new(ResolvedTable::new("shop", table));
    let right: PlanRef = Arc::new(UnresolvedTable::new(None, "users"));
    let join: PlanRef = Arc::new(CrossJoin::new(Arc::clone(&left), Arc::clone(&right)));
    let root: PlanRef = Arc::new(Limit::new(0, Some(10), Arc::clone(&join)));

    let context = AnalyzerContext::new(catalog, session);
    let rewritten = ResolveTablesRule {}
        .apply(&root, &context)
        .unwrap()
        .expect("the users table should have been resolved");

    assert!(rewritten.resolved());
    assert!(!root.resolved());
    let new_join = &rewritten.children()[0];
    assert!(!same_node(new_join, &join));
    assert!(same_node(&new_join.children()[0], &left));
    assert_eq!(new_join.children()[1].to_string(), "Table(shop.users)");
    // the original tree still points at the unresolved table
    assert!(same_node(&join.children()[1], &right));
}

#[test]
fn transform_up_returns_none_when_nothing_changes() {
    let root: PlanRef = Arc::new(Limit::new(0, None, values(&[1, 2])));
    let result = transform_up(&root, &mut |_: &PlanRef| Ok(None)).unwrap();
    assert!(result.is_none());
}

#[test]
fn describe_tree_indents_children() {
    let scan: PlanRef = Arc::new(UnresolvedTable::new(Some("shop".to_string()), "orders"));
    let filter: PlanRef = Arc::new(Filter::new(
        Expression::binary(
            BinaryOp::Gt,
            Expression::column("id"),
            Expression::literal(Value::Int64(1)),
        ),
        scan,
    ));
    let project: PlanRef = Arc::new(Project::new(vec![Expression::column("id")], filter));

    assert_eq!(
        describe_tree(project.as_ref()),
        "Project(id)\n  Filter(id > 1)\n    UnresolvedTable(shop.orders)\n"
    );
}

#[test]
fn limit_stops_pulling_once_satisfied() {
    let source = CountingSource::new(100);
    let pulls = Arc::clone(&source.pulls);
    let closes = Arc::clone(&source.closes);
    let limit: PlanRef = Arc::new(Limit::new(1, Some(2), Arc::new(source)));

    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let rows = collect_rows(limit.row_iter(&ctx).unwrap()).unwrap();

    assert_eq!(rows, int_rows(&[2, 3]));
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn child_errors_propagate_and_the_pipeline_is_closed_once() {
    let mut source = CountingSource::new(5);
    source.fail_at = Some(2);
    let closes = Arc::clone(&source.closes);
    let filter: PlanRef = Arc::new(Filter::new(
        Expression::literal(Value::Boolean(true)),
        Arc::new(source),
    ));

    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let mut iter = filter.row_iter(&ctx).unwrap();
    assert_eq!(iter.next(), Ok(Some(Row::new(vec![Value::Int64(1)]))));
    assert_eq!(iter.next(), Ok(Some(Row::new(vec![Value::Int64(2)]))));
    assert_eq!(
        iter.next(),
        Err(DBError::InterpretingError("broken source".to_string()))
    );

    assert_eq!(iter.close(), Ok(()));
    assert_eq!(iter.close(), Ok(()));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn cross_join_close_releases_left_input_when_right_close_fails() {
    let left = CountingSource::new(3);
    let left_closes = Arc::clone(&left.closes);
    let mut right = CountingSource::new(2);
    right.fail_close = true;
    let right_closes = Arc::clone(&right.closes);
    let join: PlanRef = Arc::new(CrossJoin::new(Arc::new(left), Arc::new(right)));

    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let mut iter = join.row_iter(&ctx).unwrap();
    assert_eq!(
        iter.next(),
        Ok(Some(Row::new(vec![Value::Int64(1), Value::Int64(1)])))
    );

    assert_eq!(
        iter.close(),
        Err(DBError::Unknown("close failed".to_string()))
    );
    assert_eq!(left_closes.load(Ordering::SeqCst), 1);
    assert_eq!(right_closes.load(Ordering::SeqCst), 1);
    assert_eq!(iter.close(), Ok(()));
    assert_eq!(left_closes.load(Ordering::SeqCst), 1);
}

#[test]
fn cross_join_closes_an_exhausted_right_input_once() {
    let mut right = CountingSource::new(1);
    right.fail_close = true;
    let right_closes = Arc::clone(&right.closes);
    let join: PlanRef = Arc::new(CrossJoin::new(values(&[10, 20]), Arc::new(right)));

    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let mut iter = join.row_iter(&ctx).unwrap();
    assert_eq!(
        iter.next(),
        Ok(Some(Row::new(vec![Value::Int64(10), Value::Int64(1)])))
    );
    assert_eq!(
        iter.next(),
        Err(DBError::Unknown("close failed".to_string()))
    );
    assert_eq!(iter.close(), Ok(()));
    assert_eq!(right_closes.load(Ordering::SeqCst), 1);
}

#[test]
fn cross_join_reruns_the_right_side_for_every_left_row() {
    let right = CountingSource::new(2);
    let right_closes = Arc::clone(&right.closes);
    let join: PlanRef = Arc::new(CrossJoin::new(values(&[10, 20, 30]), Arc::new(right)));

    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let rows = collect_rows(join.row_iter(&ctx).unwrap()).unwrap();

    assert_eq!(rows.len(), 6);
    assert_eq!(
        rows[1],
        Row::new(vec![Value::Int64(10), Value::Int64(2)])
    );
    assert_eq!(
        rows[4],
        Row::new(vec![Value::Int64(30), Value::Int64(1)])
    );
    assert_eq!(right_closes.load(Ordering::SeqCst), 3);
}

#[test]
fn side_effect_runs_once_even_when_it_fails() {
    use plandb::row_iter::SideEffectIter;

    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let mut iter = SideEffectIter::new(&ctx, move |_: &ExecutionContext| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(DBError::Unknown("boom".to_string()))
    });

    assert_eq!(iter.next(), Err(DBError::Unknown("boom".to_string())));
    assert_eq!(iter.next(), Ok(None));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_values_yield_no_rows() {
    let ctx = ExecutionContext::new(Arc::new(Session::new()));
    let empty: PlanRef = Arc::new(Values::new(vec![]));
    assert_eq!(empty.row_iter(&ctx).and_then(collect_rows), Ok(vec![]));
}

#[test]
fn insert_reports_its_own_error_when_closing_the_source_also_fails() {
    let (catalog, session) = setup_catalog();
    catalog
        .database("shop")
        .unwrap()
        .create_table(
            "pairs",
            Schema::new(vec![
                Column::new("a", DataType::Int64),
                Column::new("b", DataType::Int64),
            ]),
        )
        .unwrap();

    // one-column rows into a two-column table
    let mut source = CountingSource::new(3);
    source.fail_close = true;
    let closes = Arc::clone(&source.closes);
    let insert: PlanRef = Arc::new(InsertInto::new(
        Arc::clone(&catalog),
        None,
        "pairs",
        vec![],
        Arc::new(source),
    ));

    let ctx = ExecutionContext::new(session);
    let result = insert.row_iter(&ctx).and_then(collect_rows);
    assert!(
        matches!(&result, Err(DBError::InterpretingError(msg)) if msg.contains("column count")),
        "unexpected result: {result:?}"
    );
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

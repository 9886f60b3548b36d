use std::sync::Arc;

use sqlparser::{
    ast::{
        BinaryOperator, Expr, ObjectName, Query, Select, SelectItem, SetExpr, Statement,
        TableFactor, UnaryOperator, Value as AstValue, Values as AstValues,
    },
    dialect::MySqlDialect,
    keywords::Keyword,
    parser::Parser,
    tokenizer::Token,
};

use crate::{
    catalog::Catalog,
    data_types::DataType,
    expressions::{BinaryOp, Expression, UnaryOp},
    interpreter::Interpreter,
    plan::{
        CreateDatabase, CreateTable, CrossJoin, DropDatabase, Filter, InsertInto, Limit, PlanRef,
        Project, ShowDatabases, UnresolvedTable, UseDatabase, Values,
    },
    row::{Row, Value},
    schema::{Column, Schema},
    DBError, DBResult,
};

/// Turns SQL text into unresolved plan trees, one per statement.
pub fn build_plans(sql: &str, catalog: &Arc<Catalog>) -> DBResult<Vec<PlanRef>> {
    let dialect = MySqlDialect {};
    let mut parser = Parser::new(&dialect).try_with_sql(sql)?;
    let builder = PlanBuilder {
        catalog: Arc::clone(catalog),
    };

    let mut plans = Vec::new();
    loop {
        while parser.consume_token(&Token::SemiColon) {}
        if parser.peek_token().token == Token::EOF {
            break;
        }
        plans.push(builder.build_statement(&mut parser)?);

        let next = parser.peek_token().token;
        if !(parser.consume_token(&Token::SemiColon) || next == Token::EOF) {
            return Err(DBError::ParserError(format!(
                "expected end of statement, found: {next}"
            )));
        }
    }
    Ok(plans)
}

struct PlanBuilder {
    catalog: Arc<Catalog>,
}

impl PlanBuilder {
    fn build_statement(&self, parser: &mut Parser) -> DBResult<PlanRef> {
        // statements sqlparser does not cover for MySQL are handled here
        if parser.parse_keyword(Keyword::CREATE) {
            if parser
                .parse_one_of_keywords(&[Keyword::DATABASE, Keyword::SCHEMA])
                .is_some()
            {
                return self.create_database(parser);
            }
            parser.prev_token();
        } else if parser.parse_keyword(Keyword::DROP) {
            if parser
                .parse_one_of_keywords(&[Keyword::DATABASE, Keyword::SCHEMA])
                .is_some()
            {
                return self.drop_database(parser);
            }
            parser.prev_token();
        } else if parser.parse_keyword(Keyword::SHOW) {
            let what = parser.parse_identifier()?;
            return match what.value.to_lowercase().as_str() {
                "databases" | "schemas" => {
                    Ok(Arc::new(ShowDatabases::new(Arc::clone(&self.catalog))))
                }
                other => Err(DBError::NotSupported(format!("SHOW {other}"))),
            };
        } else if parser.parse_keyword(Keyword::USE) {
            let db_name = parser.parse_identifier()?;
            return Ok(Arc::new(UseDatabase::new(
                Arc::clone(&self.catalog),
                db_name.value,
            )));
        }

        let statement = parser.parse_statement()?;
        log::debug!("AST: {statement:?}");
        match statement {
            Statement::CreateTable {
                name,
                columns,
                if_not_exists,
                ..
            } => {
                let (database, table_name) = split_object_name(&name)?;
                let columns = columns
                    .iter()
                    .map(|c| Ok(Column::new(c.name.value.clone(), DataType::try_from(&c.data_type)?)))
                    .collect::<DBResult<Vec<_>>>()?;
                Ok(Arc::new(CreateTable::new(
                    Arc::clone(&self.catalog),
                    database,
                    table_name,
                    if_not_exists,
                    Schema::new(columns),
                )))
            }
            Statement::Insert {
                table_name,
                columns,
                source,
                ..
            } => {
                let (database, table_name) = split_object_name(&table_name)?;
                let source = self.build_query(*source)?;
                Ok(Arc::new(InsertInto::new(
                    Arc::clone(&self.catalog),
                    database,
                    table_name,
                    columns.into_iter().map(|c| c.value).collect(),
                    source,
                )))
            }
            Statement::Query(query) => self.build_query(*query),
            other => Err(DBError::NotSupported(format!("statement {other}"))),
        }
    }

    /// `[IF NOT EXISTS] name [[DEFAULT] {CHARACTER SET | CHARSET} [=] x] [[DEFAULT] COLLATE [=] y]`
    fn create_database(&self, parser: &mut Parser) -> DBResult<PlanRef> {
        let if_not_exists = parser.parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let db_name = parser.parse_identifier()?.value;

        let (mut charset, mut collation) = (None, None);
        loop {
            let _ = parser.parse_keyword(Keyword::DEFAULT);
            if parser.parse_keywords(&[Keyword::CHARACTER, Keyword::SET])
                || parser.parse_keyword(Keyword::CHARSET)
            {
                let _ = parser.consume_token(&Token::Eq);
                charset = Some(parser.parse_identifier()?.value);
            } else if parser.parse_keyword(Keyword::COLLATE) {
                let _ = parser.consume_token(&Token::Eq);
                collation = Some(parser.parse_identifier()?.value);
            } else {
                break;
            }
        }

        Ok(Arc::new(CreateDatabase::new(
            Arc::clone(&self.catalog),
            db_name,
            if_not_exists,
            collation,
            charset,
        )))
    }

    fn drop_database(&self, parser: &mut Parser) -> DBResult<PlanRef> {
        let if_exists = parser.parse_keywords(&[Keyword::IF, Keyword::EXISTS]);
        let db_name = parser.parse_identifier()?.value;
        Ok(Arc::new(DropDatabase::new(
            Arc::clone(&self.catalog),
            db_name,
            if_exists,
            None,
            None,
        )))
    }

    fn build_query(&self, query: Query) -> DBResult<PlanRef> {
        if query.with.is_some() {
            return Err(DBError::NotSupported("WITH".to_string()));
        }
        if !query.order_by.is_empty() {
            return Err(DBError::NotSupported("ORDER BY".to_string()));
        }

        let mut plan = match *query.body {
            SetExpr::Select(select) => self.build_select(*select)?,
            SetExpr::Values(values) => values_plan(values)?,
            other => return Err(DBError::NotSupported(format!("query {other}"))),
        };

        if query.limit.is_some() || query.offset.is_some() {
            let limit = query.limit.as_ref().map(expr_to_usize).transpose()?;
            let offset = query
                .offset
                .as_ref()
                .map(|o| expr_to_usize(&o.value))
                .transpose()?
                .unwrap_or(0);
            plan = Arc::new(Limit::new(offset, limit, plan));
        }
        Ok(plan)
    }

    fn build_select(&self, select: Select) -> DBResult<PlanRef> {
        if !select.group_by.is_empty() || select.having.is_some() {
            return Err(DBError::NotSupported("GROUP BY".to_string()));
        }

        // tables listed in FROM are cross joined, left to right
        let mut plan: Option<PlanRef> = None;
        for table_with_joins in &select.from {
            if !table_with_joins.joins.is_empty() {
                return Err(DBError::NotSupported("JOIN".to_string()));
            }
            let table: PlanRef = match &table_with_joins.relation {
                TableFactor::Table { name, alias, .. } => {
                    let (database, table_name) = split_object_name(name)?;
                    let table = UnresolvedTable::new(database, table_name);
                    match alias {
                        Some(alias) if !alias.columns.is_empty() => {
                            return Err(DBError::NotSupported(format!("table alias {alias}")))
                        }
                        Some(alias) => Arc::new(table.with_alias(alias.name.value.clone())),
                        None => Arc::new(table),
                    }
                }
                other => return Err(DBError::NotSupported(format!("table factor {other}"))),
            };
            plan = Some(match plan {
                Some(left) => Arc::new(CrossJoin::new(left, table)),
                None => table,
            });
        }
        // SELECT without FROM reads a single empty row
        let mut plan = plan.unwrap_or_else(|| Arc::new(Values::new(vec![Row::new(vec![])])));

        if let Some(selection) = &select.selection {
            plan = Arc::new(Filter::new(ast_expr_to_plan_expr(selection)?, plan));
        }

        if !is_projection_wildcard(&select.projection) {
            let projections = select
                .projection
                .into_iter()
                .map(ast_projection_to_plan_expr)
                .collect::<DBResult<Vec<_>>>()?;
            plan = Arc::new(Project::new(projections, plan));
        }
        Ok(plan)
    }
}

fn values_plan(values: AstValues) -> DBResult<PlanRef> {
    let empty = Row::new(vec![]);
    let rows = values
        .rows
        .iter()
        .map(|exprs| {
            exprs
                .iter()
                .map(|e| {
                    let expr = ast_expr_to_plan_expr(e)?;
                    if !expr.resolved() {
                        return Err(DBError::NotSupported(format!(
                            "column reference {expr} in VALUES"
                        )));
                    }
                    Interpreter::eval(&expr, &empty)
                })
                .collect::<DBResult<Vec<_>>>()
                .map(Row::new)
        })
        .collect::<DBResult<Vec<_>>>()?;
    Ok(Arc::new(Values::new(rows)))
}

fn split_object_name(name: &ObjectName) -> DBResult<(Option<String>, String)> {
    match name.0.as_slice() {
        [table] => Ok((None, table.value.clone())),
        [database, table] => Ok((Some(database.value.clone()), table.value.clone())),
        _ => Err(DBError::ParserError(format!("invalid table name: {name}"))),
    }
}

fn is_projection_wildcard(projections: &[SelectItem]) -> bool {
    projections.is_empty()
        || projections.len() == 1 && matches!(projections[0], SelectItem::Wildcard(_))
}

fn ast_projection_to_plan_expr(projection: SelectItem) -> DBResult<Expression> {
    match projection {
        SelectItem::UnnamedExpr(expr) => ast_expr_to_plan_expr(&expr),
        SelectItem::ExprWithAlias { expr, alias } => {
            ast_expr_to_plan_expr(&expr).map(|expr| Expression::Alias {
                alias: alias.value,
                child: Box::new(expr),
            })
        }
        SelectItem::QualifiedWildcard(..) | SelectItem::Wildcard(_) => Err(
            DBError::NotSupported("wildcard mixed with other projections".to_string()),
        ),
    }
}

fn expr_to_usize(expr: &Expr) -> DBResult<usize> {
    match expr {
        Expr::Value(AstValue::Number(n, _)) => n
            .parse()
            .map_err(|_| DBError::ParserError(format!("invalid row count: {n}"))),
        other => Err(DBError::NotSupported(format!("row count {other}"))),
    }
}

fn ast_binary_op_to_plan_binary_op(op: &BinaryOperator) -> DBResult<BinaryOp> {
    match op {
        BinaryOperator::Plus => Ok(BinaryOp::Plus),
        BinaryOperator::Minus => Ok(BinaryOp::Minus),
        BinaryOperator::Multiply => Ok(BinaryOp::Multiply),
        BinaryOperator::Divide => Ok(BinaryOp::Divide),
        BinaryOperator::Gt => Ok(BinaryOp::Gt),
        BinaryOperator::Lt => Ok(BinaryOp::Lt),
        BinaryOperator::GtEq => Ok(BinaryOp::Gte),
        BinaryOperator::LtEq => Ok(BinaryOp::Lte),
        BinaryOperator::Eq => Ok(BinaryOp::Eq),
        BinaryOperator::NotEq => Ok(BinaryOp::NotEq),
        BinaryOperator::And => Ok(BinaryOp::And),
        BinaryOperator::Or => Ok(BinaryOp::Or),
        other => Err(DBError::NotSupported(format!("operator {other}"))),
    }
}

fn ast_expr_to_plan_expr(expr: &Expr) -> DBResult<Expression> {
    match expr {
        Expr::Identifier(ident) => Ok(Expression::UnresolvedColumn {
            table: None,
            name: ident.value.clone(),
        }),
        Expr::CompoundIdentifier(idents) => match idents.as_slice() {
            [table, column] => Ok(Expression::UnresolvedColumn {
                table: Some(table.value.clone()),
                name: column.value.clone(),
            }),
            _ => Err(DBError::NotSupported(format!("column reference {expr}"))),
        },
        Expr::Value(value) => ast_value_to_value(value).map(Expression::Literal),
        Expr::BinaryOp { left, op, right } => Ok(Expression::BinaryOp {
            op: ast_binary_op_to_plan_binary_op(op)?,
            left: Box::new(ast_expr_to_plan_expr(left)?),
            right: Box::new(ast_expr_to_plan_expr(right)?),
        }),
        Expr::UnaryOp { op, expr } => {
            let input = ast_expr_to_plan_expr(expr)?;
            match op {
                UnaryOperator::Plus => Ok(input),
                UnaryOperator::Minus => Ok(Expression::UnaryOp {
                    op: UnaryOp::Neg,
                    input: Box::new(input),
                }),
                UnaryOperator::Not => Ok(Expression::UnaryOp {
                    op: UnaryOp::Not,
                    input: Box::new(input),
                }),
                other => Err(DBError::NotSupported(format!("operator {other}"))),
            }
        }
        Expr::Nested(expr) => ast_expr_to_plan_expr(expr),
        other => Err(DBError::NotSupported(format!("expression {other}"))),
    }
}

fn ast_value_to_value(value: &AstValue) -> DBResult<Value> {
    match value {
        AstValue::Number(n, _) => n
            .parse::<i64>()
            .map(Value::Int64)
            .or_else(|_| n.parse::<f64>().map(Value::Float64))
            .map_err(|_| DBError::ParserError(format!("invalid number: {n}"))),
        AstValue::SingleQuotedString(s) | AstValue::DoubleQuotedString(s) => {
            Ok(Value::String(s.clone()))
        }
        AstValue::Boolean(b) => Ok(Value::Boolean(*b)),
        AstValue::Null => Ok(Value::Null),
        other => Err(DBError::NotSupported(format!("literal {other}"))),
    }
}

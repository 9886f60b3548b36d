use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    context::ExecutionContext,
    row::Row,
    row_iter::{BoxedRowIter, RowIter},
    schema::{Column, Schema},
    tables::MemTable,
    DBError, DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// Table reference as written in the statement, before it is bound to a
/// database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTable {
    database: Option<String>,
    name: String,
    alias: Option<String>,
}

impl UnresolvedTable {
    pub fn new(database: Option<String>, name: impl Into<String>) -> Self {
        UnresolvedTable {
            database,
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl Display for UnresolvedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(db) => write!(f, "UnresolvedTable({db}.{}", self.name)?,
            None => write!(f, "UnresolvedTable({}", self.name)?,
        }
        match &self.alias {
            Some(alias) => write!(f, " AS {alias})"),
            None => write!(f, ")"),
        }
    }
}

impl PlanNode for UnresolvedTable {
    fn resolved(&self) -> bool {
        false
    }

    fn schema(&self) -> Option<Schema> {
        None
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        nillary_with_children(self, children)
    }

    fn row_iter(&self, _ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        Err(DBError::NotResolved(self.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Scan over an in-memory table.
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    database: String,
    table: Arc<MemTable>,
    alias: Option<String>,
}

impl ResolvedTable {
    pub fn new(database: impl Into<String>, table: Arc<MemTable>) -> Self {
        ResolvedTable {
            database: database.into(),
            table,
            alias: None,
        }
    }

    /// Columns of an aliased table are qualified by the alias.
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn database(&self) -> &str {
        self.database.as_ref()
    }

    pub fn table(&self) -> &Arc<MemTable> {
        &self.table
    }
}

impl Display for ResolvedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Table({}.{}", self.database, self.table.name())?;
        match &self.alias {
            Some(alias) => write!(f, " AS {alias})"),
            None => write!(f, ")"),
        }
    }
}

impl PlanNode for ResolvedTable {
    fn resolved(&self) -> bool {
        true
    }

    fn schema(&self) -> Option<Schema> {
        let source = self.alias.as_deref().unwrap_or_else(|| self.table.name());
        let columns = self
            .table
            .schema()
            .columns()
            .iter()
            .map(|c| Column::new(c.name(), c.data_type().clone()).with_source(source))
            .collect();
        Some(Schema::new(columns))
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        nillary_with_children(self, children)
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ctx.check()?;
        Ok(Box::new(TableScanIter {
            ctx: ctx.clone(),
            table: Some(Arc::clone(&self.table)),
            next: 0,
            end: self.table.num_rows()?,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads the table one row at a time. Only the rows present when the scan
/// started are visible.
struct TableScanIter {
    ctx: ExecutionContext,
    /// Released on close.
    table: Option<Arc<MemTable>>,
    next: usize,
    end: usize,
}

impl RowIter for TableScanIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        let Some(table) = &self.table else {
            return Ok(None);
        };
        if self.next >= self.end {
            return Ok(None);
        }
        self.ctx.check()?;
        let row = table.row_at(self.next)?;
        self.next += 1;
        Ok(row)
    }

    fn close(&mut self) -> DBResult<()> {
        self.table = None;
        Ok(())
    }
}

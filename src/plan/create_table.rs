use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    catalog::Catalog,
    context::{ExecutionContext, Warning},
    row_iter::{BoxedRowIter, SideEffectIter},
    schema::Schema,
    DBError, DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// MySQL code of the "table exists" diagnostic.
pub const ERR_TABLE_EXISTS: u16 = 1050;

/// `CREATE TABLE` in the named database, or the session's current one.
#[derive(Debug, Clone)]
pub struct CreateTable {
    catalog: Arc<Catalog>,
    database: Option<String>,
    table_name: String,
    if_not_exists: bool,
    schema: Schema,
}

impl CreateTable {
    pub fn new(
        catalog: Arc<Catalog>,
        database: Option<String>,
        table_name: impl Into<String>,
        if_not_exists: bool,
        schema: Schema,
    ) -> Self {
        CreateTable {
            catalog,
            database,
            table_name: table_name.into(),
            if_not_exists,
            schema,
        }
    }

    pub fn table_schema(&self) -> &Schema {
        &self.schema
    }

    fn create(&self, ctx: &ExecutionContext) -> DBResult<()> {
        let database = self
            .catalog
            .database_or_current(self.database.as_deref(), ctx.session())?;
        match database.create_table(&self.table_name, self.schema.clone()) {
            Err(DBError::TableAlreadyExists(_)) if self.if_not_exists => {
                ctx.warn(Warning::note(
                    ERR_TABLE_EXISTS,
                    format!("Table '{}' already exists", self.table_name),
                ));
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }
}

impl Display for CreateTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let if_not_exists = if self.if_not_exists { " if not exists" } else { "" };
        match &self.database {
            Some(db) => write!(f, "CREATE table{if_not_exists} {db}.{}", self.table_name),
            None => write!(f, "CREATE table{if_not_exists} {}", self.table_name),
        }
    }
}

impl PlanNode for CreateTable {
    fn resolved(&self) -> bool {
        true
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

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ctx.check()?;
        let node = self.clone();
        Ok(Box::new(SideEffectIter::new(ctx, move |ctx: &ExecutionContext| {
            node.create(ctx)
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    catalog::{Catalog, Database},
    context::{ExecutionContext, Warning},
    row_iter::{BoxedRowIter, SideEffectIter},
    schema::Schema,
    DBError, DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// MySQL code of the "database exists" diagnostic.
pub const ERR_DB_CREATE_EXISTS: u16 = 1007;

/// `CREATE DATABASE`. Collation and charset are handed to the new database
/// handle, the node itself does not interpret them.
#[derive(Debug, Clone)]
pub struct CreateDatabase {
    catalog: Arc<Catalog>,
    db_name: String,
    if_not_exists: bool,
    collation: Option<String>,
    charset: Option<String>,
}

impl CreateDatabase {
    pub fn new(
        catalog: Arc<Catalog>,
        db_name: impl Into<String>,
        if_not_exists: bool,
        collation: Option<String>,
        charset: Option<String>,
    ) -> Self {
        CreateDatabase {
            catalog,
            db_name: db_name.into(),
            if_not_exists,
            collation,
            charset,
        }
    }

    pub fn db_name(&self) -> &str {
        self.db_name.as_ref()
    }

    pub fn if_not_exists(&self) -> bool {
        self.if_not_exists
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    fn create(&self, ctx: &ExecutionContext) -> DBResult<()> {
        let exists = self.catalog.has_database(&self.db_name)?;
        if exists && self.if_not_exists {
            ctx.warn(Warning::note(
                ERR_DB_CREATE_EXISTS,
                format!("Can't create database {}; database exists", self.db_name),
            ));
            return Ok(());
        } else if exists {
            return Err(DBError::DatabaseAlreadyExists(self.db_name.clone()));
        }

        let database = Database::with_options(
            self.db_name.clone(),
            self.collation.clone(),
            self.charset.clone(),
        );
        self.catalog.add_database(database)?;
        Ok(())
    }
}

impl Display for CreateDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let if_exists = if self.if_not_exists { " if exists" } else { "" };
        write!(f, "CREATE database{if_exists} {}", self.db_name)
    }
}

impl PlanNode for CreateDatabase {
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

/// `DROP DATABASE`.
///
/// The if-exists flag is carried for display only: dropping always succeeds,
/// whether or not the database was there.
#[derive(Debug, Clone)]
pub struct DropDatabase {
    catalog: Arc<Catalog>,
    db_name: String,
    if_exists: bool,
    collation: Option<String>,
    charset: Option<String>,
}

impl DropDatabase {
    pub fn new(
        catalog: Arc<Catalog>,
        db_name: impl Into<String>,
        if_exists: bool,
        collation: Option<String>,
        charset: Option<String>,
    ) -> Self {
        DropDatabase {
            catalog,
            db_name: db_name.into(),
            if_exists,
            collation,
            charset,
        }
    }

    pub fn db_name(&self) -> &str {
        self.db_name.as_ref()
    }

    pub fn if_exists(&self) -> bool {
        self.if_exists
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }
}

impl Display for DropDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let if_exists = if self.if_exists { " if exists" } else { "" };
        write!(f, "DROP database{if_exists} {}", self.db_name)
    }
}

impl PlanNode for DropDatabase {
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
        let catalog = Arc::clone(&self.catalog);
        let db_name = self.db_name.clone();
        Ok(Box::new(SideEffectIter::new(ctx, move |ctx: &ExecutionContext| {
            catalog.drop_database(&db_name)?;
            // a dropped current database leaves the session without one
            let current = ctx.session().current_database();
            if current.map_or(false, |c| catalog.same_name(&c, &db_name)) {
                ctx.session().set_current_database(None);
            }
            Ok(())
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

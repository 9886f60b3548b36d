use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    catalog::Catalog,
    context::ExecutionContext,
    row_iter::{BoxedRowIter, SideEffectIter},
    schema::Schema,
    DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// `USE db`: makes `db` the session's current database.
#[derive(Debug, Clone)]
pub struct UseDatabase {
    catalog: Arc<Catalog>,
    db_name: String,
}

impl UseDatabase {
    pub fn new(catalog: Arc<Catalog>, db_name: impl Into<String>) -> Self {
        UseDatabase {
            catalog,
            db_name: db_name.into(),
        }
    }

    pub fn db_name(&self) -> &str {
        self.db_name.as_ref()
    }
}

impl Display for UseDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "USE {}", self.db_name)
    }
}

impl PlanNode for UseDatabase {
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
            // fails with DatabaseNotFound
            let database = catalog.database(&db_name)?;
            ctx.session()
                .set_current_database(Some(database.name().to_string()));
            Ok(())
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    catalog::Catalog,
    context::ExecutionContext,
    data_types::DataType,
    row::{Row, Value},
    row_iter::{BoxedRowIter, RowIter},
    schema::{Column, Schema},
    DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// `SHOW DATABASES`: one row per database, sorted by name.
#[derive(Debug, Clone)]
pub struct ShowDatabases {
    catalog: Arc<Catalog>,
}

impl ShowDatabases {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        ShowDatabases { catalog }
    }
}

impl Display for ShowDatabases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShowDatabases")
    }
}

impl PlanNode for ShowDatabases {
    fn resolved(&self) -> bool {
        true
    }

    fn schema(&self) -> Option<Schema> {
        Some(Schema::new(vec![Column::new("Database", DataType::String)]))
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        nillary_with_children(self, children)
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ctx.check()?;
        Ok(Box::new(ShowDatabasesIter {
            catalog: Arc::clone(&self.catalog),
            names: None,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ShowDatabasesIter {
    catalog: Arc<Catalog>,
    /// Snapshot of the names, taken on the first pull.
    names: Option<std::vec::IntoIter<String>>,
}

impl RowIter for ShowDatabasesIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        if self.names.is_none() {
            self.names = Some(self.catalog.all_databases()?.into_iter());
        }
        Ok(self
            .names
            .as_mut()
            .and_then(|names| names.next())
            .map(|name| Row::new(vec![Value::String(name)])))
    }

    fn close(&mut self) -> DBResult<()> {
        self.names = Some(Vec::new().into_iter());
        Ok(())
    }
}

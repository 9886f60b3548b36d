use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    catalog::Catalog,
    context::ExecutionContext,
    row::{Row, Value},
    row_iter::{BoxedRowIter, SideEffectIter},
    schema::Schema,
    DBError, DBResult,
};

use super::{expect_arity, PlanNode, PlanRef};

/// `INSERT INTO table [(columns)] <source>`. Produces no rows; the number of
/// inserted rows is stored in the session variable `row_count`.
#[derive(Debug, Clone)]
pub struct InsertInto {
    catalog: Arc<Catalog>,
    database: Option<String>,
    table_name: String,
    columns: Vec<String>,
    source: PlanRef,
}

impl InsertInto {
    pub fn new(
        catalog: Arc<Catalog>,
        database: Option<String>,
        table_name: impl Into<String>,
        columns: Vec<String>,
        source: PlanRef,
    ) -> Self {
        InsertInto {
            catalog,
            database,
            table_name: table_name.into(),
            columns,
            source,
        }
    }

    /// For every target column, the position of the source field feeding it.
    fn column_mapping(&self, table_schema: &Schema) -> DBResult<Vec<Option<usize>>> {
        if self.columns.is_empty() {
            return Ok((0..table_schema.len()).map(Some).collect());
        }
        let mut mapping = vec![None; table_schema.len()];
        for (source_idx, name) in self.columns.iter().enumerate() {
            let target_idx = table_schema
                .index_of(None, name)?
                .ok_or_else(|| DBError::ColumnNotFound(name.clone()))?;
            if mapping[target_idx].is_some() {
                return Err(DBError::DuplicateColumn(name.clone()));
            }
            mapping[target_idx] = Some(source_idx);
        }
        Ok(mapping)
    }

    fn insert(&self, ctx: &ExecutionContext) -> DBResult<()> {
        let database = self
            .catalog
            .database_or_current(self.database.as_deref(), ctx.session())?;
        let table = database.try_get_table(&self.table_name)?;
        let table_schema = table.schema();
        let mapping = self.column_mapping(table_schema)?;
        let expected_width = if self.columns.is_empty() {
            table_schema.len()
        } else {
            self.columns.len()
        };

        let mut source = self.source.row_iter(ctx)?;
        let mut inserted = 0;
        let result = loop {
            let row = match source.next() {
                Ok(Some(row)) => row,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            if row.num_fields() != expected_width {
                break Err(DBError::InterpretingError(format!(
                    "column count doesn't match value count: expected {expected_width}, got {}",
                    row.num_fields()
                )));
            }
            let fields = row.into_fields();
            let converted = mapping
                .iter()
                .zip(table_schema.columns())
                .map(|(source_idx, column)| match source_idx {
                    Some(idx) => fields[*idx].clone().cast_to(column.data_type()),
                    None => Ok(Value::Null),
                })
                .collect::<DBResult<Vec<_>>>();
            match converted.and_then(|values| table.insert_data(vec![Row::new(values)])) {
                Ok(n) => inserted += n,
                Err(e) => break Err(e),
            }
        };
        match result {
            Ok(()) => source.close()?,
            Err(e) => {
                if let Err(close_err) = source.close() {
                    log::warn!("closing insert source after error failed: {close_err}");
                }
                return Err(e);
            }
        }

        log::debug!("inserted {inserted} rows into {}", self.table_name);
        ctx.session()
            .set_variable("row_count", Value::Int64(inserted as i64));
        Ok(())
    }
}

impl Display for InsertInto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Insert({})", self.table_name)
    }
}

impl PlanNode for InsertInto {
    fn resolved(&self) -> bool {
        self.source.resolved()
    }

    fn schema(&self) -> Option<Schema> {
        None
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![Arc::clone(&self.source)]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        expect_arity::<Self>(1, &children)?;
        let source = children
            .into_iter()
            .next()
            .unwrap_or_else(|| Arc::clone(&self.source));
        Ok(Arc::new(InsertInto {
            source,
            ..self.clone()
        }))
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ctx.check()?;
        let node = self.clone();
        Ok(Box::new(SideEffectIter::new(ctx, move |ctx: &ExecutionContext| {
            node.insert(ctx)
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use std::{any::Any, fmt::Display};

use crate::{
    context::ExecutionContext,
    data_types::DataType,
    row::Row,
    row_iter::{BoxedRowIter, EmptyIter, RowsIter},
    schema::{Column, Schema},
    DBResult,
};

use super::{nillary_with_children, PlanNode, PlanRef};

/// Literal rows, e.g. the `VALUES` list of an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    rows: Vec<Row>,
}

impl Values {
    pub fn new(rows: Vec<Row>) -> Self {
        Values { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl Display for Values {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Values({} rows)", self.rows.len())
    }
}

impl PlanNode for Values {
    fn resolved(&self) -> bool {
        true
    }

    /// Columns are named `column_<n>`, typed after the first non-null value.
    fn schema(&self) -> Option<Schema> {
        let width = self.rows.first().map_or(0, |r| r.num_fields());
        let columns = (0..width)
            .map(|i| {
                let data_type = self
                    .rows
                    .iter()
                    .filter_map(|r| r.fields().get(i))
                    .map(|v| v.data_type())
                    .find(|t| *t != DataType::Null)
                    .unwrap_or(DataType::Null);
                Column::new(format!("column_{i}"), data_type)
            })
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
        if self.rows.is_empty() {
            return Ok(Box::new(EmptyIter));
        }
        Ok(Box::new(RowsIter::new(self.rows.clone())))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

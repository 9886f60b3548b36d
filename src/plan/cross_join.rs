use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    context::ExecutionContext,
    row::Row,
    row_iter::{BoxedRowIter, RowIter},
    schema::Schema,
    DBResult,
};

use super::{ensure_resolved, expect_arity, PlanNode, PlanRef};

/// Cartesian product of two inputs.
#[derive(Debug, Clone)]
pub struct CrossJoin {
    left: PlanRef,
    right: PlanRef,
}

impl CrossJoin {
    pub fn new(left: PlanRef, right: PlanRef) -> Self {
        Self { left, right }
    }
}

impl Display for CrossJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CrossJoin")
    }
}

impl PlanNode for CrossJoin {
    fn resolved(&self) -> bool {
        self.left.resolved() && self.right.resolved()
    }

    fn schema(&self) -> Option<Schema> {
        Some(Schema::concat(&self.left.schema()?, &self.right.schema()?))
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![Arc::clone(&self.left), Arc::clone(&self.right)]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        expect_arity::<Self>(2, &children)?;
        let mut children = children.into_iter();
        let left = children.next().unwrap_or_else(|| Arc::clone(&self.left));
        let right = children.next().unwrap_or_else(|| Arc::clone(&self.right));
        Ok(Arc::new(CrossJoin { left, right }))
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(CrossJoinIter {
            ctx: ctx.clone(),
            left: self.left.row_iter(ctx)?,
            right: Arc::clone(&self.right),
            current_left: None,
            right_iter: None,
            closed: false,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Holds one left row at a time and runs the right side again for each of
/// them, so neither input is buffered.
struct CrossJoinIter {
    ctx: ExecutionContext,
    left: BoxedRowIter,
    right: PlanRef,
    current_left: Option<Row>,
    right_iter: Option<BoxedRowIter>,
    closed: bool,
}

impl RowIter for CrossJoinIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        loop {
            self.ctx.check()?;
            if self.right_iter.is_none() {
                match self.left.next()? {
                    Some(row) => {
                        self.current_left = Some(row);
                        self.right_iter = Some(self.right.row_iter(&self.ctx)?);
                    }
                    None => return Ok(None),
                }
            }

            if let (Some(left_row), Some(right_iter)) =
                (self.current_left.as_ref(), self.right_iter.as_mut())
            {
                if let Some(right_row) = right_iter.next()? {
                    return Ok(Some(Row::concat(left_row, &right_row)));
                }
            }
            self.current_left = None;
            if let Some(mut right_iter) = self.right_iter.take() {
                right_iter.close()?;
            }
        }
    }

    fn close(&mut self) -> DBResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.current_left = None;
        // both inputs are released even when one of them fails to close
        let right = match self.right_iter.take() {
            Some(mut right_iter) => right_iter.close(),
            None => Ok(()),
        };
        let left = self.left.close();
        right.and(left)
    }
}

use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    context::ExecutionContext,
    row::Row,
    row_iter::{BoxedRowIter, RowIter},
    schema::Schema,
    DBResult,
};

use super::{ensure_resolved, expect_arity, PlanNode, PlanRef};

/// `LIMIT`/`OFFSET`. `limit == None` keeps every row after the offset.
#[derive(Debug, Clone)]
pub struct Limit {
    offset: usize,
    limit: Option<usize>,
    child: PlanRef,
}

impl Limit {
    pub fn new(offset: usize, limit: Option<usize>, child: PlanRef) -> Self {
        Self {
            offset,
            limit,
            child,
        }
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "Limit({limit}, offset {})", self.offset),
            None => write!(f, "Limit(all, offset {})", self.offset),
        }
    }
}

impl PlanNode for Limit {
    fn resolved(&self) -> bool {
        self.child.resolved()
    }

    fn schema(&self) -> Option<Schema> {
        self.child.schema()
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![Arc::clone(&self.child)]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        expect_arity::<Self>(1, &children)?;
        let child = children.into_iter().next();
        Ok(Arc::new(Limit {
            offset: self.offset,
            limit: self.limit,
            child: child.unwrap_or_else(|| Arc::clone(&self.child)),
        }))
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(LimitIter {
            offset: self.offset,
            limit: self.limit,
            child: self.child.row_iter(ctx)?,
            pos: 0,
            closed: false,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct LimitIter {
    offset: usize,
    limit: Option<usize>,
    child: BoxedRowIter,
    pos: usize,
    closed: bool,
}

impl LimitIter {
    fn exhausted(&self) -> bool {
        self.limit
            .map_or(false, |limit| self.pos >= self.offset.saturating_add(limit))
    }
}

impl RowIter for LimitIter {
    /// Stops pulling from the child as soon as the limit is reached.
    fn next(&mut self) -> DBResult<Option<Row>> {
        while !self.exhausted() {
            let Some(row) = self.child.next()? else {
                return Ok(None);
            };
            self.pos += 1;
            if self.pos > self.offset {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> DBResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close()
    }
}

use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    context::ExecutionContext,
    expressions::Expression,
    interpreter::Interpreter,
    row::Row,
    row_iter::{BoxedRowIter, RowIter},
    schema::Schema,
    DBResult,
};

use super::{ensure_resolved, expect_arity, PlanNode, PlanRef};

#[derive(Debug, Clone)]
pub struct Filter {
    predicate: Expression,
    child: PlanRef,
}

impl Filter {
    pub fn new(predicate: Expression, child: PlanRef) -> Self {
        Self { predicate, child }
    }

    pub fn predicate(&self) -> &Expression {
        &self.predicate
    }

    pub fn child(&self) -> &PlanRef {
        &self.child
    }

    pub fn with_predicate(&self, predicate: Expression) -> Self {
        Self {
            predicate,
            child: Arc::clone(&self.child),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.predicate)
    }
}

impl PlanNode for Filter {
    fn resolved(&self) -> bool {
        self.predicate.resolved() && self.child.resolved()
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
        Ok(Arc::new(Filter {
            predicate: self.predicate.clone(),
            child: child.unwrap_or_else(|| Arc::clone(&self.child)),
        }))
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(FilterIter {
            predicate: self.predicate.clone(),
            child: self.child.row_iter(ctx)?,
            closed: false,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pass-through per row, nothing is buffered.
struct FilterIter {
    predicate: Expression,
    child: BoxedRowIter,
    closed: bool,
}

impl RowIter for FilterIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        while let Some(row) = self.child.next()? {
            if Interpreter::eval(&self.predicate, &row)?.as_bool()? {
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

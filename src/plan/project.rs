use std::{any::Any, fmt::Display, sync::Arc};

use crate::{
    context::ExecutionContext,
    expressions::Expression,
    interpreter::Interpreter,
    row::Row,
    row_iter::{BoxedRowIter, RowIter},
    schema::{Column, Schema},
    DBResult,
};

use super::{ensure_resolved, expect_arity, PlanNode, PlanRef};

#[derive(Debug, Clone)]
pub struct Project {
    projections: Vec<Expression>,
    child: PlanRef,
}

impl Project {
    pub fn new(projections: Vec<Expression>, child: PlanRef) -> Self {
        Self { projections, child }
    }

    pub fn projections(&self) -> &[Expression] {
        &self.projections
    }

    pub fn child(&self) -> &PlanRef {
        &self.child
    }

    pub fn with_projections(&self, projections: Vec<Expression>) -> Self {
        Self {
            projections,
            child: Arc::clone(&self.child),
        }
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let projections = self
            .projections
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Project({projections})")
    }
}

impl PlanNode for Project {
    fn resolved(&self) -> bool {
        self.projections.iter().all(|p| p.resolved()) && self.child.resolved()
    }

    fn schema(&self) -> Option<Schema> {
        let columns = self
            .projections
            .iter()
            .map(|p| Column::new(p.to_string(), p.data_type()))
            .collect();
        Some(Schema::new(columns))
    }

    fn children(&self) -> Vec<PlanRef> {
        vec![Arc::clone(&self.child)]
    }

    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef> {
        expect_arity::<Self>(1, &children)?;
        let child = children.into_iter().next();
        Ok(Arc::new(Project {
            projections: self.projections.clone(),
            child: child.unwrap_or_else(|| Arc::clone(&self.child)),
        }))
    }

    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter> {
        ensure_resolved(self)?;
        Ok(Box::new(ProjectIter {
            projections: self.projections.clone(),
            child: self.child.row_iter(ctx)?,
            closed: false,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ProjectIter {
    projections: Vec<Expression>,
    child: BoxedRowIter,
    closed: bool,
}

impl RowIter for ProjectIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        match self.child.next()? {
            Some(row) => {
                let fields = self
                    .projections
                    .iter()
                    .map(|p| Interpreter::eval(p, &row))
                    .collect::<DBResult<Vec<_>>>()?;
                Ok(Some(Row::new(fields)))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) -> DBResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close()
    }
}

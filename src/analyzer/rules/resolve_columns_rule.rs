use std::sync::Arc;

use crate::{
    analyzer::AnalyzerContext,
    expressions::Expression,
    plan::{transform_up, Filter, PlanRef, Project},
    schema::Schema,
    DBError, DBResult,
};

use super::Rule;

/// Binds column names in filters and projections to positions in the
/// child's output, once the child itself is resolved.
pub struct ResolveColumnsRule {}

impl Rule for ResolveColumnsRule {
    fn name(&self) -> &'static str {
        "resolve_columns"
    }

    fn apply(&self, node: &PlanRef, _context: &AnalyzerContext) -> DBResult<Option<PlanRef>> {
        transform_up(node, &mut Self::resolve_node)
    }
}

impl ResolveColumnsRule {
    fn resolve_node(node: &PlanRef) -> DBResult<Option<PlanRef>> {
        if let Some(filter) = node.as_any().downcast_ref::<Filter>() {
            let Some(schema) = Self::bindable_schema(filter.child()) else {
                return Ok(None);
            };
            return Ok(Self::resolve_expression(filter.predicate(), &schema)?
                .map(|predicate| Arc::new(filter.with_predicate(predicate)) as PlanRef));
        }

        if let Some(project) = node.as_any().downcast_ref::<Project>() {
            let Some(schema) = Self::bindable_schema(project.child()) else {
                return Ok(None);
            };
            let mut changed = false;
            let mut projections = Vec::with_capacity(project.projections().len());
            for expr in project.projections() {
                match Self::resolve_expression(expr, &schema)? {
                    Some(new_expr) => {
                        changed = true;
                        projections.push(new_expr);
                    }
                    None => projections.push(expr.clone()),
                }
            }
            return Ok(changed
                .then(|| Arc::new(project.with_projections(projections)) as PlanRef));
        }

        Ok(None)
    }

    fn bindable_schema(child: &PlanRef) -> Option<Schema> {
        if child.resolved() {
            child.schema()
        } else {
            None
        }
    }

    pub(crate) fn resolve_expression(
        expr: &Expression,
        schema: &Schema,
    ) -> DBResult<Option<Expression>> {
        if expr.resolved() {
            return Ok(None);
        }
        expr.transform_bottom_up(&mut |e: &Expression| match e {
            Expression::UnresolvedColumn { table, name } => {
                let index = schema
                    .index_of(table.as_deref(), name)?
                    .ok_or_else(|| DBError::ColumnNotFound(e.to_string()))?;
                let data_type = schema
                    .column_at(index)
                    .map(|c| c.data_type().clone())
                    .ok_or_else(|| DBError::ColumnNotFound(e.to_string()))?;
                Ok(Some(Expression::Column {
                    name: name.clone(),
                    index,
                    data_type,
                }))
            }
            _ => Ok(None),
        })
    }
}

use std::sync::Arc;

use crate::{
    analyzer::AnalyzerContext,
    plan::{transform_up, PlanRef, ResolvedTable, UnresolvedTable},
    DBResult,
};

use super::Rule;

/// Binds table references to the in-memory tables of the catalog, using the
/// session's current database for unqualified names.
pub struct ResolveTablesRule {}

impl Rule for ResolveTablesRule {
    fn name(&self) -> &'static str {
        "resolve_tables"
    }

    fn apply(&self, node: &PlanRef, context: &AnalyzerContext) -> DBResult<Option<PlanRef>> {
        transform_up(node, &mut |n: &PlanRef| Self::resolve_table(n, context))
    }
}

impl ResolveTablesRule {
    fn resolve_table(node: &PlanRef, context: &AnalyzerContext) -> DBResult<Option<PlanRef>> {
        let Some(unresolved) = node.as_any().downcast_ref::<UnresolvedTable>() else {
            return Ok(None);
        };
        let database = context
            .catalog()
            .database_or_current(unresolved.database(), context.session())?;
        let table = database.try_get_table(unresolved.name())?;
        let resolved = ResolvedTable::new(database.name(), table)
            .with_alias(unresolved.alias().map(str::to_string));
        Ok(Some(Arc::new(resolved)))
    }
}

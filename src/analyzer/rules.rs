use crate::{analyzer::AnalyzerContext, plan::PlanRef, DBResult};
mod resolve_columns_rule;
mod resolve_tables_rule;

pub use resolve_columns_rule::ResolveColumnsRule;
pub use resolve_tables_rule::ResolveTablesRule;

/// Analyzer works by applying rules to the plan tree.
/// A rule returns `None` when it leaves the tree unchanged.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, node: &PlanRef, context: &AnalyzerContext) -> DBResult<Option<PlanRef>>;
}

pub(crate) fn get_all_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(ResolveTablesRule {}), Box::new(ResolveColumnsRule {})]
}

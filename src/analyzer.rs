use std::sync::Arc;

use crate::{
    catalog::Catalog,
    context::Session,
    plan::{describe_tree, PlanRef},
    DBResult,
};

use self::rules::{get_all_rules, Rule};
pub mod rules;

/// Upper bound on passes over the rule list, in case rules keep rewriting
/// each other's output.
const MAX_ITERATIONS: usize = 16;

/// What the rules may consult while binding names.
pub struct AnalyzerContext {
    catalog: Arc<Catalog>,
    session: Arc<Session>,
}

impl AnalyzerContext {
    pub fn new(catalog: Arc<Catalog>, session: Arc<Session>) -> Self {
        AnalyzerContext { catalog, session }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

/// Runs the resolution rules over a plan tree until none of them changes it.
pub struct Analyzer {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            rules: get_all_rules(),
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Analyzer { rules }
    }

    pub fn analyze(&self, plan: PlanRef, context: &AnalyzerContext) -> DBResult<PlanRef> {
        let mut node_under_plan = plan;
        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for rule in self.rules.iter() {
                if let Some(new_node) = rule.apply(&node_under_plan, context)? {
                    log::debug!("rule {} rewrote plan", rule.name());
                    node_under_plan = new_node;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        log::debug!("analyzed plan:\n{}", describe_tree(node_under_plan.as_ref()));
        Ok(node_under_plan)
    }
}

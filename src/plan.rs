mod create_table;
mod cross_join;
mod ddl;
mod filter;
mod insert;
mod limit;
mod project;
mod show_databases;
mod table;
mod use_database;
mod values;

use std::{
    any::Any,
    fmt::{Debug, Display, Write},
    sync::Arc,
};

pub use create_table::{CreateTable, ERR_TABLE_EXISTS};
pub use cross_join::CrossJoin;
pub use ddl::{CreateDatabase, DropDatabase, ERR_DB_CREATE_EXISTS};
pub use filter::Filter;
pub use insert::InsertInto;
pub use limit::Limit;
pub use project::Project;
pub use show_databases::ShowDatabases;
pub use table::{ResolvedTable, UnresolvedTable};
pub use use_database::UseDatabase;
pub use values::Values;

use crate::{context::ExecutionContext, row_iter::BoxedRowIter, schema::Schema, DBError, DBResult};

pub type PlanRef = Arc<dyn PlanNode>;

/// Contract shared by every operator of a plan tree.
///
/// Nodes are immutable. Rewriting a tree goes through [`PlanNode::with_children`],
/// which builds a new node, so untouched sub-trees can be shared between the
/// old and the new tree. `Display` renders the node for plan output.
pub trait PlanNode: Debug + Display + Send + Sync {
    /// Whether this node and all of its children are bound well enough to run.
    fn resolved(&self) -> bool;

    /// Columns produced by the node's rows, `None` when it produces no rows.
    fn schema(&self) -> Option<Schema>;

    fn children(&self) -> Vec<PlanRef>;

    /// Copy of this node with its children replaced. Fails with
    /// `ArityMismatch` when the number of children is wrong for the node.
    fn with_children(&self, children: Vec<PlanRef>) -> DBResult<PlanRef>;

    /// Lazy row source for this node. Only valid on resolved nodes.
    fn row_iter(&self, ctx: &ExecutionContext) -> DBResult<BoxedRowIter>;

    fn as_any(&self) -> &dyn Any;
}

pub(crate) fn node_name<N>() -> &'static str {
    let full = std::any::type_name::<N>();
    full.rsplit("::").next().unwrap_or(full)
}

pub(crate) fn expect_arity<N>(expected: usize, children: &[PlanRef]) -> DBResult<()> {
    if children.len() != expected {
        return Err(DBError::ArityMismatch {
            node: node_name::<N>().to_string(),
            expected,
            actual: children.len(),
        });
    }
    Ok(())
}

/// `with_children` for leaf nodes: only an empty child list is accepted.
pub fn nillary_with_children<N>(node: &N, children: Vec<PlanRef>) -> DBResult<PlanRef>
where
    N: PlanNode + Clone + 'static,
{
    expect_arity::<N>(0, &children)?;
    Ok(Arc::new(node.clone()))
}

pub fn children_resolved(children: &[PlanRef]) -> bool {
    children.iter().all(|c| c.resolved())
}

/// Fails with `NotResolved` unless the node is resolved.
pub(crate) fn ensure_resolved(node: &dyn PlanNode) -> DBResult<()> {
    if node.resolved() {
        Ok(())
    } else {
        Err(DBError::NotResolved(node.to_string()))
    }
}

/// Rewrites the tree bottom-up with `f`. Only the path from the root to the
/// changed nodes is rebuilt; returns `None` when nothing changed.
pub fn transform_up<F>(node: &PlanRef, f: &mut F) -> DBResult<Option<PlanRef>>
where
    F: FnMut(&PlanRef) -> DBResult<Option<PlanRef>>,
{
    let children = node.children();
    let mut changed = false;
    let mut new_children = Vec::with_capacity(children.len());
    for child in children {
        match transform_up(&child, f)? {
            Some(new_child) => {
                changed = true;
                new_children.push(new_child);
            }
            None => new_children.push(child),
        }
    }

    if changed {
        let rebuilt = node.with_children(new_children)?;
        Ok(Some(f(&rebuilt)?.unwrap_or(rebuilt)))
    } else {
        f(node)
    }
}

/// Indented rendering of the whole tree, one node per line.
pub fn describe_tree(node: &dyn PlanNode) -> String {
    fn walk(node: &dyn PlanNode, depth: usize, out: &mut String) {
        let _ = writeln!(out, "{:indent$}{}", "", node, indent = depth * 2);
        for child in node.children() {
            walk(child.as_ref(), depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(node, 0, &mut out);
    out
}

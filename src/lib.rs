pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod context;
mod errors;
pub mod expressions;
pub mod interpreter;
pub mod parser;
pub mod plan;
pub mod row_iter;
pub mod schema;
pub mod tables;
use analyzer::{Analyzer, AnalyzerContext};
use catalog::{Catalog, Database};
use config::EngineConfig;
use context::{ExecutionContext, Session};
pub use errors::*;
use plan::{describe_tree, PlanRef};
use row_iter::collect_rows;
use schema::Schema;

pub mod data_types;
pub mod row;

use std::{sync::Arc, time::Duration};

use serde::Serialize;

use crate::row::Row;

/// Entry point of the engine: owns the catalog shared by all sessions and
/// runs statements against it.
pub struct PlanDB {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    analyzer: Analyzer,
    default_session: Arc<Session>,
}

impl Default for PlanDB {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ResultSet {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn empty() -> Self {
        ResultSet {
            schema: Schema::empty(),
            rows: vec![],
        }
    }
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        ResultSet { schema, rows }
    }
}

impl PlanDB {
    pub fn new() -> Self {
        let catalog = Arc::new(Catalog::new());
        PlanDB {
            config: EngineConfig::default(),
            catalog,
            analyzer: Analyzer::new(),
            default_session: Arc::new(Session::new()),
        }
    }

    /// Engine built from `config`; the default database, when configured, is
    /// created up front and selected in every new session.
    pub fn with_config(config: EngineConfig) -> DBResult<Self> {
        let catalog = Arc::new(Catalog::with_case_sensitivity(config.case_sensitive_names));
        if let Some(name) = &config.default_database {
            if !catalog.has_database(name)? {
                catalog.add_database(Database::new(name.clone()))?;
            }
        }
        let db = PlanDB {
            default_session: Arc::new(Session::new()),
            config,
            catalog,
            analyzer: Analyzer::new(),
        };
        db.default_session
            .set_current_database(db.config.default_database.clone());
        Ok(db)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Session used by [`PlanDB::execute`].
    pub fn default_session(&self) -> &Arc<Session> {
        &self.default_session
    }

    pub fn new_session(&self) -> Arc<Session> {
        let session = Session::new();
        session.set_current_database(self.config.default_database.clone());
        Arc::new(session)
    }

    /// Execution context for one statement of `session`, carrying the
    /// configured statement timeout.
    pub fn context_for(&self, session: &Arc<Session>) -> ExecutionContext {
        let ctx = ExecutionContext::new(Arc::clone(session));
        match self.config.statement_timeout_ms {
            Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
            None => ctx,
        }
    }

    pub fn execute(&self, query: &str) -> DBResult<ResultSet> {
        self.execute_in_session(&self.default_session, query)
    }

    pub fn execute_in_session(&self, session: &Arc<Session>, query: &str) -> DBResult<ResultSet> {
        let ctx = self.context_for(session);
        self.execute_with_context(&ctx, query)
    }

    /// Runs every statement in `query` in order and returns the result of the
    /// last one. Execution stops at the first failing statement.
    pub fn execute_with_context(&self, ctx: &ExecutionContext, query: &str) -> DBResult<ResultSet> {
        log::debug!("session {} query: {}", ctx.session().id(), query);
        let plans = parser::build_plans(query, &self.catalog)?;
        if plans.is_empty() {
            return Err(DBError::ParserError("empty query".to_string()));
        }
        let mut result = ResultSet::empty();
        for plan in plans {
            ctx.session().clear_warnings();
            let plan = self.analyze(ctx.session(), plan)?;
            result = self.execute_plan(ctx, &plan)?;
        }
        Ok(result)
    }

    pub fn analyze(&self, session: &Arc<Session>, plan: PlanRef) -> DBResult<PlanRef> {
        let context = AnalyzerContext::new(Arc::clone(&self.catalog), Arc::clone(session));
        self.analyzer.analyze(plan, &context)
    }

    /// Drives a resolved plan to completion and collects its rows.
    pub fn execute_plan(&self, ctx: &ExecutionContext, plan: &PlanRef) -> DBResult<ResultSet> {
        if !plan.resolved() {
            return Err(DBError::NotResolved(
                describe_tree(plan.as_ref()).trim_end().to_string(),
            ));
        }
        let iter = plan.row_iter(ctx)?;
        let rows = collect_rows(iter)?;
        log::debug!("{} returned {} rows", plan, rows.len());
        Ok(ResultSet::new(plan.schema().unwrap_or_default(), rows))
    }
}

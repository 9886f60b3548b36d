use serde::{Deserialize, Serialize};

use crate::{DBError, DBResult};

/// Engine settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether database names are compared case-sensitively.
    pub case_sensitive_names: bool,
    /// Database created at start-up and selected for new sessions.
    pub default_database: Option<String>,
    /// Deadline applied to every statement's execution context.
    pub statement_timeout_ms: Option<u64>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> DBResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DBError::Unknown(format!("invalid engine config: {e}")))
    }
}

use std::{
    collections::HashMap,
    fmt::Display,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, PoisonError, RwLock,
    },
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::{row::Value, DBError, DBResult};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningLevel {
    Note,
    Warning,
    Error,
}

impl Display for WarningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Non-fatal diagnostic delivered to the issuing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub level: WarningLevel,
    pub code: u16,
    pub message: String,
}

impl Warning {
    pub fn note(code: u16, message: impl Into<String>) -> Self {
        Warning {
            level: WarningLevel::Note,
            code,
            message: message.into(),
        }
    }
}

/// State of one client session: selected database, user variables and the
/// warnings raised by the last statement.
///
/// The locks only guard plain values, so a poisoned lock is recovered
/// instead of reported.
#[derive(Debug)]
pub struct Session {
    id: u64,
    current_database: RwLock<Option<String>>,
    variables: RwLock<HashMap<String, Value>>,
    warnings: Mutex<Vec<Warning>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            current_database: RwLock::new(None),
            variables: RwLock::new(HashMap::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn current_database(&self) -> Option<String> {
        self.current_database
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_current_database(&self, name: Option<String>) {
        *self
            .current_database
            .write()
            .unwrap_or_else(PoisonError::into_inner) = name;
    }

    pub fn set_variable(&self, name: &str, value: Value) {
        self.variables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_lowercase(), value);
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name.to_lowercase())
            .cloned()
    }

    pub fn warn(&self, warning: Warning) {
        log::debug!(
            "session {}: {} {} {}",
            self.id,
            warning.level,
            warning.code,
            warning.message
        );
        self.lock_warnings().push(warning);
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.lock_warnings().clone()
    }

    pub fn warning_count(&self) -> usize {
        self.lock_warnings().len()
    }

    pub fn clear_warnings(&self) {
        self.lock_warnings().clear();
    }

    fn lock_warnings(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared flag used to cancel a running statement from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-statement handle passed to every plan node during execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    session: Arc<Session>,
    cancellation: CancellationHandle,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    pub fn new(session: Arc<Session>) -> Self {
        ExecutionContext {
            session,
            cancellation: CancellationHandle::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationHandle) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn cancellation(&self) -> &CancellationHandle {
        &self.cancellation
    }

    pub fn warn(&self, warning: Warning) {
        self.session.warn(warning)
    }

    /// Errors once the statement was cancelled or ran past its deadline.
    pub fn check(&self) -> DBResult<()> {
        if self.cancellation.is_cancelled() {
            return Err(DBError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DBError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

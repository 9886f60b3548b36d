use sqlparser::parser::ParserError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DBError {
    #[error("parser error: {0}")]
    ParserError(String),
    /// A `with_children` call got the wrong number of children.
    #[error("{node}: invalid number of children, expected {expected} but got {actual}")]
    ArityMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },
    #[error("can't create database {0}; database exists")]
    DatabaseAlreadyExists(String),
    #[error("database not found: {0}")]
    DatabaseNotFound(String),
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("Column '{0}' in field list is ambiguous")]
    AmbiguousColumn(String),
    #[error("Column '{0}' specified twice")]
    DuplicateColumn(String),
    #[error("no database selected")]
    NoDatabaseSelected,
    #[error("plan is not resolved: {0}")]
    NotResolved(String),
    #[error("interpreting error: {0}")]
    InterpretingError(String),
    #[error("query was cancelled")]
    Cancelled,
    #[error("query exceeded its deadline")]
    DeadlineExceeded,
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("{0}")]
    Unknown(String),
}

pub type DBResult<T> = Result<T, DBError>;

impl From<ParserError> for DBError {
    fn from(e: ParserError) -> Self {
        DBError::ParserError(e.to_string())
    }
}

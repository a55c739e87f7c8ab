//! Error types for statement execution.

use fragsql_core::{ConstructionError, SqlValue};
use thiserror::Error;

/// A failure reported by the execution collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The connection is gone or unusable. The session retries once after
    /// reconnecting.
    #[error("connection failure: {0}")]
    Connection(String),

    /// The statement itself failed (syntax, constraint, type).
    #[error("statement failure: {0}")]
    Statement(String),
}

impl BackendError {
    /// True when this failure warrants a reconnect.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(e.to_string()),
            other => Self::Statement(other.to_string()),
        }
    }
}

/// Result type for collaborator calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors raised by a database session.
#[derive(Debug, Error)]
pub enum DbError {
    /// The statement could not be built; nothing was executed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// The collaborator rejected the statement.
    #[error("{source}\nwhile executing: {sql}")]
    Execution {
        /// Statement text.
        sql: String,
        /// Bound parameters.
        params: Vec<SqlValue>,
        /// Underlying failure.
        #[source]
        source: BackendError,
    },

    /// No collaborator or dialect exists for the driver.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// Opening the connection failed.
    #[error("connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// A result column the caller asked for is missing.
    #[error("no such column in result: {0}")]
    MissingColumn(String),

    /// A result value had an unexpected type.
    #[error("expected {expected}, got {found}")]
    UnexpectedValue {
        /// What was expected.
        expected: &'static str,
        /// What came back.
        found: String,
    },
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, DbError>;

//! The execution collaborator contract.

use std::future::Future;

use fragsql_core::SqlValue;

use crate::error::BackendResult;
use crate::result::QueryResult;

/// Something that runs finished statements against a database.
///
/// Parameters bind positionally to `?` placeholders, left to right, one to
/// one. Implementations report a lost connection as
/// [`BackendError::Connection`](crate::BackendError::Connection) so the
/// session can reconnect and retry once.
pub trait Executor: Send + Sync {
    /// Driver name, used to pick the quoting policy.
    fn driver(&self) -> &str;

    /// Runs one statement.
    fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = BackendResult<QueryResult>> + Send;

    /// Quotes `literal` with the database's native escaping.
    fn quote_literal(&self, literal: &str) -> impl Future<Output = BackendResult<String>> + Send;

    /// Drops the current connection and opens a new one.
    fn reconnect(&self) -> impl Future<Output = BackendResult<()>> + Send;
}

//! A database session: builds statements, runs them through an
//! [`Executor`] and adapts the results.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use fragsql_core::{
    Combinator, Dialect, Fragment, FragmentInput, QueryBuilder, SqlValue, Statement,
};
use tracing::{debug, trace, warn};

use crate::cache::LiteralCache;
use crate::config::{dialect_for, ConnectionInfo, DbOptions};
use crate::error::{DbError, Result};
use crate::executor::Executor;
use crate::result::{QueryResult, Row};
use crate::sqlite::SqliteExecutor;

/// A session over one execution collaborator.
///
/// The session owns the quoting policy for its driver, the quoted-literal
/// cache and the last statement run. Statements that fail to build never
/// reach the executor.
#[derive(Debug)]
pub struct Db<E> {
    executor: E,
    dialect: Arc<dyn Dialect>,
    quotes: Mutex<LiteralCache>,
    last: Mutex<Option<Statement>>,
}

impl Db<SqliteExecutor> {
    /// Connects to a SQLite database, trying backups in order.
    pub async fn connect(info: ConnectionInfo, options: DbOptions) -> Result<Self> {
        if info.driver != "sqlite" {
            return Err(DbError::UnsupportedDriver(info.driver));
        }
        let executor = SqliteExecutor::connect(info, &options).await?;
        Self::new(executor, &options)
    }
}

impl<E: Executor> Db<E> {
    /// Creates a session over `executor`.
    pub fn new(executor: E, options: &DbOptions) -> Result<Self> {
        let dialect = dialect_for(executor.driver(), options.sql_mode)?;
        Ok(Self {
            executor,
            dialect,
            quotes: Mutex::new(LiteralCache::new(
                options.quote_cache_capacity,
                options.quote_cache_max_len,
            )),
            last: Mutex::new(None),
        })
    }

    /// Returns the quoting policy.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the executor.
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns an empty builder using this session's dialect.
    #[must_use]
    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::with_dialect(Arc::clone(&self.dialect))
    }

    /// Returns a builder targeting `table`.
    #[must_use]
    pub fn table(&self, table: &str) -> QueryBuilder {
        self.builder().from(table)
    }

    /// Returns a builder carrying raw SQL, run as-is.
    pub fn sql(&self, input: impl Into<FragmentInput>) -> Result<QueryBuilder> {
        let fragment = Fragment::conform(input, Combinator::Newline)?;
        Ok(self.builder().where_clause(fragment))
    }

    /// Returns the last statement handed to the executor.
    #[must_use]
    pub fn last_statement(&self) -> Option<Statement> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ==================== EXECUTION ====================

    /// Builds and runs `builder`.
    pub async fn query(&self, builder: &QueryBuilder) -> Result<QueryResult> {
        let statement = builder.build()?;
        self.run(statement).await
    }

    /// Runs raw SQL.
    pub async fn exec(&self, input: impl Into<FragmentInput>) -> Result<QueryResult> {
        let fragment = Fragment::conform(input, Combinator::Newline)?;
        self.run(Statement::raw(fragment)).await
    }

    /// Runs a finished statement. A lost connection is reconnected and the
    /// statement retried exactly once.
    pub async fn run(&self, statement: Statement) -> Result<QueryResult> {
        let expected = statement.fragment().placeholder_count();
        if expected != statement.params().len() {
            warn!(
                placeholders = expected,
                params = statement.params().len(),
                sql = %statement.sql(),
                "Placeholder count does not match parameter count"
            );
        }
        debug!(sql = %statement.sql(), params = statement.params().len(), "Executing SQL");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(statement.clone());

        let outcome = match self
            .executor
            .execute(statement.sql(), statement.params())
            .await
        {
            Err(e) if e.is_connection() => {
                warn!(error = %e, "Connection lost, reconnecting and retrying once");
                match self.executor.reconnect().await {
                    Ok(()) => {
                        self.executor
                            .execute(statement.sql(), statement.params())
                            .await
                    }
                    Err(reconnect_error) => Err(reconnect_error),
                }
            }
            other => other,
        };

        outcome.map_err(|source| {
            let (sql, params) = statement.into_parts();
            DbError::Execution {
                sql,
                params,
                source,
            }
        })
    }

    // ==================== RESULT CONVENIENCES ====================

    /// Fetches the first row.
    pub async fn row(&self, builder: &QueryBuilder) -> Result<Option<Row>> {
        Ok(self.query(&single_row(builder)).await?.fetch_row())
    }

    /// Fetches the first row as an ordered value list.
    pub async fn numeric(&self, builder: &QueryBuilder) -> Result<Option<Vec<SqlValue>>> {
        Ok(self.query(&single_row(builder)).await?.fetch_values())
    }

    /// Fetches every row.
    pub async fn rows(&self, builder: &QueryBuilder) -> Result<Vec<Row>> {
        Ok(self.query(builder).await?.fetch_all())
    }

    /// Fetches every row as ordered value lists.
    pub async fn numerics(&self, builder: &QueryBuilder) -> Result<Vec<Vec<SqlValue>>> {
        Ok(self.query(builder).await?.fetch_all_values())
    }

    /// Fetches the first column of the first row.
    pub async fn value(&self, builder: &QueryBuilder) -> Result<Option<SqlValue>> {
        Ok(self
            .numeric(builder)
            .await?
            .and_then(|values| values.into_iter().next()))
    }

    /// Fetches the first column of every row.
    pub async fn column(&self, builder: &QueryBuilder) -> Result<Vec<SqlValue>> {
        Ok(self.query(builder).await?.fetch_column(0))
    }

    /// True when the query matches at least one row.
    pub async fn exists(&self, builder: &QueryBuilder) -> Result<bool> {
        let probe = if builder.targets_table() {
            builder.clone().select("1")
        } else {
            builder.clone()
        };
        Ok(self.row(&probe).await?.is_some())
    }

    /// Fetches every row keyed by the text of its `key` column. Later rows
    /// win on duplicate keys.
    pub async fn key_to_record(
        &self,
        builder: &QueryBuilder,
        key: &str,
    ) -> Result<HashMap<String, Row>> {
        let rows = self.rows(builder).await?;
        rows.into_iter()
            .map(|row| {
                let k = row
                    .get(key)
                    .ok_or_else(|| DbError::MissingColumn(key.to_owned()))?
                    .to_text();
                Ok((k, row))
            })
            .collect()
    }

    /// Maps the text of each row's `key` column to its `column` value.
    pub async fn key_to_column(
        &self,
        builder: &QueryBuilder,
        key: &str,
        column: &str,
    ) -> Result<HashMap<String, SqlValue>> {
        let mut result = self.query(builder).await?;
        if result.remaining() == 0 {
            return Ok(HashMap::new());
        }
        let key_index = result
            .column_index(key)
            .ok_or_else(|| DbError::MissingColumn(key.to_owned()))?;
        let value_index = result
            .column_index(column)
            .ok_or_else(|| DbError::MissingColumn(column.to_owned()))?;
        Ok(result
            .fetch_all_values()
            .into_iter()
            .map(|mut values| {
                let value = std::mem::replace(&mut values[value_index], SqlValue::Null);
                (values[key_index].to_text(), value)
            })
            .collect())
    }

    /// Counts the rows the query matches.
    pub async fn count(&self, builder: &QueryBuilder) -> Result<i64> {
        match self.value(&builder.clone().select("COUNT(*)")).await? {
            Some(SqlValue::Int(n)) => Ok(n),
            Some(other) => Err(DbError::UnexpectedValue {
                expected: "integer count",
                found: other.to_sql_inline(),
            }),
            None => Ok(0),
        }
    }

    /// Runs an INSERT and returns the last inserted identity.
    pub async fn insert(&self, builder: &QueryBuilder) -> Result<Option<i64>> {
        Ok(self.query(builder).await?.last_insert_id())
    }

    /// Runs an UPDATE and returns the number of changed rows.
    pub async fn update(&self, builder: &QueryBuilder) -> Result<u64> {
        Ok(self.query(builder).await?.rows_affected())
    }

    /// Runs a DELETE and returns the number of removed rows.
    pub async fn delete(&self, builder: &QueryBuilder) -> Result<u64> {
        Ok(self.query(builder).await?.rows_affected())
    }

    // ==================== QUOTING ====================

    /// Quotes a value as a SQL literal.
    ///
    /// Numbers and NULL are rendered directly, as are booleans and blobs.
    /// Text goes through the executor's native escaping; short results are
    /// cached per session.
    pub async fn quote(&self, value: &SqlValue) -> Result<String> {
        if value.is_numeric() || value.is_null() {
            return Ok(value.to_sql_inline());
        }
        let SqlValue::Text(text) = value else {
            return Ok(value.to_sql_inline());
        };
        {
            let cache = self.quotes.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(quoted) = cache.get(text) {
                trace!(literal = %text, "Quote cache hit");
                return Ok(quoted.to_owned());
            }
        }
        let quoted = self
            .executor
            .quote_literal(text)
            .await
            .map_err(|source| DbError::Execution {
                sql: String::from("quote literal"),
                params: vec![value.clone()],
                source,
            })?;
        self.quotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.clone(), quoted.clone());
        Ok(quoted)
    }
}

/// Adds `LIMIT 1` to table queries that have no limit.
fn single_row(builder: &QueryBuilder) -> QueryBuilder {
    if builder.targets_table() && !builder.has_limit() {
        builder.clone().limit(1)
    } else {
        builder.clone()
    }
}

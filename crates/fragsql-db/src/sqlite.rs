//! SQLite execution via sqlx.

use std::sync::{PoisonError, RwLock};

use fragsql_core::SqlValue;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, warn};

use crate::config::{ConnectionInfo, DbOptions};
use crate::error::BackendResult;
use crate::executor::Executor;
use crate::result::QueryResult;

/// Runs statements on a SQLite pool, falling back to backup connections
/// when the primary cannot be opened.
#[derive(Debug)]
pub struct SqliteExecutor {
    info: ConnectionInfo,
    max_connections: u32,
    pool: RwLock<SqlitePool>,
}

impl SqliteExecutor {
    /// Opens the pool described by `info`.
    pub async fn connect(info: ConnectionInfo, options: &DbOptions) -> Result<Self, sqlx::Error> {
        let pool = open(&info, options.max_connections).await?;
        Ok(Self {
            info,
            max_connections: options.max_connections,
            pool: RwLock::new(pool),
        })
    }

    /// Wraps an already-open pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool, info: ConnectionInfo) -> Self {
        Self {
            info,
            max_connections: DbOptions::default().max_connections,
            pool: RwLock::new(pool),
        }
    }

    /// Returns a handle to the current pool.
    pub fn pool(&self) -> SqlitePool {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Executor for SqliteExecutor {
    fn driver(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> BackendResult<QueryResult> {
        let pool = self.pool();
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param.clone());
        }

        if returns_rows(sql) {
            let rows = query.fetch_all(&pool).await?;
            let columns = rows.first().map_or_else(Vec::new, |row| {
                row.columns().iter().map(|c| c.name().to_owned()).collect()
            });
            let values = rows
                .iter()
                .map(decode_row)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(QueryResult::new(columns, values))
        } else {
            let done = query.execute(&pool).await?;
            Ok(QueryResult::affected(
                done.rows_affected(),
                Some(done.last_insert_rowid()),
            ))
        }
    }

    async fn quote_literal(&self, literal: &str) -> BackendResult<String> {
        let pool = self.pool();
        let quoted: String = sqlx::query_scalar("SELECT quote(?)")
            .bind(literal)
            .fetch_one(&pool)
            .await?;
        Ok(quoted)
    }

    async fn reconnect(&self) -> BackendResult<()> {
        let fresh = open(&self.info, self.max_connections).await?;
        let stale = {
            let mut guard = self.pool.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, fresh)
        };
        stale.close().await;
        Ok(())
    }
}

async fn open(info: &ConnectionInfo, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let mut last_error = None;
    for candidate in info.candidates() {
        if !candidate.driver.is_empty() && candidate.driver != "sqlite" {
            warn!(url = %candidate.url, driver = %candidate.driver, "Skipping non-sqlite backup");
            continue;
        }
        match SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&candidate.url)
            .await
        {
            Ok(pool) => {
                debug!(url = %candidate.url, "Connected");
                return Ok(pool);
            }
            Err(e) => {
                warn!(url = %candidate.url, error = %e, "Connection failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(sqlx::Error::PoolClosed))
}

/// True when the statement produces a result set.
fn returns_rows(sql: &str) -> bool {
    let words = keywords(sql);
    matches!(
        words.first().map(String::as_str),
        Some("SELECT" | "WITH" | "PRAGMA" | "VALUES" | "EXPLAIN")
    ) || words.iter().any(|w| w == "RETURNING")
}

/// Uppercased bare words outside quoted strings and identifiers.
fn keywords(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, c) if c.is_ascii_alphanumeric() || c == '_' => {
                word.push(c.to_ascii_uppercase());
            }
            (None, c) => {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
                if matches!(c, '\'' | '"' | '`' | '[') {
                    quote = Some(if c == '[' { ']' } else { c });
                }
            }
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>, sqlx::Error> {
    (0..row.len()).map(|i| decode_value(row, i)).collect()
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_owned();
    Ok(match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => SqlValue::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
    })
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use fragsql_core::SqlValue;
use fragsql_db::{
    BackendError, BackendResult, ConnectionInfo, Db, DbOptions, Executor, QueryResult,
    SqliteExecutor,
};
use tempfile::TempDir;

/// An executor that records every statement it is handed and replays
/// queued failures before answering with a canned result.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
    failures: Mutex<VecDeque<BackendError>>,
    response: Mutex<QueryResult>,
    reconnects: AtomicUsize,
    quotes: AtomicUsize,
}

impl RecordingExecutor {
    pub fn fail_with(self, errors: impl IntoIterator<Item = BackendError>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    pub fn respond_with(self, result: QueryResult) -> Self {
        *self.response.lock().unwrap() = result;
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(sql, _)| sql.clone())
            .expect("Executor was never called")
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn quotes(&self) -> usize {
        self.quotes.load(Ordering::SeqCst)
    }
}

impl Executor for RecordingExecutor {
    fn driver(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> BackendResult<QueryResult> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_owned(), params.to_vec()));
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.response.lock().unwrap().clone())
    }

    async fn quote_literal(&self, literal: &str) -> BackendResult<String> {
        self.quotes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("'{}'", literal.replace('\'', "''")))
    }

    async fn reconnect(&self) -> BackendResult<()> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn recording_db(executor: RecordingExecutor) -> Db<RecordingExecutor> {
    Db::new(executor, &DbOptions::default()).expect("sqlite is a known driver")
}

pub fn connection_lost() -> BackendError {
    BackendError::Connection(String::from("database is gone"))
}

pub fn sqlite_url(dir: &TempDir, name: &str) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join(name).display())
}

/// Opens a fresh database file with a `users` table.
pub async fn sqlite_db() -> (TempDir, Db<SqliteExecutor>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Db::connect(
        ConnectionInfo::new(sqlite_url(&dir, "test.db")),
        DbOptions::default(),
    )
    .await
    .expect("Failed to open SQLite database");
    db.exec(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            role TEXT,
            age INTEGER
        )",
    )
    .await
    .expect("Failed to create users table");
    (dir, db)
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_owned())
}

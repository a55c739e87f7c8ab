//! # fragsql-db
//!
//! Runs `fragsql-core` statements against a database.
//!
//! A [`Db`] session pairs a [`QueryBuilder`](fragsql_core::QueryBuilder)
//! factory using the driver's quoting policy with an [`Executor`], the
//! collaborator that actually prepares and runs statements. Rows come back
//! as a [`QueryResult`] consumed like a cursor.
//!
//! Statements that fail to build (including UPDATE or DELETE without a
//! WHERE condition and without the risky override) are refused before the
//! executor is called. A statement that fails with a lost connection is
//! retried exactly once after a reconnect.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fragsql_core::fields;
//! use fragsql_db::{ConnectionInfo, Db, DbOptions};
//!
//! # async fn run() -> fragsql_db::Result<()> {
//! let db = Db::connect(ConnectionInfo::new("sqlite://app.db"), DbOptions::default()).await?;
//!
//! let id = db
//!     .insert(&db.table("users").insert(fields! { "name" => "Alice" }))
//!     .await?;
//!
//! let row = db.row(&db.table("users").where_eq("id", id)).await?;
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod result;
pub mod session;
pub mod sqlite;

pub use config::{dialect_for, ConnectionInfo, DbOptions, SqlMode};
pub use error::{BackendError, BackendResult, DbError, Result};
pub use executor::Executor;
pub use result::{QueryResult, Row};
pub use session::Db;
pub use sqlite::SqliteExecutor;

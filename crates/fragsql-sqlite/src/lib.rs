//! # fragsql-sqlite
//!
//! SQLite dialect for `fragsql-core`.
//!
//! # How SQLite differs from other dialects
//!
//! - **Dotted identifiers**: `table.column` is passed through unquoted.
//!   SQLite does not name result columns after a quoted `"t"."c"` the way
//!   callers expect, so dotted names are left for the caller to quote.
//! - **[UPSERT]**: the insert-or-update variant emits
//!   `ON CONFLICT DO UPDATE SET …` (the conflict target may be omitted
//!   since SQLite 3.35.0).
//! - **Conflict keywords**: `INSERT OR REPLACE INTO` and
//!   `INSERT OR IGNORE INTO` instead of `REPLACE INTO` / `INSERT IGNORE`.
//! - **OFFSET** requires a LIMIT; `LIMIT -1` means unbounded.
//! - **No locking reads**: `FOR UPDATE` / `FOR SHARE` are rejected at
//!   construction time.
//!
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fragsql_core::{fields, QueryBuilder};
//! use fragsql_sqlite::SqliteDialect;
//!
//! let statement = QueryBuilder::with_dialect(Arc::new(SqliteDialect::new()))
//!     .from("users")
//!     .replace(fields! { "id" => 1, "name" => "Alice" })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     "INSERT OR REPLACE INTO \"users\" (\"id\", \"name\")\nVALUES (?, ?)"
//! );
//! ```

mod dialect;

pub use dialect::SqliteDialect;

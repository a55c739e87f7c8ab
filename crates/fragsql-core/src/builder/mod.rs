//! Statement builder.
//!
//! [`QueryBuilder`] accumulates clause fragments and serializes them into
//! one [`Statement`] at [`QueryBuilder::build`]. The statement kind is
//! decided at that point, from which payloads are pending.
//!
//! # Example
//!
//! ```rust
//! use fragsql_core::QueryBuilder;
//!
//! let statement = QueryBuilder::new()
//!     .from("users")
//!     .where_eq("a", 1)
//!     .where_eq("b", 2)
//!     .or_group()
//!     .where_eq("c", 3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     "SELECT *\nFROM \"users\"\nWHERE ( \"a\" = ?\n\tAND \"b\" = ? )\n\tOR ( \"c\" = ? )"
//! );
//! ```

mod delete;
mod insert;
mod parts;
mod query;
mod select;
mod statement;
mod update;

pub use parts::{could_be_identity, possibly_quote_identity, JoinType, OrderBy, OrderDirection};
pub use query::{InsertMode, JoinTarget, LockMode, QueryBuilder};
pub use statement::{Statement, StatementKind};

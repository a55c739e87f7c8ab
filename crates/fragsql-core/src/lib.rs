//! # fragsql-core
//!
//! Dynamic SQL assembly with safe parameterization.
//!
//! This crate provides:
//! - [`Fragment`]: SQL text paired with its ordered bind parameters, and
//!   the algebra to combine them
//! - The input [`conform`] layer, which turns raw SQL, field mappings,
//!   conditions and nested builders into fragments
//! - [`QueryBuilder`], which accumulates clauses and serializes SELECT,
//!   INSERT, UPDATE and DELETE statements
//! - [`Dialect`], the driver-dependent identifier quoting and keywords
//!
//! ## SQL Injection Prevention
//!
//! Values are always bound as parameters unless the caller explicitly marks
//! them raw (`"` prefix) or as identifiers (`:` prefix):
//!
//! ```rust
//! use fragsql_core::{QueryBuilder, SqlValue};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let statement = QueryBuilder::new()
//!     .select("id")
//!     .from("users")
//!     .where_eq("name", user_input)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(statement.sql(), "SELECT \"id\"\nFROM \"users\"\nWHERE \"name\" = ?");
//! assert_eq!(statement.params(), &[SqlValue::Text(user_input.to_string())]);
//! ```

pub mod builder;
pub mod conform;
pub mod dialect;
pub mod error;
pub mod fragment;
pub mod value;

pub use builder::{
    InsertMode, JoinTarget, JoinType, LockMode, OrderBy, QueryBuilder, Statement, StatementKind,
};
pub use conform::{ClauseKind, Conformer, FieldOptions, Input};
pub use dialect::{Dialect, GenericDialect, MysqlDialect};
pub use error::{ConstructionError, Result};
pub use fragment::{Combinator, Fragment, FragmentInput, Part};
pub use value::{Fields, SqlValue, ToSqlValue, Value};

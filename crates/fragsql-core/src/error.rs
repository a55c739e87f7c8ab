//! Error types for statement construction.

use thiserror::Error;

/// Errors raised while turning caller input into fragments and statements.
///
/// These are never retried and never partially applied: a builder that
/// raised one cannot be finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A compound value reached a parameter position.
    #[error("non scalar SQL statement variable: {value}")]
    NonScalarParameter {
        /// Debug rendering of the offending value.
        value: String,
    },

    /// A field in an INSERT/UPDATE payload was given a list or mapping.
    #[error("field \"{field}\" has non conforming value")]
    NonConformingValue {
        /// Field name after indicator stripping.
        field: String,
    },

    /// An IN comparison was given a keyed map instead of a list.
    #[error("IN statement value for \"{field}\" must be a list, not a dictionary")]
    KeyedInList {
        /// Field name after indicator stripping.
        field: String,
    },

    /// An IN comparison was given an empty list.
    #[error("IN statement value for \"{field}\" is an empty list")]
    EmptyInList {
        /// Field name after indicator stripping.
        field: String,
    },

    /// A field name carried an unparseable or conflicting indicator prefix.
    #[error("invalid indicator on field \"{field}\": {reason}")]
    InvalidIndicator {
        /// The field as given by the caller.
        field: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Positional arguments were not one of the recognized 1-4 shapes.
    #[error("bad argument count: {0}")]
    BadArgumentCount(usize),

    /// An argument of a shape the clause does not accept.
    #[error("unrecognized {clause} argument: {found}")]
    UnrecognizedArgument {
        /// Clause that received the argument.
        clause: &'static str,
        /// Short description of what was received.
        found: String,
    },

    /// A statement that needs a FROM target has none.
    #[error("no table selected")]
    NoTable,

    /// Neither a table nor any condition was given.
    #[error("nothing to build: no table and no conditions")]
    EmptyStatement,

    /// An INSERT/UPDATE was requested without a payload.
    #[error("no \"{0}\" payload provided")]
    NoPayload(&'static str),

    /// UPDATE without any WHERE condition and without the risky override.
    #[error("no \"where\" on update; call `risky()` to run it anyway")]
    UnguardedUpdate,

    /// DELETE without any WHERE condition and without the risky override.
    #[error("no \"where\" on delete; call `risky()` to run it anyway")]
    UnguardedDelete,

    /// A locking read was requested from a dialect without row locks.
    #[error("dialect \"{dialect}\" does not support locking reads")]
    UnsupportedLock {
        /// Name of the active dialect.
        dialect: &'static str,
    },
}

/// Result type for statement construction.
pub type Result<T> = std::result::Result<T, ConstructionError>;

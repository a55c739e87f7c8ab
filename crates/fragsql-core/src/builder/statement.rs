//! Finalized statements.

use std::fmt;

use crate::fragment::Fragment;
use crate::value::SqlValue;

/// What a finalized statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`
    Select,
    /// `INSERT`, `REPLACE` and their variants
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// Caller-supplied SQL passed through as-is.
    Raw,
}

/// A finalized statement: SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    fragment: Fragment,
}

impl Statement {
    /// Wraps a finished fragment.
    #[must_use]
    pub const fn new(kind: StatementKind, fragment: Fragment) -> Self {
        Self { kind, fragment }
    }

    /// Raw statement from any fragment.
    #[must_use]
    pub const fn raw(fragment: Fragment) -> Self {
        Self::new(StatementKind::Raw, fragment)
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.fragment.sql()
    }

    /// Returns the parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        self.fragment.params()
    }

    /// Returns the underlying fragment.
    #[must_use]
    pub const fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Splits into text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        self.fragment.into_parts()
    }

    /// Renders the statement with parameters inlined as escaped literals.
    ///
    /// **Warning**: for logs and diagnostics only, never for execution.
    #[must_use]
    pub fn to_inline_sql(&self) -> String {
        let mut params = self.params().iter();
        let mut out = String::with_capacity(self.sql().len());
        let mut quote: Option<char> = None;
        for c in self.sql().chars() {
            match (quote, c) {
                (None, '\'' | '"' | '`') => {
                    quote = Some(c);
                    out.push(c);
                }
                (Some(q), c) if c == q => {
                    quote = None;
                    out.push(c);
                }
                (None, '?') => match params.next() {
                    Some(value) => out.push_str(&value.to_sql_inline()),
                    None => out.push(c),
                },
                _ => out.push(c),
            }
        }
        out
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

impl From<Statement> for Fragment {
    fn from(statement: Statement) -> Self {
        statement.fragment
    }
}

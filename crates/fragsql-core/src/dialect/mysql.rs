//! MySQL dialect.

use super::Dialect;

/// Largest row count MySQL accepts; used when only an offset is given.
const MAX_ROWS: u64 = u64::MAX;

/// MySQL dialect.
///
/// With `ansi` set (the server runs with `sql_mode=ANSI`) identifiers are
/// quoted with `"`, otherwise with backticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect {
    ansi: bool,
}

impl MysqlDialect {
    /// Creates a MySQL dialect quoting with backticks.
    #[must_use]
    pub const fn new() -> Self {
        Self { ansi: false }
    }

    /// Creates a MySQL dialect for a server in ANSI mode.
    #[must_use]
    pub const fn ansi() -> Self {
        Self { ansi: true }
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        if self.ansi { '"' } else { '`' }
    }

    fn limit_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, Some(offset)) => Some(format!("LIMIT {MAX_ROWS}\nOFFSET {offset}")),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit}\nOFFSET {offset}")),
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, None) => None,
        }
    }
}

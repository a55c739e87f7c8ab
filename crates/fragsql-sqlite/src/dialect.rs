//! SQLite dialect implementation.

use fragsql_core::dialect::Dialect;

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn supports_dotted_identifiers(&self) -> bool {
        false
    }

    fn replace_keyword(&self) -> &'static str {
        "INSERT OR REPLACE INTO"
    }

    fn insert_ignore_keyword(&self) -> &'static str {
        "INSERT OR IGNORE INTO"
    }

    fn upsert_keyword(&self) -> &'static str {
        "ON CONFLICT DO UPDATE SET"
    }

    fn supports_locking_reads(&self) -> bool {
        false
    }

    fn limit_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, Some(offset)) => Some(format!("LIMIT -1\nOFFSET {offset}")),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit}\nOFFSET {offset}")),
        }
    }
}

//! SQL dialect support.
//!
//! The active dialect decides how identifiers are quoted and which keywords
//! the driver-dependent statement variants use. Literal quoting is not a
//! dialect concern: it belongs to the execution backend.

mod generic;
mod mysql;

pub use generic::GenericDialect;
pub use mysql::MysqlDialect;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder style.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Returns whether each segment of `table.column` may be quoted separately.
    fn supports_dotted_identifiers(&self) -> bool {
        true
    }

    /// Keyword that starts a replacing insert.
    fn replace_keyword(&self) -> &'static str {
        "REPLACE INTO"
    }

    /// Keyword that starts an insert skipping conflicting rows.
    fn insert_ignore_keyword(&self) -> &'static str {
        "INSERT IGNORE INTO"
    }

    /// Keyword introducing the update part of an insert-or-update.
    fn upsert_keyword(&self) -> &'static str {
        "ON DUPLICATE KEY UPDATE"
    }

    /// Returns whether `FOR UPDATE` / `FOR SHARE` are accepted.
    fn supports_locking_reads(&self) -> bool {
        true
    }

    /// Renders the LIMIT/OFFSET lines, if any.
    fn limit_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, Some(offset)) => Some(format!("OFFSET {offset}")),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit}\nOFFSET {offset}")),
        }
    }

    /// Quotes an identifier.
    ///
    /// Embedded quote characters are doubled and each dotted segment is
    /// quoted on its own (`user.id` → `"user"."id"`). A `*` segment stays
    /// bare. Dialects without dotted support return dotted names unchanged.
    fn quote_identifier(&self, name: &str) -> String {
        if name.contains('.') && !self.supports_dotted_identifiers() {
            return name.to_owned();
        }
        let quote = self.identifier_quote();
        let doubled = format!("{quote}{quote}");
        name.split('.')
            .map(|segment| {
                if segment == "*" {
                    segment.to_owned()
                } else {
                    let escaped = segment.replace(quote, &doubled);
                    format!("{quote}{escaped}{quote}")
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

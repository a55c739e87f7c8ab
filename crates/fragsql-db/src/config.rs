//! Connection and session configuration.

use std::sync::Arc;

use fragsql_core::{Dialect, GenericDialect, MysqlDialect};
use fragsql_sqlite::SqliteDialect;

use crate::error::{DbError, Result};

/// How MySQL-family drivers quote identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlMode {
    /// `ANSI_QUOTES`: identifiers use `"`.
    #[default]
    Ansi,
    /// Backtick identifiers.
    Native,
}

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Connection URL, e.g. `sqlite://app.db`.
    pub url: String,
    /// Driver name, e.g. `sqlite`.
    pub driver: String,
    /// Tried when the primary connection cannot be opened.
    pub backup: Option<Box<ConnectionInfo>>,
}

impl ConnectionInfo {
    /// Creates connection info, deriving the driver from the URL scheme.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let driver = url
            .split_once(':')
            .map_or("", |(scheme, _)| scheme)
            .to_ascii_lowercase();
        Self {
            url,
            driver,
            backup: None,
        }
    }

    /// Overrides the driver name.
    #[must_use]
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Sets the fallback connection.
    #[must_use]
    pub fn with_backup(mut self, backup: Self) -> Self {
        self.backup = Some(Box::new(backup));
        self
    }

    /// The primary followed by each backup in turn.
    pub fn candidates(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |info| info.backup.as_deref())
    }
}

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOptions {
    /// Identifier quoting mode for MySQL-family drivers.
    pub sql_mode: SqlMode,
    /// Pool size handed to the driver.
    pub max_connections: u32,
    /// Maximum number of cached quoted literals.
    pub quote_cache_capacity: usize,
    /// Longest literal that is cached.
    pub quote_cache_max_len: usize,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            sql_mode: SqlMode::Ansi,
            max_connections: 5,
            quote_cache_capacity: 1024,
            quote_cache_max_len: 250,
        }
    }
}

impl DbOptions {
    /// Sets the SQL mode.
    #[must_use]
    pub const fn sql_mode(mut self, mode: SqlMode) -> Self {
        self.sql_mode = mode;
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Sets the quote cache capacity; zero disables caching.
    #[must_use]
    pub const fn quote_cache_capacity(mut self, n: usize) -> Self {
        self.quote_cache_capacity = n;
        self
    }
}

/// Returns the quoting policy for `driver`.
pub fn dialect_for(driver: &str, mode: SqlMode) -> Result<Arc<dyn Dialect>> {
    match driver.to_ascii_lowercase().as_str() {
        "sqlite" | "sqlite3" => Ok(Arc::new(SqliteDialect::new())),
        "mysql" | "mariadb" => Ok(match mode {
            SqlMode::Ansi => Arc::new(MysqlDialect::ansi()),
            SqlMode::Native => Arc::new(MysqlDialect::new()),
        }),
        "generic" | "ansi" => Ok(Arc::new(GenericDialect::new())),
        other => Err(DbError::UnsupportedDriver(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_scheme() {
        assert_eq!(ConnectionInfo::new("sqlite://app.db").driver, "sqlite");
        assert_eq!(ConnectionInfo::new("sqlite::memory:").driver, "sqlite");
        assert_eq!(ConnectionInfo::new("MySQL://host/db").driver, "mysql");
        assert_eq!(ConnectionInfo::new("app.db").driver, "");
    }

    #[test]
    fn test_candidates_follow_backups() {
        let info = ConnectionInfo::new("sqlite://a.db")
            .with_backup(ConnectionInfo::new("sqlite://b.db").with_backup(ConnectionInfo::new("sqlite://c.db")));
        let urls: Vec<&str> = info.candidates().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["sqlite://a.db", "sqlite://b.db", "sqlite://c.db"]);
    }

    #[test]
    fn test_dialect_for() {
        assert_eq!(dialect_for("sqlite", SqlMode::Ansi).unwrap().name(), "sqlite");
        assert_eq!(
            dialect_for("mysql", SqlMode::Ansi).unwrap().identifier_quote(),
            '"'
        );
        assert_eq!(
            dialect_for("mysql", SqlMode::Native).unwrap().identifier_quote(),
            '`'
        );
        assert!(matches!(
            dialect_for("oracle", SqlMode::Ansi),
            Err(DbError::UnsupportedDriver(d)) if d == "oracle"
        ));
    }

    #[test]
    fn test_default_options() {
        let options = DbOptions::default();
        assert_eq!(options.sql_mode, SqlMode::Ansi);
        assert_eq!(options.max_connections, 5);
        assert_eq!(options.quote_cache_capacity, 1024);
        assert_eq!(options.quote_cache_max_len, 250);
    }
}

//! UPDATE assembly.

use crate::error::{ConstructionError, Result};
use crate::fragment::Fragment;

use super::query::QueryBuilder;
use super::statement::{Statement, StatementKind};

impl QueryBuilder {
    /// `UPDATE <table> SET <payload> WHERE <conditions>`.
    ///
    /// Refuses to run without conditions unless the builder is risky.
    pub(crate) fn build_update(&self, payload: &Fragment) -> Result<Statement> {
        if !self.risky && !self.has_conditions() {
            return Err(ConstructionError::UnguardedUpdate);
        }
        let mut statement = self.target_with_joins()?.prefixed("UPDATE ");
        statement.append(payload.clone().prefixed("SET "), "\n");
        self.append_where(&mut statement)?;
        Ok(Statement::new(StatementKind::Update, statement))
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{QueryBuilder, StatementKind};
    use crate::error::ConstructionError;
    use crate::fields;
    use crate::value::{SqlValue, Value};

    #[test]
    fn test_update() {
        let s = QueryBuilder::new()
            .from("users")
            .update(fields! { "name" => "Bob", "deleted_at" => Value::NULL })
            .where_clause(5)
            .build()
            .unwrap();
        assert_eq!(s.kind(), StatementKind::Update);
        assert_eq!(
            s.sql(),
            "UPDATE \"users\"\nSET \"name\" = ?, \"deleted_at\" = NULL\nWHERE \"id\" = ?"
        );
        assert_eq!(
            s.params(),
            &[SqlValue::Text(String::from("Bob")), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_update_without_where_is_refused() {
        let err = QueryBuilder::new()
            .from("users")
            .update(fields! { "x" => 1 })
            .build()
            .unwrap_err();
        assert_eq!(err, ConstructionError::UnguardedUpdate);
    }

    #[test]
    fn test_update_risky() {
        let s = QueryBuilder::new()
            .from("users")
            .update(fields! { "x" => 1 })
            .risky()
            .build()
            .unwrap();
        assert_eq!(s.sql(), "UPDATE \"users\"\nSET \"x\" = ?");
    }

    #[test]
    fn test_update_raw_and_identity_values() {
        let s = QueryBuilder::new()
            .from("stats")
            .update(fields! { "\"hits" => "hits + 1", ":copy" => "original" })
            .where_eq("id", 1)
            .build()
            .unwrap();
        assert_eq!(
            s.sql(),
            "UPDATE \"stats\"\nSET \"hits\" = hits + 1, \"copy\" = \"original\"\nWHERE \"id\" = ?"
        );
        assert_eq!(s.params(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_update_rejects_negation() {
        let err = QueryBuilder::new()
            .from("t")
            .update(fields! { "!x" => 1 })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidIndicator { .. }));
    }
}

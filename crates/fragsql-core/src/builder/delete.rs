//! DELETE assembly.

use crate::error::{ConstructionError, Result};

use super::query::QueryBuilder;
use super::statement::{Statement, StatementKind};

impl QueryBuilder {
    /// `DELETE FROM <table> WHERE <conditions>`.
    ///
    /// Refuses to run without conditions unless the builder is risky.
    pub(crate) fn build_delete(&self) -> Result<Statement> {
        if !self.risky && !self.has_conditions() {
            return Err(ConstructionError::UnguardedDelete);
        }
        let mut statement = self.target_with_joins()?.prefixed("DELETE FROM ");
        self.append_where(&mut statement)?;
        Ok(Statement::new(StatementKind::Delete, statement))
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{QueryBuilder, StatementKind};
    use crate::error::ConstructionError;
    use crate::value::SqlValue;

    #[test]
    fn test_delete() {
        let s = QueryBuilder::new()
            .from("sessions")
            .where_cmp("expires", "<", 100)
            .delete()
            .build()
            .unwrap();
        assert_eq!(s.kind(), StatementKind::Delete);
        assert_eq!(s.sql(), "DELETE FROM \"sessions\"\nWHERE \"expires\" < ?");
        assert_eq!(s.params(), &[SqlValue::Int(100)]);
    }

    #[test]
    fn test_delete_without_where_is_refused() {
        let err = QueryBuilder::new().from("sessions").delete().build().unwrap_err();
        assert_eq!(err, ConstructionError::UnguardedDelete);
    }

    #[test]
    fn test_delete_with_only_grouped_conditions() {
        let s = QueryBuilder::new()
            .from("t")
            .where_eq("a", 1)
            .or_group()
            .delete()
            .build()
            .unwrap();
        assert_eq!(s.sql(), "DELETE FROM \"t\"\nWHERE ( \"a\" = ? )");
    }

    #[test]
    fn test_delete_risky() {
        let s = QueryBuilder::new().from("t").risky().delete().build().unwrap();
        assert_eq!(s.sql(), "DELETE FROM \"t\"");
    }
}

//! INSERT assembly.

use crate::error::{ConstructionError, Result};
use crate::fragment::Fragment;

use super::query::{InsertMode, QueryBuilder};
use super::statement::{Statement, StatementKind};

impl QueryBuilder {
    /// `<keyword> <table> <payload>[\n<upsert keyword> <update payload>]`.
    ///
    /// INSERT never carries a WHERE clause.
    pub(crate) fn build_insert(&self, mode: InsertMode, payload: &Fragment) -> Result<Statement> {
        let dialect = self.dialect.as_ref();
        let keyword = match mode {
            InsertMode::Insert | InsertMode::Upsert => "INSERT INTO",
            InsertMode::Replace => dialect.replace_keyword(),
            InsertMode::Ignore => dialect.insert_ignore_keyword(),
        };

        let mut statement = self.from_fragment()?.prefixed(&format!("{keyword} "));
        statement.append(payload.clone(), " ");

        if mode == InsertMode::Upsert {
            let update = self
                .update
                .clone()
                .ok_or(ConstructionError::NoPayload("update"))?;
            statement.append(
                update.prefixed(&format!("{} ", dialect.upsert_keyword())),
                "\n",
            );
        }

        Ok(Statement::new(StatementKind::Insert, statement))
    }
}

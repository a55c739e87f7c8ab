//! SELECT assembly.

use crate::error::Result;
use crate::fragment::{Combinator, Fragment};

use super::parts::{could_be_identity, possibly_quote_identity};
use super::query::{QueryBuilder, SelectTarget};
use super::statement::{Statement, StatementKind};

impl QueryBuilder {
    /// `SELECT → FROM → joins → WHERE → GROUP BY → HAVING → ORDER BY →
    /// LIMIT/OFFSET → lock`, wrapped as `( … ) "alias"` when named.
    pub(crate) fn build_select(&self) -> Result<Statement> {
        let dialect = self.dialect.as_ref();

        let mut statement = match &self.select {
            Some(SelectTarget::Expr(expr)) if !expr.trim().is_empty() => {
                Fragment::raw(format!("SELECT {}", possibly_quote_identity(dialect, expr)))
            }
            Some(SelectTarget::Columns(columns)) if !columns.is_empty() => {
                let columns = columns
                    .iter()
                    .map(|c| possibly_quote_identity(dialect, c))
                    .collect::<Vec<_>>()
                    .join(", ");
                Fragment::raw(format!("SELECT {columns}"))
            }
            Some(SelectTarget::Fragment(fragment)) => fragment.clone().prefixed("SELECT "),
            _ => Fragment::raw("SELECT *"),
        };

        statement.append(self.target_with_joins()?.prefixed("FROM "), "\n");
        self.append_where(&mut statement)?;

        if !self.group.is_empty() {
            let group = self
                .group
                .iter()
                .map(|g| {
                    if could_be_identity(g) {
                        dialect.quote_identifier(g)
                    } else {
                        g.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            statement.append(Fragment::raw(format!("GROUP BY {group}")), "\n");
        }

        if !self.having.is_empty() {
            let having = Fragment::combine(self.having.iter(), Combinator::And)?;
            statement.append(having.prefixed("HAVING "), "\n");
        }

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| o.to_sql(dialect))
                .collect::<Vec<_>>()
                .join(", ");
            statement.append(Fragment::raw(format!("ORDER BY {order}")), "\n");
        }

        if let Some(limit) = dialect.limit_clause(self.limit, self.offset) {
            statement.append(Fragment::raw(limit), "\n");
        }

        if let Some(lock) = self.lock {
            statement.append(Fragment::raw(lock.as_sql()), "\n");
        }

        if let Some(name) = &self.name {
            let (sql, params) = statement.into_parts();
            statement = Fragment::new(
                format!("( {sql} ) {}", dialect.quote_identifier(name)),
                params,
            );
        }

        Ok(Statement::new(StatementKind::Select, statement))
    }
}

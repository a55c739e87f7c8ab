//! Builder state and clause methods.

use std::fmt;
use std::sync::Arc;

use crate::conform::{ClauseKind, Conformer, FieldOptions, Input};
use crate::dialect::{Dialect, GenericDialect};
use crate::error::{ConstructionError, Result};
use crate::fragment::{Combinator, Fragment, FragmentInput};
use crate::value::Value;

use super::parts::{possibly_quote_identity, Join, JoinType, OrderBy};
use super::statement::{Statement, StatementKind};

/// Row locking for a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// `FOR UPDATE`
    Update,
    /// `FOR SHARE`
    Share,
}

impl LockMode {
    pub(crate) const fn as_sql(self) -> &'static str {
        match self {
            Self::Update => "FOR UPDATE",
            Self::Share => "FOR SHARE",
        }
    }
}

/// Which insert statement to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// `INSERT INTO`
    Insert,
    /// `REPLACE INTO` / `INSERT OR REPLACE INTO`
    Replace,
    /// `INSERT IGNORE INTO` / `INSERT OR IGNORE INTO`
    Ignore,
    /// `INSERT INTO … ON DUPLICATE KEY UPDATE …`
    Upsert,
}

#[derive(Debug, Clone)]
pub(crate) enum SelectTarget {
    Expr(String),
    Columns(Vec<String>),
    Fragment(Fragment),
}

#[derive(Debug, Clone)]
pub(crate) enum FromTarget {
    Tables(Vec<String>),
    SubQuery(Fragment),
}

/// Previously reduced WHERE history and the operator the next group joins with.
#[derive(Debug, Clone)]
pub(crate) struct Grouping {
    pub(crate) fragment: Fragment,
    pub(crate) combinator: Combinator,
    pub(crate) groups: usize,
}

/// Accumulates clauses for one statement.
///
/// Clause methods consume and return the builder. The first construction
/// error is latched: later clause calls are ignored and [`build`] returns
/// it, so a failed builder can never be finalized.
///
/// ```rust
/// use fragsql_core::{fields, QueryBuilder};
///
/// let statement = QueryBuilder::new()
///     .from("users")
///     .where_clause(fields! { "status" => "active", "!role" => "banned" })
///     .order("-created_at")
///     .limit(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     statement.sql(),
///     "SELECT *\nFROM \"users\"\nWHERE \"status\" = ?\n\tAND NOT ( \"role\" = ? )\nORDER BY \"created_at\" DESC\nLIMIT 10"
/// );
/// ```
///
/// [`build`]: QueryBuilder::build
#[derive(Clone)]
pub struct QueryBuilder {
    pub(crate) dialect: Arc<dyn Dialect>,
    pub(crate) error: Option<ConstructionError>,
    pub(crate) where_fragments: Vec<Fragment>,
    pub(crate) grouping: Option<Grouping>,
    pub(crate) having: Vec<Fragment>,
    pub(crate) select: Option<SelectTarget>,
    pub(crate) from: Option<FromTarget>,
    pub(crate) joins: Vec<Join>,
    pub(crate) order: Vec<OrderBy>,
    pub(crate) group: Vec<String>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) insert: Option<(InsertMode, Fragment)>,
    pub(crate) update: Option<Fragment>,
    pub(crate) delete: bool,
    pub(crate) risky: bool,
    pub(crate) name: Option<String>,
    pub(crate) lock: Option<LockMode>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("dialect", &self.dialect.name())
            .field("error", &self.error)
            .field("where_fragments", &self.where_fragments)
            .field("from", &self.from)
            .field("insert", &self.insert)
            .field("update", &self.update)
            .field("delete", &self.delete)
            .finish_non_exhaustive()
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Creates a builder using the generic dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dialect(Arc::new(GenericDialect::new()))
    }

    /// Creates a builder quoting identifiers with `dialect`.
    #[must_use]
    pub fn with_dialect(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            error: None,
            where_fragments: Vec::new(),
            grouping: None,
            having: Vec::new(),
            select: None,
            from: None,
            joins: Vec::new(),
            order: Vec::new(),
            group: Vec::new(),
            limit: None,
            offset: None,
            insert: None,
            update: None,
            delete: false,
            risky: false,
            name: None,
            lock: None,
        }
    }

    /// Returns the active dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the latched construction error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ConstructionError> {
        self.error.as_ref()
    }

    /// True when any WHERE condition (live or grouped) is present.
    #[must_use]
    pub fn has_conditions(&self) -> bool {
        self.grouping.is_some() || !self.where_fragments.is_empty()
    }

    /// True when a FROM target is set, i.e. this is a full statement rather
    /// than raw passthrough.
    #[must_use]
    pub const fn targets_table(&self) -> bool {
        self.from.is_some()
    }

    /// True when a LIMIT is set.
    #[must_use]
    pub const fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    fn apply(mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&mut self) {
                self.error = Some(e);
            }
        }
        self
    }

    fn conform(
        &self,
        clause: ClauseKind,
        input: Input,
        options: &FieldOptions,
    ) -> Result<Fragment> {
        Conformer::new(self.dialect.as_ref()).conform(clause, input, options)
    }

    // ==================== WHERE ====================

    /// Adds a WHERE condition.
    ///
    /// Accepts raw SQL text, a [`Fragment`], a field mapping, an id, a
    /// `(field, value)` or `(field, comparator, value)` tuple, or a nested
    /// builder. Conditions are AND-joined.
    #[must_use]
    pub fn where_clause(self, input: impl Into<Input>) -> Self {
        self.where_with(input, FieldOptions::default())
    }

    /// Adds a WHERE condition with call-level options applied to each field.
    #[must_use]
    pub fn where_with(self, input: impl Into<Input>, options: FieldOptions) -> Self {
        let input = input.into();
        self.apply(|b| {
            let fragment = b.conform(ClauseKind::Where, input, &options)?;
            if !fragment.is_empty() {
                b.where_fragments.push(fragment);
            }
            Ok(())
        })
    }

    /// Adds a WHERE condition from a loosely-typed value (see
    /// [`Input::from_value`]).
    #[must_use]
    pub fn where_value(self, value: impl Into<Value>) -> Self {
        match Input::from_value(value.into()) {
            Ok(input) => self.where_clause(input),
            Err(e) => self.apply(|_| Err(e)),
        }
    }

    /// Adds `field = value`.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.where_clause(Input::condition(field, None, value))
    }

    /// Adds `field <comparator> value`.
    #[must_use]
    pub fn where_cmp(self, field: &str, comparator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(Input::condition(field, Some(comparator), value))
    }

    /// Adds a condition whose values are inserted as raw SQL.
    #[must_use]
    pub fn where_raw(self, input: impl Into<Input>) -> Self {
        self.where_with(input, FieldOptions::raw())
    }

    /// Adds a negated condition.
    #[must_use]
    pub fn where_not(self, input: impl Into<Input>) -> Self {
        self.where_with(input, FieldOptions::not())
    }

    /// Adds a condition whose values are identifiers.
    #[must_use]
    pub fn where_identity(self, input: impl Into<Input>) -> Self {
        self.where_with(input, FieldOptions::identity())
    }

    /// Adds a nested builder's statement as a condition.
    #[must_use]
    pub fn where_sub(self, builder: Self) -> Self {
        self.where_clause(Input::SubQuery(Box::new(builder)))
    }

    /// Reduces the current conditions into a group joined to the next
    /// group with AND.
    #[must_use]
    pub fn and_group(self) -> Self {
        self.apply(|b| b.reduce_grouping(Combinator::And))
    }

    /// Reduces the current conditions into a group joined to the next
    /// group with OR.
    #[must_use]
    pub fn or_group(self) -> Self {
        self.apply(|b| b.reduce_grouping(Combinator::Or))
    }

    /// `and_group()` followed by `where_clause(input)`.
    #[must_use]
    pub fn and_where(self, input: impl Into<Input>) -> Self {
        self.and_group().where_clause(input)
    }

    /// `or_group()` followed by `where_clause(input)`.
    #[must_use]
    pub fn or_where(self, input: impl Into<Input>) -> Self {
        self.or_group().where_clause(input)
    }

    /// `( current AND-joined conditions )`, combined with the history.
    pub(crate) fn grouped_wheres(&self) -> Result<Fragment> {
        let current =
            Fragment::combine(self.where_fragments.iter(), Combinator::And)?.parenthesize();
        match &self.grouping {
            Some(grouping) => Fragment::combine(
                [grouping.fragment.clone(), current],
                grouping.combinator.clone(),
            ),
            None => Ok(current),
        }
    }

    fn reduce_grouping(&mut self, combinator: Combinator) -> Result<()> {
        if !self.where_fragments.is_empty() {
            let fragment = self.grouped_wheres()?;
            let (joined_by, groups) = match &self.grouping {
                Some(grouping) => (grouping.combinator.clone(), grouping.groups + 1),
                None => (combinator.clone(), 1),
            };
            self.grouping = Some(Grouping {
                fragment,
                combinator: joined_by,
                groups,
            });
            self.where_fragments.clear();
        }
        if let Some(grouping) = self.grouping.as_mut() {
            // Several groups joined by one operator stay together when the
            // next operator differs.
            if grouping.groups > 1 && grouping.combinator != combinator {
                grouping.fragment = std::mem::take(&mut grouping.fragment).parenthesize();
                grouping.groups = 1;
            }
            grouping.combinator = combinator;
        }
        Ok(())
    }

    /// The WHERE condition text, without the keyword.
    pub(crate) fn consolidated_wheres(&self) -> Result<Fragment> {
        match (&self.grouping, self.where_fragments.is_empty()) {
            (Some(_), false) => self.grouped_wheres(),
            (Some(grouping), true) => Ok(grouping.fragment.clone()),
            (None, _) => Fragment::combine(self.where_fragments.iter(), Combinator::And),
        }
    }

    // ==================== HAVING ====================

    /// Adds a HAVING condition; conditions are AND-joined.
    #[must_use]
    pub fn having(self, input: impl Into<Input>) -> Self {
        let input = input.into();
        self.apply(|b| {
            let fragment = b.conform(ClauseKind::Having, input, &FieldOptions::default())?;
            if !fragment.is_empty() {
                b.having.push(fragment);
            }
            Ok(())
        })
    }

    // ==================== SELECT / FROM ====================

    /// Sets the SELECT target; a bare identifier is quoted.
    #[must_use]
    pub fn select(mut self, expr: &str) -> Self {
        self.select = Some(SelectTarget::Expr(expr.to_owned()));
        self
    }

    /// Sets the SELECT target to a column list.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.select = Some(SelectTarget::Columns(
            columns.iter().map(|c| (*c).to_owned()).collect(),
        ));
        self
    }

    /// Sets the SELECT target to a prebuilt fragment.
    #[must_use]
    pub fn select_fragment(mut self, fragment: Fragment) -> Self {
        self.select = Some(SelectTarget::Fragment(fragment));
        self
    }

    /// Sets the FROM target, replacing any previous one.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.from = Some(FromTarget::Tables(vec![table.to_owned()]));
        self
    }

    /// Appends a table to the FROM target.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        match &mut self.from {
            Some(FromTarget::Tables(tables)) => tables.push(table.to_owned()),
            _ => self.from = Some(FromTarget::Tables(vec![table.to_owned()])),
        }
        self
    }

    /// Uses a nested builder as the FROM target; name it with
    /// [`QueryBuilder::name`] to make it a derived table.
    #[must_use]
    pub fn from_sub(self, builder: Self) -> Self {
        self.apply(|b| {
            b.from = Some(FromTarget::SubQuery(builder.to_fragment()?));
            Ok(())
        })
    }

    /// Names this statement so it can be used as a derived table.
    #[must_use]
    pub fn name(mut self, alias: &str) -> Self {
        self.name = Some(alias.to_owned());
        self
    }

    // ==================== JOIN ====================

    /// Adds a join. `on` is conformed as a condition with identity values,
    /// so `("a.x", "b.y")` compares two columns.
    #[must_use]
    pub fn join(self, target: impl Into<JoinTarget>, kind: JoinType, on: Option<Input>) -> Self {
        let target = target.into();
        self.apply(|b| {
            let target = match target {
                JoinTarget::Table(table) => {
                    Fragment::raw(possibly_quote_identity(b.dialect.as_ref(), &table))
                }
                JoinTarget::SubQuery(builder) => builder.to_fragment()?,
            };
            let on = match on {
                Some(input) => {
                    Some(b.conform(ClauseKind::Where, input, &FieldOptions::identity())?)
                }
                None => None,
            };
            b.joins.push(Join {
                kind: Some(kind),
                target,
                on,
            });
            Ok(())
        })
    }

    /// Adds a fully written join clause verbatim.
    #[must_use]
    pub fn join_raw(self, join: impl Into<FragmentInput>) -> Self {
        let join = join.into();
        self.apply(|b| {
            b.joins.push(Join {
                kind: None,
                target: Fragment::conform(join, Combinator::Newline)?,
                on: None,
            });
            Ok(())
        })
    }

    /// `NATURAL JOIN target`
    #[must_use]
    pub fn natural_join(self, target: impl Into<JoinTarget>) -> Self {
        self.join(target, JoinType::Natural, None)
    }

    /// `CROSS JOIN target`
    #[must_use]
    pub fn cross_join(self, target: impl Into<JoinTarget>) -> Self {
        self.join(target, JoinType::Cross, None)
    }

    /// `INNER JOIN target ON …`
    #[must_use]
    pub fn inner_join(self, target: impl Into<JoinTarget>, on: impl Into<Input>) -> Self {
        self.join(target, JoinType::Inner, Some(on.into()))
    }

    /// `LEFT JOIN target ON …`
    #[must_use]
    pub fn left_join(self, target: impl Into<JoinTarget>, on: impl Into<Input>) -> Self {
        self.join(target, JoinType::Left, Some(on.into()))
    }

    /// `RIGHT JOIN target ON …`
    #[must_use]
    pub fn right_join(self, target: impl Into<JoinTarget>, on: impl Into<Input>) -> Self {
        self.join(target, JoinType::Right, Some(on.into()))
    }

    /// `FULL JOIN target ON …`
    #[must_use]
    pub fn full_join(self, target: impl Into<JoinTarget>, on: impl Into<Input>) -> Self {
        self.join(target, JoinType::Full, Some(on.into()))
    }

    // ==================== ORDER / GROUP / LIMIT ====================

    /// Appends an ORDER BY spec (`name`, `-name`, `name desc`, or an expression).
    #[must_use]
    pub fn order(mut self, spec: &str) -> Self {
        self.order.push(OrderBy::parse(spec));
        self
    }

    /// Appends a GROUP BY column or expression.
    #[must_use]
    pub fn group(mut self, spec: &str) -> Self {
        self.group.push(spec.to_owned());
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Appends a row lock to the SELECT.
    #[must_use]
    pub fn lock(self, mode: LockMode) -> Self {
        self.apply(|b| {
            if !b.dialect.supports_locking_reads() {
                return Err(ConstructionError::UnsupportedLock {
                    dialect: b.dialect.name(),
                });
            }
            b.lock = Some(mode);
            Ok(())
        })
    }

    // ==================== CHANGES ====================

    /// Allows UPDATE and DELETE without any WHERE condition.
    #[must_use]
    pub const fn risky(mut self) -> Self {
        self.risky = true;
        self
    }

    /// Sets the INSERT payload: a field mapping, a list of mappings, a
    /// `(field, value)` pair, raw text or a fragment (e.g. `SELECT …`).
    #[must_use]
    pub fn insert(self, input: impl Into<Input>) -> Self {
        self.insert_as(InsertMode::Insert, input.into())
    }

    /// Sets a replacing INSERT payload.
    #[must_use]
    pub fn replace(self, input: impl Into<Input>) -> Self {
        self.insert_as(InsertMode::Replace, input.into())
    }

    /// Sets an INSERT payload that skips conflicting rows.
    #[must_use]
    pub fn insert_ignore(self, input: impl Into<Input>) -> Self {
        self.insert_as(InsertMode::Ignore, input.into())
    }

    /// Insert-or-update with the same mapping for both parts.
    #[must_use]
    pub fn insert_update(self, input: impl Into<Input>) -> Self {
        let input = input.into();
        self.insert_or_update(input.clone(), input)
    }

    /// Insert-or-update with a separate update payload. The update part is
    /// held and folded into the INSERT text.
    #[must_use]
    pub fn insert_or_update(self, insert: impl Into<Input>, update: impl Into<Input>) -> Self {
        self.update(update).insert_as(InsertMode::Upsert, insert.into())
    }

    fn insert_as(self, mode: InsertMode, input: Input) -> Self {
        self.apply(|b| {
            let fragment = b.conform(ClauseKind::Insert, input, &FieldOptions::default())?;
            if fragment.is_empty() {
                return Err(ConstructionError::NoPayload("insert"));
            }
            b.insert = Some((mode, fragment));
            Ok(())
        })
    }

    /// Sets the UPDATE payload.
    #[must_use]
    pub fn update(self, input: impl Into<Input>) -> Self {
        let input = input.into();
        self.apply(|b| {
            let fragment = b.conform(ClauseKind::Update, input, &FieldOptions::default())?;
            if fragment.is_empty() {
                return Err(ConstructionError::NoPayload("update"));
            }
            b.update = Some(fragment);
            Ok(())
        })
    }

    /// Turns the statement into a DELETE.
    #[must_use]
    pub const fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    // ==================== FINALIZATION ====================

    /// Finalizes the statement.
    ///
    /// The kind is chosen by precedence: DELETE, then INSERT, then UPDATE,
    /// otherwise SELECT. Without a FROM target the consolidated WHERE
    /// fragment is returned as a raw statement.
    pub fn build(&self) -> Result<Statement> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        if self.delete {
            return self.build_delete();
        }
        if let Some((mode, payload)) = &self.insert {
            return self.build_insert(*mode, payload);
        }
        if let Some(payload) = &self.update {
            return self.build_update(payload);
        }
        if self.from.is_none() {
            return self.build_raw();
        }
        self.build_select()
    }

    /// Finalizes and returns the statement's fragment, for nesting.
    pub fn to_fragment(&self) -> Result<Fragment> {
        self.build().map(Fragment::from)
    }

    fn build_raw(&self) -> Result<Statement> {
        if !self.joins.is_empty()
            || !self.order.is_empty()
            || !self.group.is_empty()
            || !self.having.is_empty()
            || self.limit.is_some()
            || self.offset.is_some()
        {
            return Err(ConstructionError::NoTable);
        }
        let fragment = self.consolidated_wheres()?;
        if fragment.is_empty() {
            return Err(ConstructionError::EmptyStatement);
        }
        Ok(Statement::new(StatementKind::Raw, fragment))
    }

    /// The FROM target text.
    pub(crate) fn from_fragment(&self) -> Result<Fragment> {
        match &self.from {
            None => Err(ConstructionError::NoTable),
            Some(FromTarget::SubQuery(fragment)) => Ok(fragment.clone()),
            Some(FromTarget::Tables(tables)) => Ok(Fragment::raw(
                tables
                    .iter()
                    .map(|t| possibly_quote_identity(self.dialect.as_ref(), t))
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }

    /// `target` followed by its joins.
    pub(crate) fn target_with_joins(&self) -> Result<Fragment> {
        let mut fragment = self.from_fragment()?;
        for join in &self.joins {
            fragment.append(join.clone().into_fragment(), "\n");
        }
        Ok(fragment)
    }

    /// Appends `WHERE …` when there are conditions.
    pub(crate) fn append_where(&self, statement: &mut Fragment) -> Result<()> {
        let wheres = self.consolidated_wheres()?;
        if !wheres.is_empty() {
            statement.append(wheres.prefixed("WHERE "), "\n");
        }
        Ok(())
    }
}

/// Target of a join.
#[derive(Debug, Clone)]
pub enum JoinTarget {
    /// A table name, optionally with an alias.
    Table(String),
    /// A nested builder, usually named.
    SubQuery(Box<QueryBuilder>),
}

impl From<&str> for JoinTarget {
    fn from(table: &str) -> Self {
        Self::Table(table.to_owned())
    }
}

impl From<String> for JoinTarget {
    fn from(table: String) -> Self {
        Self::Table(table)
    }
}

impl From<QueryBuilder> for JoinTarget {
    fn from(builder: QueryBuilder) -> Self {
        Self::SubQuery(Box::new(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::value::SqlValue;

    fn ints(values: &[i64]) -> Vec<SqlValue> {
        values.iter().copied().map(SqlValue::Int).collect()
    }

    #[test]
    fn test_or_group_nesting() {
        let b = QueryBuilder::new()
            .where_eq("a", 1)
            .where_eq("b", 2)
            .or_group()
            .where_eq("c", 3);
        let wheres = b.consolidated_wheres().unwrap();
        assert_eq!(wheres.sql(), "( \"a\" = ?\n\tAND \"b\" = ? )\n\tOR ( \"c\" = ? )");
        assert_eq!(wheres.params(), ints(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_mixed_grouping_keeps_history_together() {
        let b = QueryBuilder::new()
            .where_eq("a", 1)
            .or_where(("b", 2))
            .and_where(("c", 3));
        let wheres = b.consolidated_wheres().unwrap();
        assert_eq!(
            wheres.sql(),
            "( ( \"a\" = ? )\n\tOR ( \"b\" = ? ) )\n\tAND ( \"c\" = ? )"
        );
        assert_eq!(wheres.params(), ints(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_same_operator_chains_flat() {
        let b = QueryBuilder::new()
            .where_eq("a", 1)
            .or_where(("b", 2))
            .or_where(("c", 3));
        assert_eq!(
            b.consolidated_wheres().unwrap().sql(),
            "( \"a\" = ? )\n\tOR ( \"b\" = ? )\n\tOR ( \"c\" = ? )"
        );
    }

    #[test]
    fn test_group_without_conditions_is_noop() {
        let b = QueryBuilder::new().or_group().where_eq("a", 1);
        assert_eq!(b.consolidated_wheres().unwrap().sql(), "\"a\" = ?");
    }

    #[test]
    fn test_raw_passthrough() {
        let s = QueryBuilder::new()
            .where_clause(
                Fragment::conform(("SELECT * FROM t WHERE x = ?", vec![4]), Combinator::Newline)
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(s.kind(), StatementKind::Raw);
        assert_eq!(s.sql(), "SELECT * FROM t WHERE x = ?");
        assert_eq!(s.params(), ints(&[4]).as_slice());
    }

    #[test]
    fn test_empty_builder_fails() {
        assert_eq!(
            QueryBuilder::new().build().unwrap_err(),
            ConstructionError::EmptyStatement
        );
    }

    #[test]
    fn test_first_error_is_latched() {
        let b = QueryBuilder::new()
            .from("t")
            .where_eq("id", Vec::<i64>::new())
            .where_eq("x", fields! { "k" => 1 });
        assert_eq!(
            b.error(),
            Some(&ConstructionError::EmptyInList {
                field: String::from("id")
            })
        );
        assert!(matches!(
            b.build(),
            Err(ConstructionError::EmptyInList { .. })
        ));
    }

    #[test]
    fn test_where_value_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"status": "open", "?>?priority": 2}"#).unwrap();
        let s = QueryBuilder::new().from("tickets").where_value(json).build().unwrap();
        assert_eq!(
            s.sql(),
            "SELECT *\nFROM \"tickets\"\nWHERE \"status\" = ?\n\tAND \"priority\" > ?"
        );
    }

    #[test]
    fn test_where_not_and_identity_helpers() {
        let s = QueryBuilder::new()
            .from("t")
            .where_not(("a", 1))
            .where_identity(("b", "c"))
            .where_raw(("d", "NOW()"))
            .build()
            .unwrap();
        assert_eq!(
            s.sql(),
            "SELECT *\nFROM \"t\"\nWHERE NOT ( \"a\" = ? )\n\tAND \"b\" = \"c\"\n\tAND \"d\" = NOW()"
        );
        assert_eq!(s.params(), ints(&[1]).as_slice());
    }

    #[test]
    fn test_from_replaces_and_table_appends() {
        let s = QueryBuilder::new()
            .from("a")
            .from("b")
            .table("c")
            .build()
            .unwrap();
        assert_eq!(s.sql(), "SELECT *\nFROM \"b\", \"c\"");
    }

    #[test]
    fn test_precedence_delete_over_update() {
        let s = QueryBuilder::new()
            .from("t")
            .where_eq("id", 1)
            .update(("a", 2))
            .delete()
            .build()
            .unwrap();
        assert_eq!(s.kind(), StatementKind::Delete);
    }
}

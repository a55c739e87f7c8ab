//! Input conformance: turning caller input into fragments.
//!
//! Every clause method funnels its arguments through [`Conformer`]. The
//! input arrives as a tagged [`Input`], field names are stripped of their
//! indicator prefixes, and the result is a [`Fragment`] whose values are
//! either bound parameters or, when explicitly asked for, raw text or
//! quoted identifiers.

mod indicator;

pub use indicator::{FieldOptions, IndicatedField, parse_field};

use crate::builder::{QueryBuilder, StatementKind};
use crate::dialect::Dialect;
use crate::error::{ConstructionError, Result};
use crate::fragment::{Combinator, Fragment};
use crate::value::{Fields, SqlValue, Value};

/// Clause an input is conformed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// `WHERE` conditions.
    Where,
    /// `HAVING` conditions.
    Having,
    /// `UPDATE … SET` assignments.
    Update,
    /// `INSERT` column/value lists.
    Insert,
}

impl ClauseKind {
    /// Lowercase clause name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Where => "where",
            Self::Having => "having",
            Self::Update => "update",
            Self::Insert => "insert",
        }
    }

    const fn is_condition(self) -> bool {
        matches!(self, Self::Where | Self::Having)
    }
}

/// Tagged clause input.
#[derive(Debug, Clone)]
pub enum Input {
    /// SQL text used as-is, with no parameters.
    Literal(String),
    /// Field → value mapping; conditions are AND-joined, assignments comma-joined.
    Params(Fields),
    /// Several rows for a multi-row insert.
    Rows(Vec<Fields>),
    /// One fielded comparison or assignment.
    Condition {
        /// Field name, possibly carrying indicators.
        field: String,
        /// Comparator; `=` when absent.
        comparator: Option<String>,
        /// Compared or assigned value.
        value: Value,
    },
    /// Shorthand for `id = <n>`.
    Id(i64),
    /// A nested builder, used through its finalized fragment.
    SubQuery(Box<QueryBuilder>),
    /// An already-built fragment.
    Fragment(Fragment),
    /// An input with call-level options applied to each of its fields.
    Overridden(Box<Input>, FieldOptions),
}

impl Input {
    /// Builds a condition input.
    pub fn condition(
        field: impl Into<String>,
        comparator: Option<&str>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Condition {
            field: field.into(),
            comparator: comparator.map(str::to_owned),
            value: value.into(),
        }
    }

    /// Applies call-level options to this input.
    #[must_use]
    pub fn with_options(self, options: FieldOptions) -> Self {
        Self::Overridden(Box::new(self), options)
    }

    /// Interprets a single loosely-typed argument.
    ///
    /// Text is raw SQL, an integer is an id, a mapping is a field mapping,
    /// a list of mappings is a row list and any other list is read as
    /// positional `(field, [comparator,] value[, options])` arguments.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Scalar(SqlValue::Text(sql)) => Ok(Self::Literal(sql)),
            Value::Scalar(SqlValue::Int(id)) => Ok(Self::Id(id)),
            Value::Map(fields) => Ok(Self::Params(fields)),
            Value::List(items)
                if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Map(_))) =>
            {
                Ok(Self::Rows(
                    items
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::Map(fields) => Some(fields),
                            _ => None,
                        })
                        .collect(),
                ))
            }
            Value::List(items) => Self::from_args(items),
            other => Err(ConstructionError::UnrecognizedArgument {
                clause: "input",
                found: other.kind().to_owned(),
            }),
        }
    }

    /// Interprets 1-4 positional arguments.
    pub fn from_args(mut args: Vec<Value>) -> Result<Self> {
        match args.len() {
            1 => Self::from_value(args.remove(0)),
            2 => {
                let value = args.remove(1);
                let field = field_text(args.remove(0))?;
                Ok(Self::Condition {
                    field,
                    comparator: None,
                    value,
                })
            }
            3 => {
                let value = args.remove(2);
                let comparator = field_text(args.remove(1))?;
                let field = field_text(args.remove(0))?;
                Ok(Self::Condition {
                    field,
                    comparator: Some(comparator),
                    value,
                })
            }
            4 => {
                let options = FieldOptions::try_from(args.remove(3))?;
                Ok(Self::from_args(args)?.with_options(options))
            }
            n => Err(ConstructionError::BadArgumentCount(n)),
        }
    }
}

fn field_text(value: Value) -> Result<String> {
    match value {
        Value::Scalar(SqlValue::Text(s)) => Ok(s),
        other => Err(ConstructionError::UnrecognizedArgument {
            clause: "field",
            found: other.kind().to_owned(),
        }),
    }
}

impl TryFrom<Value> for Input {
    type Error = ConstructionError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<&str> for Input {
    fn from(sql: &str) -> Self {
        Self::Literal(sql.to_owned())
    }
}

impl From<String> for Input {
    fn from(sql: String) -> Self {
        Self::Literal(sql)
    }
}

impl From<Fragment> for Input {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<Fields> for Input {
    fn from(fields: Fields) -> Self {
        Self::Params(fields)
    }
}

impl From<Vec<Fields>> for Input {
    fn from(rows: Vec<Fields>) -> Self {
        Self::Rows(rows)
    }
}

impl From<i64> for Input {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<i32> for Input {
    fn from(id: i32) -> Self {
        Self::Id(i64::from(id))
    }
}

impl From<QueryBuilder> for Input {
    fn from(builder: QueryBuilder) -> Self {
        Self::SubQuery(Box::new(builder))
    }
}

impl<K, V> From<(K, V)> for Input
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from((field, value): (K, V)) -> Self {
        Self::Condition {
            field: field.into(),
            comparator: None,
            value: value.into(),
        }
    }
}

impl<K, C, V> From<(K, C, V)> for Input
where
    K: Into<String>,
    C: Into<String>,
    V: Into<Value>,
{
    fn from((field, comparator, value): (K, C, V)) -> Self {
        Self::Condition {
            field: field.into(),
            comparator: Some(comparator.into()),
            value: value.into(),
        }
    }
}

/// Normalizes [`Input`] into fragments under one dialect's quoting.
#[derive(Debug, Clone, Copy)]
pub struct Conformer<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> Conformer<'a> {
    /// Creates a conformer quoting identifiers with `dialect`.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Conforms `input` for `clause`.
    pub fn conform(
        &self,
        clause: ClauseKind,
        input: Input,
        call: &FieldOptions,
    ) -> Result<Fragment> {
        match input {
            Input::Overridden(inner, options) => {
                self.conform(clause, *inner, &call.clone().merged(&options))
            }
            Input::Literal(sql) => Ok(pass_through(Fragment::raw(sql), call)),
            Input::Fragment(fragment) => Ok(pass_through(fragment, call)),
            Input::SubQuery(builder) => {
                let statement = builder.build()?;
                let fragment = if statement.kind() == StatementKind::Raw {
                    Fragment::from(statement).parenthesize()
                } else {
                    Fragment::from(statement)
                };
                Ok(pass_through(fragment, call))
            }
            Input::Id(id) if clause.is_condition() => {
                self.field(clause, "id", None, Value::from(id), call)
            }
            Input::Condition {
                field,
                comparator,
                value,
            } if clause == ClauseKind::Insert => {
                if comparator.as_deref().is_some_and(|c| c != "=") {
                    return Err(ConstructionError::UnrecognizedArgument {
                        clause: clause.name(),
                        found: format!("comparator {comparator:?}"),
                    });
                }
                self.insert_rows(vec![Fields::new().with(field, value)], call)
            }
            Input::Condition {
                field,
                comparator,
                value,
            } => self.field(clause, &field, comparator.as_deref(), value, call),
            Input::Params(fields) if clause == ClauseKind::Insert => {
                self.insert_rows(vec![fields], call)
            }
            Input::Rows(rows) if clause == ClauseKind::Insert => self.insert_rows(rows, call),
            Input::Params(fields) => {
                let combinator = if clause.is_condition() {
                    Combinator::And
                } else {
                    Combinator::Comma
                };
                let fragments = fields
                    .into_iter()
                    .map(|(field, value)| self.field(clause, &field, None, value, call))
                    .collect::<Result<Vec<_>>>()?;
                Fragment::combine(fragments, combinator)
            }
            Input::Rows(_) => Err(ConstructionError::UnrecognizedArgument {
                clause: clause.name(),
                found: String::from("list of mappings"),
            }),
            Input::Id(_) => Err(ConstructionError::UnrecognizedArgument {
                clause: clause.name(),
                found: String::from("integer"),
            }),
        }
    }

    /// Quotes an identifier with the active dialect.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    fn resolve(&self, field: &str, call: &FieldOptions) -> Result<IndicatedField> {
        let indicated = parse_field(field)?;
        let options = call.clone().merged(&indicated.options);
        options.validate(field)?;
        Ok(IndicatedField {
            name: indicated.name,
            options,
        })
    }

    fn field(
        &self,
        clause: ClauseKind,
        field: &str,
        positional: Option<&str>,
        value: Value,
        call: &FieldOptions,
    ) -> Result<Fragment> {
        let IndicatedField { name, options } = self.resolve(field, call)?;
        let comparator = options.comparator.as_deref().or(positional).unwrap_or("=");
        let column = self.dialect.quote_identifier(&name);

        if clause.is_condition() {
            let fragment = self.compare(&name, &column, comparator, value, &options)?;
            return Ok(if options.not { fragment.negate() } else { fragment });
        }

        if options.not {
            return Err(ConstructionError::InvalidIndicator {
                field: field.to_owned(),
                reason: "negation only applies to conditions",
            });
        }
        match value {
            Value::List(_) | Value::Map(_) => {
                Err(ConstructionError::NonConformingValue { field: name })
            }
            Value::Scalar(SqlValue::Null) if !options.raw => {
                Ok(Fragment::raw(format!("{column} = NULL")))
            }
            Value::Scalar(v) => Ok(self.scalar(&column, comparator, v, &options)),
        }
    }

    fn compare(
        &self,
        name: &str,
        column: &str,
        comparator: &str,
        value: Value,
        options: &FieldOptions,
    ) -> Result<Fragment> {
        match value {
            Value::List(items) => self.in_list(name, column, comparator, items, options),
            Value::Map(_) => Err(ConstructionError::KeyedInList {
                field: name.to_owned(),
            }),
            Value::Scalar(SqlValue::Null) if !options.raw && !options.identity => {
                let test = if is_negative(comparator) {
                    "IS NOT NULL"
                } else {
                    "IS NULL"
                };
                Ok(Fragment::raw(format!("{column} {test}")))
            }
            Value::Scalar(v) => Ok(self.scalar(column, comparator, v, options)),
        }
    }

    fn scalar(
        &self,
        column: &str,
        comparator: &str,
        value: SqlValue,
        options: &FieldOptions,
    ) -> Fragment {
        if options.raw {
            Fragment::raw(format!("{column} {comparator} {}", value.to_text()))
        } else if options.identity {
            let target = self.dialect.quote_identifier(&value.to_text());
            Fragment::raw(format!("{column} {comparator} {target}"))
        } else {
            let placeholder = self.dialect.parameter_placeholder();
            Fragment::new(format!("{column} {comparator} {placeholder}"), vec![value])
        }
    }

    fn in_list(
        &self,
        name: &str,
        column: &str,
        comparator: &str,
        items: Vec<Value>,
        options: &FieldOptions,
    ) -> Result<Fragment> {
        if items.is_empty() {
            return Err(ConstructionError::EmptyInList {
                field: name.to_owned(),
            });
        }
        let keyword = if is_negative(comparator) { "NOT IN" } else { "IN" };
        let values = items
            .into_iter()
            .map(Value::into_scalar)
            .collect::<Result<Vec<_>>>()?;

        if options.raw || options.identity {
            let list = values
                .iter()
                .map(|v| {
                    if options.raw {
                        v.to_text()
                    } else {
                        self.dialect.quote_identifier(&v.to_text())
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Fragment::raw(format!("{column} {keyword} ({list})")));
        }

        let placeholders = vec![self.dialect.parameter_placeholder(); values.len()].join(", ");
        Ok(Fragment::new(
            format!("{column} {keyword} ({placeholders})"),
            values,
        ))
    }

    /// Builds `(cols) VALUES (…), (…)`; the first row's keys set the columns.
    fn insert_rows(&self, rows: Vec<Fields>, call: &FieldOptions) -> Result<Fragment> {
        let Some(first) = rows.first().filter(|row| !row.is_empty()) else {
            return Err(ConstructionError::NoPayload("insert"));
        };
        let columns = first
            .keys()
            .map(|key| Ok(self.dialect.quote_identifier(&parse_field(key)?.name)))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let placeholder = self.dialect.parameter_placeholder();
        let mut tuples = Vec::with_capacity(rows.len());
        let mut params = Vec::new();
        for row in rows {
            let mut slots = Vec::with_capacity(row.len());
            for (key, value) in row {
                let IndicatedField { name, options } = self.resolve(&key, call)?;
                if options.not {
                    return Err(ConstructionError::InvalidIndicator {
                        field: key,
                        reason: "negation only applies to conditions",
                    });
                }
                let value = match value {
                    Value::Scalar(v) => v,
                    Value::List(_) | Value::Map(_) => {
                        return Err(ConstructionError::NonConformingValue { field: name });
                    }
                };
                if options.raw {
                    slots.push(value.to_text());
                } else if value.is_null() {
                    slots.push(String::from("NULL"));
                } else if options.identity {
                    slots.push(self.dialect.quote_identifier(&value.to_text()));
                } else {
                    slots.push(placeholder.to_owned());
                    params.push(value);
                }
            }
            tuples.push(format!("({})", slots.join(", ")));
        }

        Ok(Fragment::new(
            format!("({columns})\nVALUES {}", tuples.join(", ")),
            params,
        ))
    }
}

fn pass_through(fragment: Fragment, call: &FieldOptions) -> Fragment {
    if call.not { fragment.negate() } else { fragment }
}

fn is_negative(comparator: &str) -> bool {
    matches!(comparator.trim(), "!=" | "<>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::fields;

    fn conform(clause: ClauseKind, input: impl Into<Input>) -> Result<Fragment> {
        Conformer::new(&GenericDialect).conform(clause, input.into(), &FieldOptions::default())
    }

    #[test]
    fn test_literal_passes_through() {
        let f = conform(ClauseKind::Where, "a = b").unwrap();
        assert_eq!(f.sql(), "a = b");
        assert!(f.params().is_empty());
    }

    #[test]
    fn test_mapping_is_and_joined() {
        let f = conform(ClauseKind::Where, fields! { "a" => 1, "b" => "x" }).unwrap();
        assert_eq!(f.sql(), "\"a\" = ?\n\tAND \"b\" = ?");
        assert_eq!(
            f.params(),
            &[SqlValue::Int(1), SqlValue::Text(String::from("x"))]
        );
    }

    #[test]
    fn test_id_shorthand() {
        let f = conform(ClauseKind::Where, 7).unwrap();
        assert_eq!(f.sql(), "\"id\" = ?");
        assert_eq!(f.params(), &[SqlValue::Int(7)]);
    }

    #[test]
    fn test_custom_comparator() {
        let f = conform(ClauseKind::Where, ("age", ">=", 18)).unwrap();
        assert_eq!(f.sql(), "\"age\" >= ?");
        let f = conform(ClauseKind::Where, ("?LIKE?name", "a%")).unwrap();
        assert_eq!(f.sql(), "\"name\" LIKE ?");
    }

    #[test]
    fn test_in_list() {
        let f = conform(ClauseKind::Where, ("id", vec![3, 1, 2])).unwrap();
        assert_eq!(f.sql(), "\"id\" IN (?, ?, ?)");
        assert_eq!(
            f.params(),
            &[SqlValue::Int(3), SqlValue::Int(1), SqlValue::Int(2)]
        );
        let f = conform(ClauseKind::Where, ("id", "<>", vec![1])).unwrap();
        assert_eq!(f.sql(), "\"id\" NOT IN (?)");
    }

    #[test]
    fn test_in_list_raw_and_identity() {
        let f = conform(ClauseKind::Where, ("\"id", vec![1, 2])).unwrap();
        assert_eq!(f.sql(), "\"id\" IN (1, 2)");
        let f = conform(ClauseKind::Where, (":a", vec!["b", "c"])).unwrap();
        assert_eq!(f.sql(), "\"a\" IN (\"b\", \"c\")");
    }

    #[test]
    fn test_empty_in_list_rejected() {
        let err = conform(ClauseKind::Where, ("id", Vec::<i64>::new())).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::EmptyInList {
                field: String::from("id")
            }
        );
    }

    #[test]
    fn test_keyed_map_in_list_rejected() {
        let err = conform(ClauseKind::Where, ("id", fields! { "x" => 1 })).unwrap_err();
        assert!(matches!(err, ConstructionError::KeyedInList { .. }));
    }

    #[test]
    fn test_null_where_and_update() {
        let f = conform(ClauseKind::Where, ("deleted", Value::NULL)).unwrap();
        assert_eq!(f.sql(), "\"deleted\" IS NULL");
        assert!(f.params().is_empty());
        let f = conform(ClauseKind::Where, ("deleted", "!=", Value::NULL)).unwrap();
        assert_eq!(f.sql(), "\"deleted\" IS NOT NULL");
        let f = conform(ClauseKind::Update, fields! { "deleted" => Value::NULL }).unwrap();
        assert_eq!(f.sql(), "\"deleted\" = NULL");
    }

    #[test]
    fn test_not_identity_binds_nothing() {
        let f = conform(ClauseKind::Where, ("!:owner", 5)).unwrap();
        assert_eq!(f.sql(), "NOT ( \"owner\" = \"5\" )");
        assert!(f.params().is_empty());
    }

    #[test]
    fn test_call_options_apply_to_each_field() {
        let input = Input::from(fields! { "a" => 1, "b" => 2 }).with_options(FieldOptions::not());
        let f = Conformer::new(&GenericDialect)
            .conform(ClauseKind::Where, input, &FieldOptions::default())
            .unwrap();
        assert_eq!(f.sql(), "NOT ( \"a\" = ? )\n\tAND NOT ( \"b\" = ? )");
    }

    #[test]
    fn test_update_mapping_is_comma_joined() {
        let f = conform(ClauseKind::Update, fields! { "a" => 1, "\"b" => "b + 1" }).unwrap();
        assert_eq!(f.sql(), "\"a\" = ?, \"b\" = b + 1");
        assert_eq!(f.params(), &[SqlValue::Int(1)]);
    }

    #[test]
    fn test_update_rejects_list() {
        let err = conform(ClauseKind::Update, fields! { "a" => vec![1, 2] }).unwrap_err();
        assert!(matches!(err, ConstructionError::NonConformingValue { .. }));
    }

    #[test]
    fn test_insert_rows() {
        let rows = vec![fields! { "a" => 1, "b" => 2 }, fields! { "a" => 3, "b" => 4 }];
        let f = conform(ClauseKind::Insert, rows).unwrap();
        assert_eq!(f.sql(), "(\"a\", \"b\")\nVALUES (?, ?), (?, ?)");
        assert_eq!(
            f.params(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
    }

    #[test]
    fn test_insert_null_and_raw() {
        let f = conform(
            ClauseKind::Insert,
            fields! { "a" => Value::NULL, "\"b" => "CURRENT_TIMESTAMP" },
        )
        .unwrap();
        assert_eq!(f.sql(), "(\"a\", \"b\")\nVALUES (NULL, CURRENT_TIMESTAMP)");
        assert!(f.params().is_empty());
    }

    #[test]
    fn test_from_args_shapes() {
        let input = Input::from_args(vec![Value::from("a"), Value::from(1)]).unwrap();
        assert!(matches!(input, Input::Condition { comparator: None, .. }));
        let input =
            Input::from_args(vec![Value::from("a"), Value::from(">"), Value::from(1)]).unwrap();
        assert!(matches!(input, Input::Condition { comparator: Some(_), .. }));
        let err = Input::from_args(vec![Value::from(1); 5]).unwrap_err();
        assert_eq!(err, ConstructionError::BadArgumentCount(5));
    }

    #[test]
    fn test_from_value_list_is_positional() {
        let input = Input::from_value(Value::from(vec!["a", "!=", "b"])).unwrap();
        let f = Conformer::new(&GenericDialect)
            .conform(ClauseKind::Where, input, &FieldOptions::default())
            .unwrap();
        assert_eq!(f.sql(), "\"a\" != ?");
    }

    #[test]
    fn test_from_args_with_options() {
        let options = Value::Map(fields! { "identity" => true });
        let input =
            Input::from_args(vec![Value::from("a"), Value::from("="), Value::from("b"), options])
                .unwrap();
        let f = Conformer::new(&GenericDialect)
            .conform(ClauseKind::Where, input, &FieldOptions::default())
            .unwrap();
        assert_eq!(f.sql(), "\"a\" = \"b\"");
    }
}

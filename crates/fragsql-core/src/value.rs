//! SQL values and loosely-typed caller input.
//!
//! [`SqlValue`] is the only thing that ever reaches a bound parameter list.
//! [`Value`] is what callers hand to clause methods: a scalar, a list (for
//! IN comparisons and multi-row inserts) or a field mapping. Compound values
//! are rejected before they can become parameters.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::ser::{Serialize, Serializer};

use crate::error::{ConstructionError, Result};

/// A SQL value that can be used as a parameter.
///
/// All values are bound positionally; none is ever written into SQL text
/// unless the caller explicitly asked for raw or identity treatment.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: only for diagnostics. Statements always bind parameters.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Returns the value as bare text, without quoting or escaping.
    ///
    /// This is what raw and identity field options consume.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            other => other.to_sql_inline(),
        }
    }

    /// Returns true for integers and floats.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns true for NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => f.write_str(&other.to_sql_inline()),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.to_rfc3339())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d").to_string())
    }
}

/// Loosely-typed caller input: a scalar, a list, or a field mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single bindable value.
    Scalar(SqlValue),
    /// An ordered list (IN comparisons, rows, positional argument lists).
    List(Vec<Value>),
    /// An ordered field → value mapping.
    Map(Fields),
}

impl Value {
    /// The NULL scalar.
    pub const NULL: Self = Self::Scalar(SqlValue::Null);

    /// Converts to a bindable scalar, rejecting lists and mappings.
    pub fn into_scalar(self) -> Result<SqlValue> {
        match self {
            Self::Scalar(v) => Ok(v),
            other => Err(ConstructionError::NonScalarParameter {
                value: format!("{other:?}"),
            }),
        }
    }

    /// Returns the scalar if this is one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&SqlValue> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true for the NULL scalar.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(SqlValue::Null))
    }

    /// Short description of the value's shape for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(SqlValue::Null) => "null",
            Self::Scalar(SqlValue::Bool(_)) => "boolean",
            Self::Scalar(SqlValue::Int(_)) => "integer",
            Self::Scalar(SqlValue::Float(_)) => "float",
            Self::Scalar(SqlValue::Text(_)) => "string",
            Self::Scalar(SqlValue::Blob(_)) => "blob",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Scalar(v.to_sql_value())
                }
            }
        )*
    };
}

impl_from_scalar!(
    SqlValue,
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &str,
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::NULL, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Map(fields)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::NULL,
            Json::Bool(b) => Self::Scalar(SqlValue::Bool(b)),
            Json::Number(n) => Self::Scalar(
                n.as_i64()
                    .map(SqlValue::Int)
                    .or_else(|| n.as_f64().map(SqlValue::Float))
                    .unwrap_or(SqlValue::Null),
            ),
            Json::String(s) => Self::Scalar(SqlValue::Text(s)),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Map(map.into_iter().collect()),
        }
    }
}

/// An ordered field → value mapping.
///
/// Field names may carry indicator prefixes (see [`crate::conform`]).
/// Setting an existing key replaces its value in place, keeping the
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a field, returning the mapping.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field in place.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == field) {
            Some(slot) => slot.1 = value,
            None => self.0.push((field, value)),
        }
    }

    /// Looks up a field by its exact (prefixed) name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds a [`Fields`] mapping.
///
/// ```rust
/// use fragsql_core::fields;
///
/// let row = fields! { "name" => "Alice", "!status" => "banned" };
/// assert_eq!(row.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with($key, $value))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_null() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_sql_value_inline_blob() {
        assert_eq!(
            SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]).to_sql_inline(),
            "X'48454C4C4F'"
        );
    }

    #[test]
    fn test_to_text_is_unescaped() {
        assert_eq!(SqlValue::Text(String::from("a'b")).to_text(), "a'b");
        assert_eq!(SqlValue::Int(5).to_text(), "5");
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 2).map(ToSqlValue::to_sql_value),
            Some(SqlValue::Text(String::from("2024-01-02")))
        );
    }

    #[test]
    fn test_value_into_scalar_rejects_compound() {
        assert_eq!(Value::from(3).into_scalar(), Ok(SqlValue::Int(3)));
        let err = Value::from(vec![1, 2]).into_scalar().unwrap_err();
        assert!(matches!(err, ConstructionError::NonScalarParameter { .. }));
    }

    #[test]
    fn test_fields_keep_order_and_replace() {
        let f = fields! { "b" => 1, "a" => 2, "b" => 3 };
        assert_eq!(f.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(f.get("b"), Some(&Value::from(3)));
    }

    #[test]
    fn test_value_from_json_preserves_key_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"z": 1, "a": [1, 2.5], "m": null}"#).unwrap();
        let Value::Map(fields) = Value::from(json) else {
            panic!("expected a mapping");
        };
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(
            fields.get("a"),
            Some(&Value::List(vec![
                Value::Scalar(SqlValue::Int(1)),
                Value::Scalar(SqlValue::Float(2.5)),
            ]))
        );
        assert!(fields.get("m").is_some_and(Value::is_null));
    }

    #[test]
    fn test_sql_value_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            SqlValue::Null,
            SqlValue::Int(1),
            SqlValue::Text(String::from("x")),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,"x"]"#);
    }
}

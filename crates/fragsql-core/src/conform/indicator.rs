//! Field-name indicator prefixes.
//!
//! A field name in a mapping or condition may start with flags:
//!
//! | Prefix | Meaning |
//! |---|---|
//! | `"` | the value is raw SQL text, inserted unescaped |
//! | `!` | wrap the comparison in `NOT ( … )` |
//! | `:` | the value is an identifier, quoted instead of bound |
//! | `?cmp?` | compare with `cmp` instead of `=` |
//!
//! Flags combine (`!:owner`), with `?cmp?` last since everything up to its
//! closing `?` is the comparator. They are parsed once into
//! [`FieldOptions`] and never looked at again.

use crate::error::{ConstructionError, Result};
use crate::value::{SqlValue, Value};

/// How one field's value is turned into SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Insert the value as literal SQL text.
    pub raw: bool,
    /// Negate the comparison.
    pub not: bool,
    /// Quote the value as an identifier.
    pub identity: bool,
    /// Comparator replacing the positional one.
    pub comparator: Option<String>,
}

impl FieldOptions {
    /// Options with the raw flag.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            raw: true,
            ..Self::default()
        }
    }

    /// Options with the not flag.
    #[must_use]
    pub fn not() -> Self {
        Self {
            not: true,
            ..Self::default()
        }
    }

    /// Options with the identity flag.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            identity: true,
            ..Self::default()
        }
    }

    /// Options with a custom comparator.
    #[must_use]
    pub fn compare(comparator: impl Into<String>) -> Self {
        Self {
            comparator: Some(comparator.into()),
            ..Self::default()
        }
    }

    /// Adds the flags of `other`; its comparator wins when set.
    #[must_use]
    pub fn merged(self, other: &Self) -> Self {
        Self {
            raw: self.raw || other.raw,
            not: self.not || other.not,
            identity: self.identity || other.identity,
            comparator: other.comparator.clone().or(self.comparator),
        }
    }

    /// Rejects raw together with identity.
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.raw && self.identity {
            return Err(ConstructionError::InvalidIndicator {
                field: field.to_owned(),
                reason: "raw and identity cannot both apply",
            });
        }
        Ok(())
    }
}

impl TryFrom<Value> for FieldOptions {
    type Error = ConstructionError;

    /// Reads an options mapping such as `{"raw": true, "compare": ">"}`.
    fn try_from(value: Value) -> Result<Self> {
        let Value::Map(fields) = value else {
            return Err(ConstructionError::UnrecognizedArgument {
                clause: "options",
                found: value.kind().to_owned(),
            });
        };
        let mut options = Self::default();
        for (key, value) in fields {
            match (key.as_str(), value) {
                ("raw", Value::Scalar(SqlValue::Bool(b))) => options.raw = b,
                ("not", Value::Scalar(SqlValue::Bool(b))) => options.not = b,
                ("identity", Value::Scalar(SqlValue::Bool(b))) => options.identity = b,
                ("compare", Value::Scalar(SqlValue::Text(c))) => options.comparator = Some(c),
                (other, _) => {
                    return Err(ConstructionError::UnrecognizedArgument {
                        clause: "options",
                        found: other.to_owned(),
                    });
                }
            }
        }
        Ok(options)
    }
}

/// A field name with its indicators stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatedField {
    /// The bare field name.
    pub name: String,
    /// Options carried by the prefix.
    pub options: FieldOptions,
}

/// Strips indicator prefixes from `field`.
///
/// Repeated flags, raw together with identity, an unterminated comparator
/// and an empty remaining name are all rejected.
pub fn parse_field(field: &str) -> Result<IndicatedField> {
    let invalid = |reason| ConstructionError::InvalidIndicator {
        field: field.to_owned(),
        reason,
    };

    let mut options = FieldOptions::default();
    let mut rest = field;
    loop {
        let flag = match rest.chars().next() {
            Some('"') => &mut options.raw,
            Some('!') => &mut options.not,
            Some(':') => &mut options.identity,
            _ => break,
        };
        if *flag {
            return Err(invalid("repeated indicator"));
        }
        *flag = true;
        rest = &rest[1..];
    }

    if let Some(after) = rest.strip_prefix('?') {
        let Some((comparator, name)) = after.split_once('?') else {
            return Err(invalid("comparator is missing its closing `?`"));
        };
        if comparator.trim().is_empty() {
            return Err(invalid("comparator is empty"));
        }
        options.comparator = Some(comparator.trim().to_owned());
        rest = name;
    }

    if rest.is_empty() {
        return Err(invalid("no field name after indicators"));
    }
    options.validate(field)?;

    Ok(IndicatedField {
        name: rest.to_owned(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field() {
        let f = parse_field("name").unwrap();
        assert_eq!(f.name, "name");
        assert_eq!(f.options, FieldOptions::default());
    }

    #[test]
    fn test_not_identity() {
        let f = parse_field("!:owner").unwrap();
        assert_eq!(f.name, "owner");
        assert!(f.options.not);
        assert!(f.options.identity);
        assert!(!f.options.raw);
    }

    #[test]
    fn test_comparator_last() {
        let f = parse_field("!?>=?age").unwrap();
        assert_eq!(f.name, "age");
        assert!(f.options.not);
        assert_eq!(f.options.comparator.as_deref(), Some(">="));
    }

    #[test]
    fn test_raw_field() {
        let f = parse_field("\"updated").unwrap();
        assert_eq!(f.name, "updated");
        assert!(f.options.raw);
    }

    #[test]
    fn test_raw_and_identity_rejected() {
        let err = parse_field("\":x").unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidIndicator { .. }));
    }

    #[test]
    fn test_repeated_flag_rejected() {
        assert!(parse_field("!!x").is_err());
    }

    #[test]
    fn test_unterminated_comparator_rejected() {
        assert!(parse_field("?>age").is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(parse_field("!").is_err());
        assert!(parse_field("?<?").is_err());
    }

    #[test]
    fn test_merged_prefers_indicator_comparator() {
        let merged = FieldOptions::compare("<").merged(&FieldOptions::compare(">"));
        assert_eq!(merged.comparator.as_deref(), Some(">"));
        let merged = FieldOptions::not().merged(&FieldOptions::default());
        assert!(merged.not);
    }

    #[test]
    fn test_options_from_value() {
        let value = Value::Map(crate::fields! { "raw" => true, "compare" => "LIKE" });
        let options = FieldOptions::try_from(value).unwrap();
        assert!(options.raw);
        assert_eq!(options.comparator.as_deref(), Some("LIKE"));
    }
}

//! SQL text paired with its ordered bind parameters.
//!
//! A [`Fragment`] is the unit every clause method produces and every
//! statement is assembled from. Combination never interpolates values: the
//! texts are joined with a separator and the parameter lists are
//! concatenated in the same order.

use std::fmt;

use crate::error::Result;
use crate::value::{SqlValue, Value};

/// Separator used when joining fragment texts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Combinator {
    /// `"\n"`
    #[default]
    Newline,
    /// `"\n\tAND "`
    And,
    /// `"\n\tOR "`
    Or,
    /// `", "`
    Comma,
    /// `" "`
    Space,
    /// Any other separator, used verbatim.
    Separator(String),
}

impl Combinator {
    /// Returns the separator text.
    #[must_use]
    pub fn separator(&self) -> &str {
        match self {
            Self::Newline => "\n",
            Self::And => "\n\tAND ",
            Self::Or => "\n\tOR ",
            Self::Comma => ", ",
            Self::Space => " ",
            Self::Separator(s) => s,
        }
    }
}

impl From<&str> for Combinator {
    /// `"and"` and `"or"` (any case, surrounding whitespace ignored) map to
    /// the logical separators; anything else is used verbatim.
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Self::And,
            "or" => Self::Or,
            _ if s == "\n" => Self::Newline,
            _ => Self::Separator(s.to_owned()),
        }
    }
}

impl From<Option<&str>> for Combinator {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Newline, Self::from)
    }
}

/// An immutable SQL text / parameter list pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    sql: String,
    params: Vec<SqlValue>,
}

impl Fragment {
    /// Creates a fragment from text and already-scalar parameters.
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Creates a fragment with no parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Creates a fragment from loosely-typed parameters, rejecting any list
    /// or mapping.
    pub fn bound(sql: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let params = values
            .into_iter()
            .map(Value::into_scalar)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sql, params))
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Splits into text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }

    /// True when the text is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }

    /// Wraps the text as `NOT ( … )`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self {
            sql: format!("NOT ( {} )", self.sql),
            params: self.params,
        }
    }

    /// Wraps the text as `( … )`.
    #[must_use]
    pub fn parenthesize(self) -> Self {
        Self {
            sql: format!("( {} )", self.sql),
            params: self.params,
        }
    }

    /// Prefixes the text, keeping parameters.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        Self {
            sql: format!("{prefix}{}", self.sql),
            params: self.params,
        }
    }

    /// Counts `?` placeholders outside quoted strings and identifiers.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut quote: Option<char> = None;
        for c in self.sql.chars() {
            match (quote, c) {
                (None, '\'' | '"' | '`') => quote = Some(c),
                (Some(q), c) if c == q => quote = None,
                (None, '?') => count += 1,
                _ => {}
            }
        }
        count
    }

    /// Appends another fragment's text after `separator` and its parameters
    /// after ours.
    pub fn append(&mut self, other: Self, separator: &str) {
        if other.sql.is_empty() {
            self.params.extend(other.params);
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push_str(separator);
        }
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Normalizes one fragment-like input.
    ///
    /// Bare text becomes a parameterless fragment. A sequence of parts has
    /// its texts joined with `combinator` and its parameter lists merged in
    /// encounter order. A fragment is returned unchanged.
    pub fn conform(
        input: impl Into<FragmentInput>,
        combinator: impl Into<Combinator>,
    ) -> Result<Self> {
        match input.into() {
            FragmentInput::Text(sql) => Ok(Self::raw(sql)),
            FragmentInput::Fragment(fragment) => Ok(fragment),
            FragmentInput::Parts(parts) => {
                let combinator = combinator.into();
                let mut texts: Vec<String> = Vec::new();
                let mut params = Vec::new();
                for part in parts {
                    match part {
                        Part::Sql(sql) => texts.push(sql),
                        Part::Params(values) => {
                            for value in values {
                                params.push(value.into_scalar()?);
                            }
                        }
                        Part::Fragment(fragment) => {
                            let (sql, more) = fragment.into_parts();
                            texts.push(sql);
                            params.extend(more);
                        }
                    }
                }
                Ok(Self::new(texts.join(combinator.separator()), params))
            }
        }
    }

    /// Conforms each item and joins them with `combinator`.
    ///
    /// Items with empty text contribute only their parameters, so
    /// `combine([f], _)` is always `f`.
    pub fn combine<I, T>(items: I, combinator: impl Into<Combinator>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<FragmentInput>,
    {
        let combinator = combinator.into();
        let separator = combinator.separator();
        let mut combined = Self::default();
        for item in items {
            let fragment = Self::conform(item, Combinator::Newline)?;
            combined.append(fragment, separator);
        }
        Ok(combined)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// One element of a fragment-like sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// SQL text.
    Sql(String),
    /// Parameters to merge, validated as scalars on conform.
    Params(Vec<Value>),
    /// A built fragment.
    Fragment(Fragment),
}

impl From<&str> for Part {
    fn from(s: &str) -> Self {
        Self::Sql(s.to_owned())
    }
}

impl From<String> for Part {
    fn from(s: String) -> Self {
        Self::Sql(s)
    }
}

impl From<Vec<Value>> for Part {
    fn from(values: Vec<Value>) -> Self {
        Self::Params(values)
    }
}

impl From<Fragment> for Part {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

/// Anything [`Fragment::conform`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentInput {
    /// Bare SQL text, no parameters.
    Text(String),
    /// Interleaved texts and parameter lists.
    Parts(Vec<Part>),
    /// An already-built fragment.
    Fragment(Fragment),
}

impl From<&str> for FragmentInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FragmentInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for FragmentInput {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<Fragment> for FragmentInput {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<&Fragment> for FragmentInput {
    fn from(fragment: &Fragment) -> Self {
        Self::Fragment(fragment.clone())
    }
}

impl From<Vec<Part>> for FragmentInput {
    fn from(parts: Vec<Part>) -> Self {
        Self::Parts(parts)
    }
}

impl<S, V> From<(S, Vec<V>)> for FragmentInput
where
    S: Into<String>,
    V: Into<Value>,
{
    fn from((sql, values): (S, Vec<V>)) -> Self {
        Self::Parts(vec![
            Part::Sql(sql.into()),
            Part::Params(values.into_iter().map(Into::into).collect()),
        ])
    }
}

//! Formatting of SELECT targets, ORDER BY / GROUP BY specs and joins.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;
use crate::fragment::Fragment;

static IDENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("valid identity pattern"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid number pattern"));

/// True when `token` looks like a (possibly dotted) column or table name
/// rather than a number or an expression.
#[must_use]
pub fn could_be_identity(token: &str) -> bool {
    IDENTITY.is_match(token) && !NUMBER.is_match(token)
}

/// Quotes `token` if it is an identifier, or quotes only the leading
/// identifier of `name alias` / `name AS alias`. Anything else passes
/// through unchanged.
#[must_use]
pub fn possibly_quote_identity(dialect: &dyn Dialect, token: &str) -> String {
    if could_be_identity(token) {
        return dialect.quote_identifier(token);
    }
    let parts: Vec<&str> = token.split(' ').collect();
    if matches!(parts.len(), 2 | 3) && could_be_identity(parts[0]) {
        let mut quoted = dialect.quote_identifier(parts[0]);
        for part in &parts[1..] {
            quoted.push(' ');
            quoted.push_str(part);
        }
        return quoted;
    }
    token.to_owned()
}

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// A column with a direction.
    Column {
        /// Column to order by
        column: String,
        /// Order direction
        direction: OrderDirection,
    },
    /// An expression used verbatim.
    Expr(String),
}

impl OrderBy {
    /// Creates a new ascending order specification.
    #[must_use]
    pub fn asc(column: &str) -> Self {
        Self::Column {
            column: column.to_string(),
            direction: OrderDirection::Asc,
        }
    }

    /// Creates a new descending order specification.
    #[must_use]
    pub fn desc(column: &str) -> Self {
        Self::Column {
            column: column.to_string(),
            direction: OrderDirection::Desc,
        }
    }

    /// Parses an order specification.
    ///
    /// `"name"` is ascending, `"-name"` descending, `"name desc"` takes the
    /// given direction; anything else is kept as an expression.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if let Some(column) = spec.strip_prefix('-') {
            if could_be_identity(column) {
                return Self::desc(column);
            }
        }
        let parts: Vec<&str> = spec.split_whitespace().collect();
        match parts.as_slice() {
            [column] => Self::asc(column),
            [column, direction] if direction.eq_ignore_ascii_case("asc") => Self::asc(column),
            [column, direction] if direction.eq_ignore_ascii_case("desc") => Self::desc(column),
            _ => Self::Expr(spec.to_owned()),
        }
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        match self {
            Self::Column { column, direction } => format!(
                "{} {}",
                possibly_quote_identity(dialect, column),
                direction.as_sql()
            ),
            Self::Expr(expr) => expr.clone(),
        }
    }
}

/// Kind of join.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `NATURAL JOIN`
    #[default]
    Natural,
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `FULL JOIN`
    Full,
    /// `CROSS JOIN`
    Cross,
    /// Any other join keyword, e.g. `LEFT OUTER`.
    Custom(String),
}

impl JoinType {
    /// Returns the full join keyword.
    #[must_use]
    pub fn keyword(&self) -> String {
        match self {
            Self::Natural => String::from("NATURAL JOIN"),
            Self::Inner => String::from("INNER JOIN"),
            Self::Left => String::from("LEFT JOIN"),
            Self::Right => String::from("RIGHT JOIN"),
            Self::Full => String::from("FULL JOIN"),
            Self::Cross => String::from("CROSS JOIN"),
            Self::Custom(kind) => format!("{} JOIN", kind.trim().to_ascii_uppercase()),
        }
    }
}

/// A rendered join.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Join {
    pub(crate) kind: Option<JoinType>,
    pub(crate) target: Fragment,
    pub(crate) on: Option<Fragment>,
}

impl Join {
    /// `KIND JOIN target[ ON condition]`, or the target alone for a
    /// fully written join.
    pub(crate) fn into_fragment(self) -> Fragment {
        let mut fragment = match self.kind {
            Some(kind) => self.target.prefixed(&format!("{} ", kind.keyword())),
            None => self.target,
        };
        if let Some(on) = self.on {
            fragment.append(on.prefixed("ON "), " ");
        }
        fragment
    }
}

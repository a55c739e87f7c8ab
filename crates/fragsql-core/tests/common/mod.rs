#![allow(dead_code)]

use fragsql_core::{
    ConstructionError, Fragment, QueryBuilder, SqlValue, Statement, StatementKind,
};

pub fn build(builder: QueryBuilder) -> Statement {
    builder
        .build()
        .unwrap_or_else(|e| panic!("Failed to build statement: {e}"))
}

pub fn build_err(builder: QueryBuilder) -> ConstructionError {
    builder.build().expect_err("Expected a construction error")
}

pub fn build_select(builder: QueryBuilder) -> Statement {
    let statement = build(builder);
    assert_eq!(statement.kind(), StatementKind::Select, "{}", statement.sql());
    statement
}

/// The text after the first `WHERE `, up to the next clause line.
pub fn where_text(statement: &Statement) -> String {
    let sql = statement.sql();
    let start = sql
        .find("WHERE ")
        .unwrap_or_else(|| panic!("No WHERE in: {sql}"))
        + "WHERE ".len();
    let rest = &sql[start..];
    let end = ["\nGROUP BY", "\nHAVING", "\nORDER BY", "\nLIMIT", "\nOFFSET"]
        .iter()
        .filter_map(|k| rest.find(k))
        .min()
        .unwrap_or(rest.len());
    rest[..end].to_string()
}

pub fn ints(values: &[i64]) -> Vec<SqlValue> {
    values.iter().copied().map(SqlValue::Int).collect()
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// Every placeholder has exactly one parameter.
pub fn assert_balanced(fragment: &Fragment) {
    assert_eq!(
        fragment.placeholder_count(),
        fragment.params().len(),
        "unbalanced fragment: {}",
        fragment.sql()
    );
}

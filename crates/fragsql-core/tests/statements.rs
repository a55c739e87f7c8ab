//! Tests for statement assembly: fragment round-trips, IN arity, the
//! risky brake, grouping, indicators, multi-row inserts and null handling.

mod common;
use common::*;

use fragsql_core::{
    fields, Combinator, ConstructionError, Fragment, MysqlDialect, QueryBuilder, SqlValue,
    StatementKind, Value,
};
use std::sync::Arc;

#[test]
fn combine_single_fragment_round_trips() {
    let fragments = [
        Fragment::raw("a = 1"),
        Fragment::new("a = ? AND b IN (?, ?)", ints(&[1, 2, 3])),
        Fragment::new("name LIKE ?", vec![text("x%")]),
    ];
    for f in fragments {
        for sep in [
            Combinator::Newline,
            Combinator::And,
            Combinator::Or,
            Combinator::Comma,
            Combinator::Separator(String::from(" UNION ")),
        ] {
            assert_eq!(Fragment::combine([f.clone()], sep).unwrap(), f);
        }
    }
}

#[test]
fn combine_concatenates_text_and_params() {
    let a = Fragment::new("a = ?", ints(&[1]));
    let b = Fragment::new("b = ? OR c = ?", ints(&[2, 3]));
    let f = Fragment::combine([a.clone(), b.clone()], "and").unwrap();
    assert_eq!(f.sql(), format!("{}\n\tAND {}", a.sql(), b.sql()));
    assert_eq!(f.params(), ints(&[1, 2, 3]).as_slice());
}

#[test]
fn in_list_arity_matches_input() {
    for n in 1..=12_i64 {
        let values: Vec<i64> = (0..n).rev().collect();
        let s = build(QueryBuilder::new().from("t").where_eq("id", values.clone()));
        let wheres = where_text(&s);
        assert_eq!(wheres.matches('?').count(), values.len());
        assert_eq!(s.params(), ints(&values).as_slice());
    }
}

#[test]
fn update_without_where_is_refused() {
    let err = build_err(QueryBuilder::new().from("t").update(fields! { "x" => 1 }));
    assert_eq!(err, ConstructionError::UnguardedUpdate);
}

#[test]
fn delete_without_where_is_refused() {
    let err = build_err(QueryBuilder::new().from("t").delete());
    assert_eq!(err, ConstructionError::UnguardedDelete);
}

#[test]
fn empty_conditions_do_not_release_the_brake() {
    let err = build_err(
        QueryBuilder::new()
            .from("t")
            .where_clause(fields! {})
            .where_clause("")
            .delete(),
    );
    assert_eq!(err, ConstructionError::UnguardedDelete);
}

#[test]
fn grouping_nests_and_keeps_param_order() {
    let s = build_select(
        QueryBuilder::new()
            .from("t")
            .where_eq("a", 1)
            .where_eq("b", 2)
            .or_group()
            .where_eq("c", 3),
    );
    assert_eq!(
        where_text(&s),
        "( \"a\" = ?\n\tAND \"b\" = ? )\n\tOR ( \"c\" = ? )"
    );
    assert_eq!(s.params(), ints(&[1, 2, 3]).as_slice());
}

#[test]
fn not_identity_indicator_binds_nothing() {
    let s = build(QueryBuilder::new().from("t").where_clause(fields! { "!:owner" => 5 }));
    assert_eq!(where_text(&s), "NOT ( \"owner\" = \"5\" )");
    assert!(s.params().is_empty());
}

#[test]
fn multi_row_insert_is_row_major() {
    let s = build(
        QueryBuilder::new()
            .from("t")
            .insert(vec![fields! { "a" => 1, "b" => 2 }, fields! { "a" => 3, "b" => 4 }]),
    );
    assert_eq!(s.kind(), StatementKind::Insert);
    assert_eq!(s.sql(), "INSERT INTO \"t\" (\"a\", \"b\")\nVALUES (?, ?), (?, ?)");
    assert_eq!(s.params(), ints(&[1, 2, 3, 4]).as_slice());
}

#[test]
fn null_compiles_to_is_null_without_param() {
    let s = build(QueryBuilder::new().from("t").where_eq("deleted_at", Value::NULL));
    assert_eq!(where_text(&s), "\"deleted_at\" IS NULL");
    assert!(s.params().is_empty());
}

#[test]
fn null_inside_in_list_is_bound() {
    let s = build(
        QueryBuilder::new()
            .from("t")
            .where_eq("id", vec![Value::from(1), Value::NULL]),
    );
    assert_eq!(where_text(&s), "\"id\" IN (?, ?)");
    assert_eq!(s.params(), &[SqlValue::Int(1), SqlValue::Null]);
}

#[test]
fn mysql_quotes_with_backticks() {
    let s = build(
        QueryBuilder::with_dialect(Arc::new(MysqlDialect::new()))
            .from("users")
            .where_eq("users.id", 1)
            .offset(5),
    );
    assert_eq!(
        s.sql(),
        "SELECT *\nFROM `users`\nWHERE `users`.`id` = ?\nLIMIT 18446744073709551615\nOFFSET 5"
    );
}

#[test]
fn named_statement_is_parenthesized() {
    let s = build(QueryBuilder::new().from("t").name("sub"));
    assert_eq!(s.sql(), "( SELECT *\nFROM \"t\" ) \"sub\"");
}

#[test]
fn bad_argument_count_is_rejected() {
    let args = vec![Value::from("a"); 5];
    let err = build_err(QueryBuilder::new().from("t").where_value(Value::List(args)));
    assert_eq!(err, ConstructionError::BadArgumentCount(5));
}

#[test]
fn inline_dump_escapes_literals() {
    let s = build(QueryBuilder::new().from("t").where_eq("name", "O'Brien"));
    assert_eq!(
        s.to_inline_sql(),
        "SELECT *\nFROM \"t\"\nWHERE \"name\" = 'O''Brien'"
    );
}

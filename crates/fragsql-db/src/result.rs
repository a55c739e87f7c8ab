//! Rows handed back by the execution collaborator.

use std::collections::VecDeque;
use std::sync::Arc;

use fragsql_core::SqlValue;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row, addressable by position or column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row sharing the result's column names.
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Returns the value of the named column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consumes the row, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a row with no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A fully fetched result, consumed front to back like a cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    columns: Arc<[String]>,
    rows: VecDeque<Vec<SqlValue>>,
    rows_affected: u64,
    last_insert_id: Option<i64>,
}

impl QueryResult {
    /// Creates a result holding rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into(),
            rows_affected: 0,
            last_insert_id: None,
        }
    }

    /// Creates a row-less result for a write.
    #[must_use]
    pub fn affected(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
            ..Self::default()
        }
    }

    /// Column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows changed by a write.
    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Identity of the last inserted row, if the driver reports one.
    #[must_use]
    pub const fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// Rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Fetches the next row as a column→value map.
    pub fn fetch_row(&mut self) -> Option<Row> {
        self.rows
            .pop_front()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }

    /// Fetches the next row as an ordered value list.
    pub fn fetch_values(&mut self) -> Option<Vec<SqlValue>> {
        self.rows.pop_front()
    }

    /// Fetches every remaining row.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        let columns = Arc::clone(&self.columns);
        self.rows
            .drain(..)
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }

    /// Fetches every remaining row as value lists.
    pub fn fetch_all_values(&mut self) -> Vec<Vec<SqlValue>> {
        self.rows.drain(..).collect()
    }

    /// Fetches one column across every remaining row.
    pub fn fetch_column(&mut self, index: usize) -> Vec<SqlValue> {
        self.rows
            .drain(..)
            .map(|mut values| {
                if index < values.len() {
                    values.swap_remove(index)
                } else {
                    SqlValue::Null
                }
            })
            .collect()
    }

    /// Position of the named column.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

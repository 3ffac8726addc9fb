//! Prepared statement wrapper.

use std::collections::VecDeque;

use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::client::Statement;
use crate::error::{QbError, QbResult};
use crate::row::Row;
use crate::value::{ParamKind, Value};

/// A prepared SQLite statement.
///
/// Result rows are read in full when the statement runs and then handed out
/// by [`Statement::fetch`] / [`Statement::fetch_all`].
#[derive(Debug)]
pub struct SqliteStatement<'c> {
    stmt: rusqlite::Statement<'c>,
    pending: VecDeque<Row>,
    affected: u64,
}

impl<'c> SqliteStatement<'c> {
    pub(crate) fn new(stmt: rusqlite::Statement<'c>) -> Self {
        Self {
            stmt,
            pending: VecDeque::new(),
            affected: 0,
        }
    }

    /// Number of `?` parameters in the statement.
    pub fn parameter_count(&self) -> usize {
        self.stmt.parameter_count()
    }
}

impl Statement for SqliteStatement<'_> {
    fn bind_value(&mut self, position: usize, value: &Value, kind: ParamKind) -> QbResult<()> {
        self.stmt
            .raw_bind_parameter(position, to_sql_value(value, kind))?;
        Ok(())
    }

    fn execute(&mut self) -> QbResult<()> {
        self.pending.clear();

        if self.stmt.column_count() == 0 {
            let changed = self.stmt.raw_execute()?;
            self.affected = changed as u64;
            return Ok(());
        }

        let columns: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = self.stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut out = Row::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                out.push(name.as_str(), from_value_ref(name, row.get_ref(idx)?)?);
            }
            self.pending.push_back(out);
        }
        self.affected = self.pending.len() as u64;
        Ok(())
    }

    fn fetch_all(&mut self) -> QbResult<Vec<Row>> {
        Ok(self.pending.drain(..).collect())
    }

    fn fetch(&mut self) -> QbResult<Option<Row>> {
        Ok(self.pending.pop_front())
    }

    /// Changed rows for DML, returned rows for queries.
    fn row_count(&self) -> QbResult<u64> {
        Ok(self.affected)
    }
}

/// Convert by bind kind. Floats bind as REAL; SQLite applies column affinity
/// either way.
fn to_sql_value(value: &Value, kind: ParamKind) -> SqlValue {
    match kind {
        ParamKind::Null => SqlValue::Null,
        ParamKind::Int | ParamKind::Bool => value.as_i64().map_or(SqlValue::Null, SqlValue::Integer),
        ParamKind::Str => match value {
            Value::Null => SqlValue::Null,
            Value::Float(v) => SqlValue::Real(*v),
            Value::Text(v) => SqlValue::Text(v.clone()),
            Value::Blob(v) => SqlValue::Blob(v.clone()),
            other => SqlValue::Text(other.to_string()),
        },
    }
}

fn from_value_ref(column: &str, value: ValueRef<'_>) -> QbResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| QbError::decode(column, format!("invalid UTF-8: {}", e)))?;
            Value::Text(text.to_string())
        }
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

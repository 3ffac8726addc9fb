//! Execution helpers over a [`Connection`].
//!
//! Every helper compiles the builder, prepares the SQL on the connection and
//! binds each value at its 1-based position with the kind reported by
//! [`Value::param_kind`]. Collaborator failures are returned unchanged.
//!
//! Helpers that need a different column list or `LIMIT 1` (`first`,
//! `exists`, the aggregates) run on a copy, so the caller's builder is
//! left exactly as it was, including when execution fails.

use std::collections::HashMap;

use crate::client::{Connection, Statement};
use crate::error::QbResult;
use crate::qb::builder::QueryBuilder;
use crate::row::{FromRow, Row};
use crate::value::Value;

const MAX_LOGGED_SQL: usize = 200;

fn truncate_sql(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Numeric text as a count. Fractions truncate toward zero; anything else is 0.
fn parse_count(text: &str) -> i64 {
    let text = text.trim();
    text.parse::<i64>()
        .or_else(|_| text.parse::<f64>().map(|f| f as i64))
        .unwrap_or(0)
}

impl QueryBuilder {
    /// Compile, prepare and bind without running.
    pub fn prepare<'c, C: Connection>(&self, conn: &'c C) -> QbResult<C::Statement<'c>> {
        let (sql, bindings) = self.compile()?.into_parts();

        let shown = truncate_sql(&sql, MAX_LOGGED_SQL);
        tracing::debug!(
            target: "chainsql.sql",
            kind = %self.kind,
            param_count = bindings.len(),
            truncated = shown.len() < sql.len(),
            sql = %shown,
        );

        let mut stmt = conn.prepare(&sql)?;
        for (idx, value) in bindings.iter().enumerate() {
            stmt.bind_value(idx + 1, value, value.param_kind())?;
        }
        Ok(stmt)
    }

    /// Compile, prepare, bind and run. The executed statement is returned
    /// for further fetching.
    pub fn execute<'c, C: Connection>(&self, conn: &'c C) -> QbResult<C::Statement<'c>> {
        let mut stmt = self.prepare(conn)?;
        stmt.execute()?;
        Ok(stmt)
    }

    /// Run and return every row.
    pub fn get<C: Connection>(&self, conn: &C) -> QbResult<Vec<Row>> {
        self.execute(conn)?.fetch_all()
    }

    /// Alias for [`QueryBuilder::get`].
    pub fn run<C: Connection>(&self, conn: &C) -> QbResult<Vec<Row>> {
        self.get(conn)
    }

    /// Alias for [`QueryBuilder::get`].
    pub fn fetch_all<C: Connection>(&self, conn: &C) -> QbResult<Vec<Row>> {
        self.get(conn)
    }

    /// Run and map every row to `T`.
    pub fn fetch_all_as<T: FromRow, C: Connection>(&self, conn: &C) -> QbResult<Vec<T>> {
        let rows = self.get(conn)?;
        rows.iter().map(T::from_row).collect()
    }

    /// First row with `LIMIT 1` applied.
    pub fn first<C: Connection>(&self, conn: &C) -> QbResult<Option<Row>> {
        let mut scratch = self.clone();
        scratch.limit = Some(1);
        scratch.execute(conn)?.fetch()
    }

    pub fn first_as<T: FromRow, C: Connection>(&self, conn: &C) -> QbResult<Option<T>> {
        let row = self.first(conn)?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// `column` of the first row; `None` when there is no row or no such column.
    pub fn value<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Option<Value>> {
        let row = self.first(conn)?;
        Ok(row.and_then(|r| r.get(column).cloned()))
    }

    /// `column` of every row. Rows lacking the column are skipped.
    pub fn pluck<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Vec<Value>> {
        let rows = self.get(conn)?;
        Ok(rows.iter().filter_map(|r| r.get(column).cloned()).collect())
    }

    /// `(key, column)` pairs, one per distinct key.
    ///
    /// Rows whose key is NULL or missing are skipped. A later row with the same
    /// key (compared by its text form) overwrites the earlier value in place.
    pub fn pluck_keyed<C: Connection>(
        &self,
        conn: &C,
        column: &str,
        key: &str,
    ) -> QbResult<Vec<(Value, Value)>> {
        let rows = self.get(conn)?;
        let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(rows.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for row in &rows {
            let k = match row.get(key) {
                Some(k) if !k.is_null() => k.clone(),
                _ => continue,
            };
            let v = row.get(column).cloned().unwrap_or(Value::Null);
            match seen.get(&k.to_string()) {
                Some(&idx) => pairs[idx].1 = v,
                None => {
                    seen.insert(k.to_string(), pairs.len());
                    pairs.push((k, v));
                }
            }
        }
        Ok(pairs)
    }

    /// Run and return the affected row count.
    pub fn row_count<C: Connection>(&self, conn: &C) -> QbResult<u64> {
        self.execute(conn)?.row_count()
    }

    /// Run and return the connection's last insert id.
    pub fn insert_get_id<C: Connection>(&self, conn: &C) -> QbResult<String> {
        drop(self.execute(conn)?);
        conn.last_insert_id()
    }

    /// Whether the query matches at least one row (`SELECT 1 ... LIMIT 1`).
    pub fn exists<C: Connection>(&self, conn: &C) -> QbResult<bool> {
        let mut scratch = self.clone();
        scratch.columns = vec!["1".to_string()];
        scratch.limit = Some(1);
        let rows = scratch.get(conn)?;
        Ok(!rows.is_empty())
    }

    /// `COUNT(column)`; pass `"*"` to count rows.
    pub fn count<C: Connection>(&self, conn: &C, column: &str) -> QbResult<i64> {
        let value = self.aggregate(conn, "COUNT", column)?;
        Ok(match value {
            Some(Value::Int(n)) => n,
            Some(Value::Float(f)) => f as i64,
            Some(Value::Text(s)) => parse_count(&s),
            Some(Value::Bool(b)) => i64::from(b),
            _ => 0,
        })
    }

    pub fn max<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Option<Value>> {
        self.aggregate(conn, "MAX", column)
    }

    pub fn min<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Option<Value>> {
        self.aggregate(conn, "MIN", column)
    }

    pub fn avg<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Option<Value>> {
        self.aggregate(conn, "AVG", column)
    }

    pub fn sum<C: Connection>(&self, conn: &C, column: &str) -> QbResult<Option<Value>> {
        self.aggregate(conn, "SUM", column)
    }

    /// NULL aggregates come back as `None`.
    fn aggregate<C: Connection>(
        &self,
        conn: &C,
        function: &str,
        column: &str,
    ) -> QbResult<Option<Value>> {
        let mut scratch = self.clone();
        scratch.columns = vec![format!("{}({}) as aggregate", function, column)];
        let value = scratch.value(conn, "aggregate")?;
        Ok(value.filter(|v| !v.is_null()))
    }
}

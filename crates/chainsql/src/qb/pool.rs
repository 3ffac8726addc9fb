//! Buffered multi-row INSERT.
//!
//! [`InsertPool`] collects rows for one table and writes them with a single
//! `INSERT INTO t (cols) VALUES (?, ...), (?, ...)` statement. Pushing onto a
//! full pool flushes the buffered rows first, so at most `max_size` rows are
//! ever held in memory.
//!
//! ```ignore
//! let mut pool = InsertPool::new(&conn, "events", ["kind", "payload"], 500)?;
//! for event in events {
//!     pool.push([("kind", event.kind), ("payload", event.payload)])?;
//! }
//! pool.commit()?;
//! ```

use crate::client::Connection;
use crate::error::{QbError, QbResult};
use crate::qb::builder::{QueryBuilder, align_row};
use crate::value::Value;

/// Rows buffered for a batch INSERT over a borrowed connection.
///
/// Rows still buffered when the pool is dropped are discarded; call
/// [`InsertPool::commit`] to write them.
pub struct InsertPool<'c, C: Connection> {
    conn: &'c C,
    table: String,
    columns: Vec<String>,
    max_size: usize,
    rows: Vec<Vec<Value>>,
}

impl<'c, C: Connection> InsertPool<'c, C> {
    /// Create a pool writing `columns` of `table`, flushing every `max_size` rows.
    pub fn new<I, S>(
        conn: &'c C,
        table: impl Into<String>,
        columns: I,
        max_size: usize,
    ) -> QbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        if table.is_empty() {
            return Err(QbError::config("No table specified for insert pool"));
        }
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(QbError::config("Insert pool needs at least one column"));
        }
        if max_size == 0 {
            return Err(QbError::config("Insert pool size must be positive"));
        }
        Ok(Self {
            conn,
            table,
            columns,
            max_size,
            rows: Vec::with_capacity(max_size),
        })
    }

    /// Buffer a row, flushing first when the pool is already full.
    ///
    /// The row must name exactly the pool's columns, in any order. A rejected
    /// row is not buffered; a failed flush keeps the buffered rows.
    pub fn push<I, K, V>(&mut self, row: I) -> QbResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries: Vec<(String, Value)> = Vec::new();
        for (column, value) in row {
            let column = column.into();
            let value = value.into();
            match entries.iter_mut().find(|(c, _)| *c == column) {
                Some(entry) => entry.1 = value,
                None => entries.push((column, value)),
            }
        }
        let aligned = align_row(&self.columns, entries).ok_or_else(|| {
            QbError::config(format!(
                "Row does not match pool columns ({})",
                self.columns.join(", ")
            ))
        })?;

        if self.rows.len() >= self.max_size {
            self.commit()?;
        }
        self.rows.push(aligned);
        Ok(())
    }

    /// Write every buffered row in one statement and empty the pool.
    ///
    /// Returns the affected row count; an empty pool runs nothing and returns 0.
    pub fn commit(&mut self) -> QbResult<u64> {
        if self.rows.is_empty() {
            return Ok(0);
        }

        let affected = self.to_query()?.row_count(self.conn)?;
        tracing::debug!(
            target: "chainsql.pool",
            table = %self.table,
            rows = self.rows.len(),
            affected,
            "flushed insert pool"
        );
        self.rows.clear();
        Ok(affected)
    }

    /// The INSERT the next commit would run.
    pub fn to_query(&self) -> QbResult<QueryBuilder> {
        let rows = self
            .rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()));
        let mut qb = QueryBuilder::new();
        qb.insert(self.table.as_str()).values_many(rows)?;
        Ok(qb)
    }

    /// Get the number of buffered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows are buffered.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the row count that triggers a flush on the next push.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::mock::MockConnection;

    #[test]
    fn test_push_flushes_when_full() {
        let conn = MockConnection {
            affected: 2,
            ..Default::default()
        };
        let mut pool = InsertPool::new(&conn, "events", ["kind", "size"], 2).unwrap();

        pool.push([("kind", Value::from("a")), ("size", Value::from(1))])
            .unwrap();
        pool.push([("size", Value::from(2)), ("kind", Value::from("b"))])
            .unwrap();
        assert_eq!(pool.len(), 2);
        assert!(conn.prepared.borrow().is_empty());

        pool.push([("kind", Value::from("c")), ("size", Value::from(3))])
            .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(
            conn.prepared.borrow().as_slice(),
            ["INSERT INTO events (kind, size) VALUES (?, ?), (?, ?)"]
        );
        assert_eq!(
            conn.bound_values(),
            vec![
                Value::from("a"),
                Value::Int(1),
                Value::from("b"),
                Value::Int(2),
            ]
        );

        assert_eq!(pool.commit().unwrap(), 2);
        assert!(pool.is_empty());
        assert_eq!(
            conn.prepared.borrow()[1],
            "INSERT INTO events (kind, size) VALUES (?, ?)"
        );
        let positions: Vec<usize> = conn.bound.borrow().iter().map(|(p, _, _)| *p).collect();
        assert_eq!(positions, [1, 2, 3, 4, 1, 2]);
    }

    #[test]
    fn test_commit_on_empty_pool_runs_nothing() {
        let conn = MockConnection::default();
        let mut pool = InsertPool::new(&conn, "events", ["kind"], 10).unwrap();
        assert_eq!(pool.commit().unwrap(), 0);
        assert!(conn.prepared.borrow().is_empty());
        assert_eq!(pool.max_size(), 10);
    }

    #[test]
    fn test_mismatched_row_rejected() {
        let conn = MockConnection::default();
        let mut pool = InsertPool::new(&conn, "events", ["kind", "size"], 4).unwrap();

        let err = pool.push([("kind", "a")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Row does not match pool columns (kind, size)"
        );
        let err = pool.push([("kind", "a"), ("colour", "red")]).unwrap_err();
        assert!(err.is_config());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_failed_flush_keeps_rows() {
        let conn = MockConnection {
            fail_execute: true,
            ..Default::default()
        };
        let mut pool = InsertPool::new(&conn, "events", ["kind"], 1).unwrap();
        pool.push([("kind", "a")]).unwrap();

        assert!(pool.push([("kind", "b")]).unwrap_err().is_execution());
        assert_eq!(pool.len(), 1);
        assert!(pool.commit().unwrap_err().is_execution());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_invalid_construction() {
        let conn = MockConnection::default();
        assert!(InsertPool::new(&conn, "events", ["kind"], 0).is_err());
        assert!(InsertPool::new(&conn, "events", Vec::<String>::new(), 5).is_err());
        assert!(InsertPool::new(&conn, "", ["kind"], 5).is_err());
    }
}
